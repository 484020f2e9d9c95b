use crate::{
    any::difficulty::{
        object::IDifficultyObject,
        rhythm::{rhythm_complexity, RhythmConstants},
    },
    osu::difficulty::object::OsuDifficultyObject,
};

pub struct RhythmEvaluator;

impl RhythmEvaluator {
    const CONSTANTS: RhythmConstants = RhythmConstants {
        overall_multiplier: 1.0,
        ratio_multiplier: 15.0,
    };

    /// Rhythm multiplier of `curr`, reduced if `curr` gets doubletapped.
    pub fn evaluate_diff_of<'a>(
        curr: &'a OsuDifficultyObject<'a>,
        diff_objects: &'a [OsuDifficultyObject<'a>],
        hit_window: f64,
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let rhythm_difficulty =
            rhythm_complexity(curr, diff_objects, curr.idx, hit_window, Self::CONSTANTS);

        rhythm_difficulty * (1.0 - curr.get_doubletapness(curr.next(0, diff_objects), hit_window))
    }
}
