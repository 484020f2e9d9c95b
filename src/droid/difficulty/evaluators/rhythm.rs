use crate::{
    any::difficulty::rhythm::{rhythm_complexity, RhythmConstants},
    droid::difficulty::object::DroidDifficultyObject,
};

pub struct RhythmEvaluator;

impl RhythmEvaluator {
    const CONSTANTS: RhythmConstants = RhythmConstants {
        overall_multiplier: 0.75,
        ratio_multiplier: 12.0,
    };

    /// Rhythm multiplier of `curr`; `1.0` is neutral.
    pub fn evaluate_diff_of<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        great_window: f64,
    ) -> f64 {
        if curr.base.is_spinner() || curr.is_overlapping(true, diff_objects) {
            return 1.0;
        }

        rhythm_complexity(
            curr,
            diff_objects,
            curr.idx.saturating_sub(1),
            great_window,
            Self::CONSTANTS,
        )
    }
}
