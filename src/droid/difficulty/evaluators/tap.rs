use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    util::difficulty::{erf, milliseconds_to_bpm},
};

pub struct TapEvaluator;

impl TapEvaluator {
    // 200 BPM 1/4th
    const MIN_SPEED_BONUS: f64 = 200.0;

    const MIN_CAPPED_STRAIN_TIME: f64 = 50.0;

    /// Tapping difficulty of `curr`.
    ///
    /// With a `strain_time_cap`, objects are never considered faster than
    /// the cap which removes the benefit of vibro-like tapping.
    pub fn evaluate_diff_of<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        great_window: f64,
        consider_cheesability: bool,
        strain_time_cap: Option<f64>,
    ) -> f64 {
        if curr.base.is_spinner() || curr.is_overlapping(true, diff_objects) {
            return 0.0;
        }

        let doubletapness = if consider_cheesability {
            curr.get_doubletapness(curr.next(0, diff_objects), great_window)
        } else {
            0.0
        };

        let strain_time = match strain_time_cap {
            Some(cap) => curr.strain_time.max(cap).max(Self::MIN_CAPPED_STRAIN_TIME),
            None => curr.strain_time,
        };

        let speed_bonus = if milliseconds_to_bpm(strain_time, None) > Self::MIN_SPEED_BONUS {
            1.0 + 0.75 * erf((75.0 - strain_time) / 40.0).powi(2)
        } else {
            1.0
        };

        speed_bonus * (1.0 - doubletapness).powf(1.5) / strain_time
    }
}
