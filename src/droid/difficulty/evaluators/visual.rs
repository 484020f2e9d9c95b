use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::object::OsuObjectKind,
};

/// Reading difficulty: how hard it is to make sense of what is on screen.
pub struct VisualEvaluator {
    time_preempt: f64,
    time_fade_in: f64,
    hidden: bool,
}

impl VisualEvaluator {
    const MAX_LOOKBACK: usize = 10;
    const MAX_SLIDERS: usize = 4;

    const LOW_AR_PREEMPT: f64 = 400.0;

    /// Both times are unadjusted milliseconds.
    pub const fn new(time_preempt: f64, time_fade_in: f64, hidden: bool) -> Self {
        Self {
            time_preempt,
            time_fade_in,
            hidden,
        }
    }

    pub fn evaluate_diff_of<'a>(
        &self,
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        clock_rate: f64,
    ) -> f64 {
        if curr.idx == 0 || curr.base.is_spinner() || curr.is_overlapping(true, diff_objects) {
            return 0.0;
        }

        let time_preempt = self.time_preempt / clock_rate;

        let mut strain = if self.hidden {
            curr.note_density.powi(3).min(30.0)
        } else {
            curr.note_density.powi(2).min(20.0)
        };

        // Previous objects that are still fading while this one is hit
        for i in 0..cmp::min(curr.idx, Self::MAX_LOOKBACK) {
            let Some(prev) = curr.previous(i, diff_objects) else {
                break;
            };

            if curr.start_time - prev.start_time > time_preempt {
                break;
            }

            if prev.base.is_spinner() || prev.is_overlapping(true, diff_objects) {
                continue;
            }

            strain += (1.0
                - curr.opacity_at(
                    prev.base.start_time,
                    self.hidden,
                    self.time_preempt,
                    self.time_fade_in,
                ))
                / 4.0;
        }

        if time_preempt < Self::LOW_AR_PREEMPT {
            strain += (Self::LOW_AR_PREEMPT - time_preempt).powf(1.3) / 100.0;
        }

        if let OsuObjectKind::Slider(ref slider) = curr.base.kind {
            let curr_vel = curr.travel_dist / curr.travel_time;
            let span_dist = slider.lazy_travel_dist / slider.span_count.max(1.0);

            strain += (1.5 * curr_vel).min(6.0) * span_dist / 100.0;
            strain += Self::velocity_change_bonus(curr, diff_objects, curr_vel, time_preempt);
        }

        strain / (10.0 * (1.0 + curr.overlapping_factor))
    }

    /// Sliders whose speed differs from recent sliders are harder to read.
    fn velocity_change_bonus<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        curr_vel: f64,
        time_preempt: f64,
    ) -> f64 {
        let mut bonus = 0.0;
        let mut slider_count = 0;

        for i in 0..cmp::min(curr.idx, Self::MAX_LOOKBACK) {
            let Some(prev) = curr.previous(i, diff_objects) else {
                break;
            };

            if curr.start_time - prev.end_time > time_preempt
                || slider_count == Self::MAX_SLIDERS
            {
                break;
            }

            if !prev.base.is_slider() {
                continue;
            }

            let prev_vel = prev.travel_dist / prev.travel_time;

            slider_count += 1;
            bonus += (curr_vel - prev_vel).abs().min(1.0) / slider_count as f64;
        }

        bonus
    }
}
