use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::object::OsuObjectKind,
};

pub struct FlashlightEvaluator {
    scaling_factor: f64,
    time_preempt: f64,
    time_fade_in: f64,
    hidden: bool,
}

impl FlashlightEvaluator {
    const MAX_OPACITY_BONUS: f64 = 0.4;
    const HIDDEN_BONUS: f64 = 0.2;

    const MIN_VELOCITY: f64 = 0.5;
    const SLIDER_MULTIPLIER: f64 = 1.3;

    /// `radius` is the unnormalized circle radius in osu!pixels.
    pub fn new(radius: f64, time_preempt: f64, time_fade_in: f64, hidden: bool) -> Self {
        Self {
            scaling_factor: 52.0 / radius,
            time_preempt,
            time_fade_in,
            hidden,
        }
    }

    pub fn evaluate_diff_of<'a>(
        &self,
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
    ) -> f64 {
        if curr.base.is_spinner() || curr.is_overlapping(true, diff_objects) {
            return 0.0;
        }

        let mut small_dist_nerf = 1.0;
        let mut cumulative_strain_time = 0.0;
        let mut result = 0.0;
        let mut last_obj = curr;

        for i in 0..cmp::min(curr.idx, 10) {
            let Some(curr_obj) = curr.previous(i, diff_objects) else {
                break;
            };

            cumulative_strain_time += last_obj.strain_time;

            if !(curr_obj.base.is_spinner() || curr_obj.is_overlapping(true, diff_objects)) {
                let jump_dist = f64::from(
                    (curr.base.stacked_pos() - curr_obj.base.stacked_end_pos()).length(),
                );

                if i == 0 {
                    small_dist_nerf = (jump_dist / 75.0).min(1.0);
                }

                let stack_nerf = ((curr_obj.lazy_jump_dist / self.scaling_factor) / 25.0).min(1.0);

                let opacity_bonus = 1.0
                    + Self::MAX_OPACITY_BONUS
                        * (1.0
                            - curr.opacity_at(
                                curr_obj.base.start_time,
                                self.hidden,
                                self.time_preempt,
                                self.time_fade_in,
                            ));

                result += stack_nerf * opacity_bonus * self.scaling_factor * jump_dist
                    / cumulative_strain_time;
            }

            last_obj = curr_obj;
        }

        result = (small_dist_nerf * result).powi(2);

        if self.hidden {
            result *= 1.0 + Self::HIDDEN_BONUS;
        }

        if let OsuObjectKind::Slider(ref slider) = curr.base.kind {
            let pixel_travel_dist = slider.lazy_travel_dist / self.scaling_factor;

            let mut slider_bonus = (pixel_travel_dist / curr.travel_time - Self::MIN_VELOCITY)
                .max(0.0)
                .sqrt()
                * pixel_travel_dist;

            let repeat_count = slider.repeat_count();

            if repeat_count > 0 {
                slider_bonus /= (repeat_count + 1) as f64;
            }

            result += slider_bonus * Self::SLIDER_MULTIPLIER;
        }

        result
    }
}
