use std::f64::consts::FRAC_PI_2;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::difficulty::evaluators::AimEvaluator as OsuAimEvaluator,
    util::{
        difficulty::{milliseconds_to_bpm, smootherstep},
        float_ext::FloatExt,
    },
};

pub struct AimEvaluator;

impl AimEvaluator {
    const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
    const ACUTE_ANGLE_MULTIPLIER: f64 = 2.6;
    const SLIDER_MULTIPLIER: f64 = 1.35;
    const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;

    const DIAMETER: f64 = DroidDifficultyObject::NORMALIZED_DIAMETER as f64;

    /// Snap and flow difficulty of aiming `curr`.
    pub fn evaluate_diff_of<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        with_slider_travel_dist: bool,
    ) -> f64 {
        if curr.base.is_spinner() || curr.is_overlapping(true, diff_objects) {
            return 0.0;
        }

        Self::snap_aim_strain_of(curr, diff_objects, with_slider_travel_dist)
            + Self::flow_aim_strain_of(curr, diff_objects)
    }

    fn snap_aim_strain_of<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
        with_slider_travel_dist: bool,
    ) -> f64 {
        if curr.idx <= 2 {
            return 0.0;
        }

        let Some((last_last, last)) = curr
            .previous(1, diff_objects)
            .zip(curr.previous(0, diff_objects))
            .filter(|(_, last)| !last.base.is_spinner())
        else {
            return 0.0;
        };

        let mut curr_vel = curr.lazy_jump_dist / curr.strain_time;

        if last.base.is_slider() && with_slider_travel_dist {
            let travel_vel = last.travel_dist / last.travel_time;
            let movement_vel = curr.min_jump_dist / curr.min_jump_time;

            curr_vel = curr_vel.max(movement_vel + travel_vel);
        }

        let mut prev_vel = last.lazy_jump_dist / last.strain_time;

        if last_last.base.is_slider() && with_slider_travel_dist {
            let travel_vel = last_last.travel_dist / last_last.travel_time;
            let movement_vel = last.min_jump_dist / last.min_jump_time;

            prev_vel = prev_vel.max(movement_vel + travel_vel);
        }

        let mut wide_angle_bonus = 0.0;
        let mut acute_angle_bonus = 0.0;
        let mut slider_bonus = 0.0;
        let mut vel_change_bonus = 0.0;

        let mut aim_strain = curr_vel;

        if let Some((curr_angle, last_angle)) = curr.angle.zip(last.angle) {
            let angle_bonus = curr_vel.min(prev_vel);

            wide_angle_bonus = OsuAimEvaluator::calc_wide_angle_bonus(curr_angle);
            wide_angle_bonus *= 1.0
                - wide_angle_bonus
                    .min(OsuAimEvaluator::calc_wide_angle_bonus(last_angle).powi(3));
            wide_angle_bonus *= angle_bonus * smootherstep(curr.lazy_jump_dist, 0.0, Self::DIAMETER);

            let same_rhythm = curr.strain_time.max(last.strain_time)
                < 1.25 * curr.strain_time.min(last.strain_time);

            if same_rhythm {
                acute_angle_bonus = OsuAimEvaluator::calc_acute_angle_bonus(curr_angle);
                acute_angle_bonus *= 0.08
                    + 0.92
                        * (1.0
                            - acute_angle_bonus
                                .min(OsuAimEvaluator::calc_acute_angle_bonus(last_angle).powi(3)));

                acute_angle_bonus *= angle_bonus
                    * smootherstep(milliseconds_to_bpm(curr.strain_time, Some(2)), 300.0, 400.0)
                    * smootherstep(curr.lazy_jump_dist, Self::DIAMETER, Self::DIAMETER * 2.0);
            }
        }

        if prev_vel.max(curr_vel).not_eq(0.0) {
            prev_vel = (last.lazy_jump_dist + last_last.travel_dist) / last.strain_time;
            curr_vel = (curr.lazy_jump_dist + last.travel_dist) / curr.strain_time;

            let dist_ratio = (FRAC_PI_2 * (prev_vel - curr_vel).abs() / prev_vel.max(curr_vel))
                .sin()
                .powi(2);

            let overlap_vel_buff = (Self::DIAMETER * 1.25
                / curr.strain_time.min(last.strain_time))
            .min((prev_vel - curr_vel).abs());

            let rhythm_ratio = curr.strain_time.min(last.strain_time)
                / curr.strain_time.max(last.strain_time);

            vel_change_bonus = overlap_vel_buff * dist_ratio * rhythm_ratio.powi(2);
        }

        if last.base.is_slider() {
            slider_bonus = last.travel_dist / last.travel_time;
        }

        aim_strain += (acute_angle_bonus * Self::ACUTE_ANGLE_MULTIPLIER).max(
            wide_angle_bonus * Self::WIDE_ANGLE_MULTIPLIER
                + vel_change_bonus * Self::VELOCITY_CHANGE_MULTIPLIER,
        );

        if with_slider_travel_dist {
            aim_strain += slider_bonus * Self::SLIDER_MULTIPLIER;
        }

        aim_strain
    }

    /// Short, fast movements that are played by dragging rather than
    /// snapping.
    fn flow_aim_strain_of<'a>(
        curr: &'a DroidDifficultyObject<'a>,
        diff_objects: &'a [DroidDifficultyObject<'a>],
    ) -> f64 {
        let Some(last) = curr.previous(0, diff_objects) else {
            return 0.0;
        };

        let speed_bonus = if curr.strain_time < 75.0 {
            1.0 + 0.75 * ((75.0 - curr.strain_time) / 45.0).powi(2)
        } else {
            1.0
        };

        let travel_dist = last.travel_dist + curr.min_jump_dist;
        let short_distance_penalty = (travel_dist.min(100.0) / 100.0).powf(3.5);

        200.0 * speed_bonus * short_distance_penalty / curr.strain_time
    }
}
