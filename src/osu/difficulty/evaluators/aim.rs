use std::f64::consts::FRAC_PI_2;

use crate::{
    any::difficulty::object::IDifficultyObject,
    osu::difficulty::object::OsuDifficultyObject,
    util::{
        difficulty::{milliseconds_to_bpm, reverse_lerp, smootherstep, smoothstep},
        float_ext::FloatExt,
    },
};

pub struct AimEvaluator;

impl AimEvaluator {
    const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
    const ACUTE_ANGLE_MULTIPLIER: f64 = 2.6;
    const SLIDER_MULTIPLIER: f64 = 1.35;
    const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;
    const WIGGLE_MULTIPLIER: f64 = 1.02;

    const RADIUS: f64 = OsuDifficultyObject::NORMALIZED_RADIUS as f64;
    const DIAMETER: f64 = OsuDifficultyObject::NORMALIZED_DIAMETER as f64;

    /// Difficulty of aiming `curr`, optionally including the slider travel
    /// of the previous object.
    pub fn evaluate_diff_of<'a>(
        curr: &'a OsuDifficultyObject<'a>,
        diff_objects: &'a [OsuDifficultyObject<'a>],
        with_slider_travel_dist: bool,
    ) -> f64 {
        let Some((osu_last_last_obj, osu_last_obj)) = curr
            .previous(1, diff_objects)
            .zip(curr.previous(0, diff_objects))
            .filter(|(_, last)| !(curr.base.is_spinner() || last.base.is_spinner()))
        else {
            return 0.0;
        };

        let osu_curr_obj = curr;

        // Base velocity assumes the last object is a circle
        let mut curr_vel = osu_curr_obj.lazy_jump_dist / osu_curr_obj.strain_time;

        if osu_last_obj.base.is_slider() && with_slider_travel_dist {
            let travel_vel = osu_last_obj.travel_dist / osu_last_obj.travel_time;
            let movement_vel = osu_curr_obj.min_jump_dist / osu_curr_obj.min_jump_time;

            curr_vel = curr_vel.max(movement_vel + travel_vel);
        }

        let mut prev_vel = osu_last_obj.lazy_jump_dist / osu_last_obj.strain_time;

        if osu_last_last_obj.base.is_slider() && with_slider_travel_dist {
            let travel_vel = osu_last_last_obj.travel_dist / osu_last_last_obj.travel_time;
            let movement_vel = osu_last_obj.min_jump_dist / osu_last_obj.min_jump_time;

            prev_vel = prev_vel.max(movement_vel + travel_vel);
        }

        let mut wide_angle_bonus = 0.0;
        let mut acute_angle_bonus = 0.0;
        let mut slider_bonus = 0.0;
        let mut vel_change_bonus = 0.0;
        let mut wiggle_bonus = 0.0;

        let mut aim_strain = curr_vel;

        let same_rhythm = osu_curr_obj.strain_time.max(osu_last_obj.strain_time)
            < 1.25 * osu_curr_obj.strain_time.min(osu_last_obj.strain_time);

        if let Some((curr_angle, last_angle)) = osu_curr_obj
            .angle
            .zip(osu_last_obj.angle)
            .filter(|_| same_rhythm)
        {
            let angle_bonus = curr_vel.min(prev_vel);

            wide_angle_bonus = Self::calc_wide_angle_bonus(curr_angle);
            acute_angle_bonus = Self::calc_acute_angle_bonus(curr_angle);

            // Repeated angles are easier
            wide_angle_bonus *=
                1.0 - wide_angle_bonus.min(Self::calc_wide_angle_bonus(last_angle).powi(3));
            acute_angle_bonus *= 0.08
                + 0.92
                    * (1.0
                        - acute_angle_bonus.min(Self::calc_acute_angle_bonus(last_angle).powi(3)));

            wide_angle_bonus *=
                angle_bonus * smootherstep(osu_curr_obj.lazy_jump_dist, 0.0, Self::DIAMETER);

            acute_angle_bonus *= angle_bonus
                * smootherstep(
                    milliseconds_to_bpm(osu_curr_obj.strain_time, Some(2)),
                    300.0,
                    400.0,
                )
                * smootherstep(
                    osu_curr_obj.lazy_jump_dist,
                    Self::DIAMETER,
                    Self::DIAMETER * 2.0,
                );

            // Jumps between one radius and three diameters with angles below 110°
            wiggle_bonus = angle_bonus
                * Self::wiggle_factor(osu_curr_obj.lazy_jump_dist, curr_angle)
                * Self::wiggle_factor(osu_last_obj.lazy_jump_dist, last_angle);
        }

        if prev_vel.max(curr_vel).not_eq(0.0) {
            // Average velocity over the whole object
            prev_vel = (osu_last_obj.lazy_jump_dist + osu_last_last_obj.travel_dist)
                / osu_last_obj.strain_time;
            curr_vel =
                (osu_curr_obj.lazy_jump_dist + osu_last_obj.travel_dist) / osu_curr_obj.strain_time;

            let dist_ratio = (FRAC_PI_2 * (prev_vel - curr_vel).abs() / prev_vel.max(curr_vel))
                .sin()
                .powi(2);

            // Overlapping objects can still change velocity
            let overlap_vel_buff = (Self::DIAMETER * 1.25
                / osu_curr_obj.strain_time.min(osu_last_obj.strain_time))
            .min((prev_vel - curr_vel).abs());

            vel_change_bonus = overlap_vel_buff * dist_ratio;

            let rhythm_ratio = osu_curr_obj.strain_time.min(osu_last_obj.strain_time)
                / osu_curr_obj.strain_time.max(osu_last_obj.strain_time);
            vel_change_bonus *= rhythm_ratio.powi(2);
        }

        if osu_last_obj.base.is_slider() {
            slider_bonus = osu_last_obj.travel_dist / osu_last_obj.travel_time;
        }

        aim_strain += wiggle_bonus * Self::WIGGLE_MULTIPLIER;

        aim_strain += (acute_angle_bonus * Self::ACUTE_ANGLE_MULTIPLIER).max(
            wide_angle_bonus * Self::WIDE_ANGLE_MULTIPLIER
                + vel_change_bonus * Self::VELOCITY_CHANGE_MULTIPLIER,
        );

        if with_slider_travel_dist {
            aim_strain += slider_bonus * Self::SLIDER_MULTIPLIER;
        }

        aim_strain * osu_curr_obj.small_circle_bonus
    }

    fn wiggle_factor(lazy_jump_dist: f64, angle: f64) -> f64 {
        smootherstep(lazy_jump_dist, Self::RADIUS, Self::DIAMETER)
            * reverse_lerp(lazy_jump_dist, Self::DIAMETER * 3.0, Self::DIAMETER).powf(1.8)
            * smootherstep(angle, f64::to_radians(110.0), f64::to_radians(60.0))
    }

    pub fn calc_wide_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(40.0), f64::to_radians(140.0))
    }

    pub fn calc_acute_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(140.0), f64::to_radians(40.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_bonuses_mirror_each_other() {
        let right = FRAC_PI_2;

        assert!(AimEvaluator::calc_wide_angle_bonus(f64::to_radians(150.0)) > 0.999);
        assert!(AimEvaluator::calc_acute_angle_bonus(f64::to_radians(150.0)) < 1e-3);

        let sum =
            AimEvaluator::calc_wide_angle_bonus(right) + AimEvaluator::calc_acute_angle_bonus(right);
        assert!((sum - 1.0).abs() < 1e-9, "{sum}");
    }
}
