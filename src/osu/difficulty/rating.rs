use crate::{
    model::mods::ModCapabilities,
    util::{difficulty::reverse_lerp, float_ext::FloatExt},
};

/// Turns osu!standard difficulty values into ratings, applying mod and
/// reading adjustments.
pub struct OsuRatingCalculator<'caps> {
    caps: &'caps ModCapabilities,
    total_hits: u32,
    approach_rate: f64,
    overall_difficulty: f64,
    mechanical_difficulty_rating: f64,
    slider_factor: f64,
}

const DIFFICULTY_MULTIPLIER: f64 = 0.0675;

impl<'caps> OsuRatingCalculator<'caps> {
    pub const fn new(
        caps: &'caps ModCapabilities,
        total_hits: u32,
        approach_rate: f64,
        overall_difficulty: f64,
        mechanical_difficulty_rating: f64,
        slider_factor: f64,
    ) -> Self {
        Self {
            caps,
            total_hits,
            approach_rate,
            overall_difficulty,
            mechanical_difficulty_rating,
            slider_factor,
        }
    }
}

impl OsuRatingCalculator<'_> {
    pub fn compute_aim_rating(&self, aim_difficulty_value: f64) -> f64 {
        if self.caps.autopilot {
            return 0.0;
        }

        let mut aim_rating = Self::calculate_difficulty_rating(aim_difficulty_value);

        if self.caps.touch_device {
            aim_rating = aim_rating.powf(0.8);
        }

        if self.caps.relax {
            aim_rating *= 0.9;
        }

        let ar_factor = if self.caps.relax {
            0.0
        } else {
            self.ar_factor()
        };

        let mut rating_multiplier = 1.0 + ar_factor * self.ar_length_bonus();

        if self.caps.hidden {
            let visibility_factor = Self::calculate_aim_visibility_factor(
                self.mechanical_difficulty_rating,
                self.approach_rate,
            );

            rating_multiplier += Self::calculate_visibility_bonus(
                self.caps,
                self.approach_rate,
                Some(visibility_factor),
                Some(self.slider_factor),
            );
        }

        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powi(2) / 2500.0;

        aim_rating * rating_multiplier.cbrt()
    }

    pub fn compute_speed_rating(&self, speed_difficulty_value: f64) -> f64 {
        if self.caps.relax {
            return 0.0;
        }

        let mut speed_rating = Self::calculate_difficulty_rating(speed_difficulty_value);

        if self.caps.autopilot {
            speed_rating *= 0.5;
        }

        let ar_factor = if self.caps.autopilot {
            0.0
        } else {
            self.ar_factor()
        };

        let mut rating_multiplier = 1.0 + ar_factor * self.ar_length_bonus();

        if self.caps.hidden {
            let visibility_factor = Self::calculate_speed_visibility_factor(
                self.mechanical_difficulty_rating,
                self.approach_rate,
            );

            rating_multiplier += Self::calculate_visibility_bonus(
                self.caps,
                self.approach_rate,
                Some(visibility_factor),
                None,
            );
        }

        rating_multiplier *= 0.95 + self.overall_difficulty.max(0.0).powi(2) / 750.0;

        speed_rating * rating_multiplier.cbrt()
    }

    pub fn compute_flashlight_rating(&self, flashlight_difficulty_value: f64) -> f64 {
        if !self.caps.flashlight {
            return 0.0;
        }

        let mut flashlight_rating = Self::calculate_difficulty_rating(flashlight_difficulty_value);

        if self.caps.touch_device {
            flashlight_rating = flashlight_rating.powf(0.8);
        }

        if self.caps.relax {
            flashlight_rating *= 0.7;
        } else if self.caps.autopilot {
            flashlight_rating *= 0.4;
        }

        let total_hits = f64::from(self.total_hits);

        let mut rating_multiplier = 0.7
            + 0.1 * (total_hits / 200.0).min(1.0)
            + f64::from(u8::from(self.total_hits > 200))
                * 0.2
                * ((total_hits - 200.0) / 200.0).min(1.0);

        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powi(2) / 2500.0;

        flashlight_rating * rating_multiplier.sqrt()
    }

    fn ar_factor(&self) -> f64 {
        if self.approach_rate > 10.33 {
            0.3 * (self.approach_rate - 10.33)
        } else if self.approach_rate < 8.0 {
            0.05 * (8.0 - self.approach_rate)
        } else {
            0.0
        }
    }

    fn ar_length_bonus(&self) -> f64 {
        let total_hits = f64::from(self.total_hits);

        0.95 + 0.4 * (total_hits / 2000.0).min(1.0)
            + f64::from(u8::from(self.total_hits > 2000)) * (total_hits / 2000.0).log10() * 0.5
    }

    /// Extra reading difficulty of low approach rates under hidden.
    pub fn calculate_visibility_bonus(
        caps: &ModCapabilities,
        approach_rate: f64,
        visibility_factor: Option<f64>,
        slider_factor: Option<f64>,
    ) -> f64 {
        let is_always_partially_visible = caps.traceable;

        let mut reading_bonus =
            0.04 * (12.0 - approach_rate.max(7.0)) * visibility_factor.unwrap_or(1.0);

        let slider_visibility_factor = slider_factor.unwrap_or(1.0).powi(3);

        if approach_rate < 7.0 {
            let factor = if is_always_partially_visible {
                0.03
            } else {
                0.045
            };

            reading_bonus += factor * (7.0 - approach_rate.max(0.0)) * slider_visibility_factor;
        }

        if approach_rate < 0.0 {
            let factor = if is_always_partially_visible {
                0.075
            } else {
                0.1
            };

            reading_bonus +=
                factor * (1.0 - 1.5_f64.powf(approach_rate)) * slider_visibility_factor;
        }

        reading_bonus
    }

    pub fn calculate_difficulty_rating(difficulty_value: f64) -> f64 {
        difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER
    }

    fn calculate_aim_visibility_factor(
        mechanical_difficulty_rating: f64,
        approach_rate: f64,
    ) -> f64 {
        Self::visibility_factor(mechanical_difficulty_rating, approach_rate, 9.0)
    }

    fn calculate_speed_visibility_factor(
        mechanical_difficulty_rating: f64,
        approach_rate: f64,
    ) -> f64 {
        Self::visibility_factor(mechanical_difficulty_rating, approach_rate, 10.0)
    }

    fn visibility_factor(
        mechanical_difficulty_rating: f64,
        approach_rate: f64,
        lowest_starting_point: f64,
    ) -> f64 {
        const AR_FACTOR_END_POINT: f64 = 11.5;

        let mechanical_difficulty_factor = reverse_lerp(mechanical_difficulty_rating, 5.0, 10.0);
        let ar_factor_starting_point =
            FloatExt::lerp(lowest_starting_point, 10.33, mechanical_difficulty_factor);

        reverse_lerp(approach_rate, AR_FACTOR_END_POINT, ar_factor_starting_point)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::mods::GameMods;

    use super::*;

    fn caps(bits: u32) -> ModCapabilities {
        ModCapabilities::from(&GameMods::from(bits))
    }

    #[test]
    fn relax_removes_speed() {
        let caps = caps(128);
        let calc = OsuRatingCalculator::new(&caps, 500, 9.0, 8.0, 5.0, 1.0);

        assert!(calc.compute_speed_rating(1000.0).abs() < f64::EPSILON);
        assert!(calc.compute_aim_rating(1000.0) > 0.0);
    }

    #[test]
    fn autopilot_removes_aim() {
        let caps = caps(8192);
        let calc = OsuRatingCalculator::new(&caps, 500, 9.0, 8.0, 5.0, 1.0);

        assert!(calc.compute_aim_rating(1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flashlight_requires_the_mod() {
        let no_fl = caps(0);
        let fl = caps(1024);

        let without = OsuRatingCalculator::new(&no_fl, 500, 9.0, 8.0, 5.0, 1.0);
        let with = OsuRatingCalculator::new(&fl, 500, 9.0, 8.0, 5.0, 1.0);

        assert!(without.compute_flashlight_rating(100.0).abs() < f64::EPSILON);
        assert!(with.compute_flashlight_rating(100.0) > 0.0);
    }

    #[test]
    fn hidden_rewards_low_approach_rate() {
        let nm = caps(0);
        let hd = caps(8);

        let nomod = OsuRatingCalculator::new(&nm, 500, 6.0, 8.0, 5.0, 1.0);
        let hidden = OsuRatingCalculator::new(&hd, 500, 6.0, 8.0, 5.0, 1.0);

        assert!(hidden.compute_aim_rating(1000.0) > nomod.compute_aim_rating(1000.0));
    }
}
