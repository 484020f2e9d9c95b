use std::f64::consts::{E, SQRT_2};

use crate::{
    any::{difficulty::skills::difficulty_to_performance, ScoreState},
    droid::attributes::{DroidDifficultyAttributes, DroidPerformanceAttributes},
    model::mods::ModCapabilities,
    osu::{
        calculate_miss_penalty, estimate_deviation, length_bonus, total_successful_hits,
        JudgementCounts,
    },
    util::difficulty::{erf, erf_inv, logistic},
};

const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.24;

/// Amount of consistently hit notes at which streak scaling is neutral.
const STREAK_BENCHMARK: f64 = 700.0;

pub(super) struct DroidPerformanceCalculator<'caps> {
    attrs: DroidDifficultyAttributes,
    caps: &'caps ModCapabilities,
    state: ScoreState,
    effective_miss_count: f64,
    using_classic_slider_acc: bool,
}

impl<'caps> DroidPerformanceCalculator<'caps> {
    pub const fn new(
        attrs: DroidDifficultyAttributes,
        caps: &'caps ModCapabilities,
        state: ScoreState,
        effective_miss_count: f64,
        using_classic_slider_acc: bool,
    ) -> Self {
        Self {
            attrs,
            caps,
            state,
            effective_miss_count,
            using_classic_slider_acc,
        }
    }
}

impl DroidPerformanceCalculator<'_> {
    pub fn calculate(self) -> DroidPerformanceAttributes {
        let total_hits = self.state.total_hits();

        if total_hits == 0 {
            return DroidPerformanceAttributes {
                difficulty: self.attrs,
                deviation: f64::INFINITY,
                tap_deviation: f64::INFINITY,
                ..Default::default()
            };
        }

        let total_hits = f64::from(total_hits);

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.caps.no_fail {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.caps.spun_out {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / total_hits).powf(0.85);
        }

        let deviation = self.calculate_deviation();
        let tap_deviation = self.calculate_tap_deviation();

        let aim_value = self.compute_aim_value(deviation);
        let tap_value = self.compute_tap_value(tap_deviation);
        let acc_value = self.compute_accuracy_value(deviation);
        let flashlight_value = self.compute_flashlight_value(deviation);
        let visual_value = self.compute_visual_value(deviation);

        let pp = (aim_value.powf(1.1)
            + tap_value.powf(1.1)
            + acc_value.powf(1.1)
            + flashlight_value.powf(1.1)
            + visual_value.powf(1.1))
        .powf(1.0 / 1.1)
            * multiplier;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pp,
            aim = aim_value,
            tap = tap_value,
            acc = acc_value,
            flashlight = flashlight_value,
            visual = visual_value,
            effective_miss_count = self.effective_miss_count,
            ?deviation,
            ?tap_deviation,
            "Calculated osu!droid performance"
        );

        DroidPerformanceAttributes {
            difficulty: self.attrs,
            pp,
            pp_aim: aim_value,
            pp_tap: tap_value,
            pp_accuracy: acc_value,
            pp_flashlight: flashlight_value,
            pp_visual: visual_value,
            effective_miss_count: self.effective_miss_count,
            deviation: deviation.unwrap_or(f64::INFINITY),
            tap_deviation: tap_deviation.unwrap_or(f64::INFINITY),
        }
    }

    fn compute_aim_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| !self.caps.autopilot) else {
            return 0.0;
        };

        let mut aim_value = difficulty_to_performance(self.attrs.aim.powf(0.8));

        if self.effective_miss_count > 0.0 {
            aim_value *= self.strain_miss_penalty(self.attrs.aim_difficult_strain_count);
        }

        aim_value *= self.streak_scaling(self.total_hits(), deviation);
        aim_value *= self.slider_nerf_factor();

        aim_value *= 1.025 * erf(25.0 / (SQRT_2 * deviation)).powf(0.8);

        // OD bonus frozen at OD 7; deviation covers the rest
        aim_value * (0.98 + 7.0_f64.powi(2) / 2500.0)
    }

    fn compute_tap_value(&self, tap_deviation: Option<f64>) -> f64 {
        let Some(tap_deviation) = tap_deviation.filter(|_| !self.caps.relax) else {
            return 0.0;
        };

        let mut tap_value = difficulty_to_performance(self.attrs.tap);

        if self.effective_miss_count > 0.0 {
            tap_value *= self.strain_miss_penalty(self.attrs.tap_difficult_strain_count);
        }

        let relevant_notes = self.attrs.speed_note_count.min(self.total_hits() / 1.45);
        tap_value *= length_bonus(relevant_notes);

        let delta_time = self.attrs.average_speed_delta_time.max(1.0);
        let adjusted_deviation = adjusted_tap_deviation(tap_deviation, delta_time);

        tap_value *= 1.1 * erf(35.0 / (SQRT_2 * adjusted_deviation)).powf(0.6);

        // Sloppy tapping at the map's speed is indistinguishable from vibro
        let vibro_weight = self.attrs.vibro_factor.clamp(0.0, 1.0).powi(6);
        let precision = 1.0 - logistic(tap_deviation, delta_time / 2.0, 25.0 / delta_time, None);
        tap_value *= (1.0 - vibro_weight) * precision + vibro_weight;

        // OD bonus frozen at OD 8; deviation covers the rest
        tap_value * (0.95 + 8.0_f64.powi(2) / 750.0)
    }

    fn compute_accuracy_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| !self.caps.relax) else {
            return 0.0;
        };

        let mut acc_value = 650.0 * (-0.1 * deviation).exp() * (15.0 / (deviation + 15.0) + 0.65);

        // Bonus for many circles, capped at around 1600 of them
        let n_circles = f64::from(self.attrs.n_circles);
        acc_value *= f64::min(
            1.15,
            (1.0 + (E - 1.0) * n_circles / 1000.0)
                .ln()
                .sqrt(),
        );

        // Rhythmically complex maps are harder to hit accurately
        acc_value *= 1.5 / (1.0 + (-(self.attrs.rhythm - 1.0) / 2.0).exp());

        acc_value *= 0.97_f64.powf((self.effective_miss_count - 1.0).max(0.0));

        if self.caps.hidden {
            acc_value *= 1.08;
        }

        if self.caps.flashlight {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn compute_flashlight_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| self.caps.flashlight) else {
            return 0.0;
        };

        let mut flashlight_value = self.attrs.flashlight.powf(1.6) * 25.0;

        flashlight_value *=
            self.proportional_miss_penalty(self.attrs.flashlight_difficult_strain_count);
        flashlight_value *= self.streak_scaling(self.total_hits(), deviation);

        flashlight_value * erf(50.0 / (SQRT_2 * deviation))
    }

    fn compute_visual_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| !self.caps.relax) else {
            return 0.0;
        };

        let mut visual_value = self.attrs.visual.powf(1.6) * 22.5;

        visual_value *= self.proportional_miss_penalty(self.attrs.visual_difficult_strain_count);
        visual_value *= self.streak_scaling(self.total_hits(), deviation);

        visual_value *= 1.065 * erf(30.0 / (SQRT_2 * deviation)).powf(1.75);

        // OD bonus frozen at OD 5; deviation covers the rest
        visual_value * (0.98 + 5.0_f64.powi(2) / 2500.0)
    }

    /// Deviation on circles, falling back to sliders if no circle was hit;
    /// `None` without any successful hit.
    fn calculate_deviation(&self) -> Option<f64> {
        if total_successful_hits(&self.state) == 0 {
            return None;
        }

        let n_circles = f64::from(self.attrs.n_circles);

        // Worst case: all mistakes were on circles
        let counts = relevant_counts(&self.state, n_circles);

        estimate_deviation(
            counts,
            self.attrs.great_hit_window,
            self.attrs.ok_hit_window,
            self.attrs.meh_hit_window,
        )
        .or_else(|| self.slider_deviation(counts.great))
    }

    /// Sliders only record whether their head was hit, so their greats are
    /// treated as hits within the meh window.
    fn slider_deviation(&self, circle_greats: f64) -> Option<f64> {
        if self.attrs.n_sliders == 0 {
            return None;
        }

        let great_sliders = (f64::from(self.state.n300) - circle_greats).max(0.0);

        if great_sliders <= 0.0 {
            return None;
        }

        let n_sliders = f64::from(self.attrs.n_sliders);
        let p = (great_sliders / (n_sliders + 1.0)).min(n_sliders / (n_sliders + 1.0));

        Some(self.attrs.meh_hit_window / (SQRT_2 * erf_inv(p)))
    }

    /// Deviation on the notes that are relevant for tapping; `None` without
    /// any successful hit.
    fn calculate_tap_deviation(&self) -> Option<f64> {
        if total_successful_hits(&self.state) == 0 {
            return None;
        }

        let counts = relevant_counts(&self.state, self.attrs.speed_note_count);

        estimate_deviation(
            counts,
            self.attrs.great_hit_window,
            self.attrs.ok_hit_window,
            self.attrs.meh_hit_window,
        )
    }

    /// Scales a skill by how many notes in a row a player with `deviation`
    /// is expected to hit within the great window, relative to a benchmark
    /// streak of 700 notes.
    ///
    /// A perfectly consistent player streaks through all `n_notes`; sloppier
    /// players restart their streak earlier, so long maps stop paying off.
    fn streak_scaling(&self, n_notes: f64, deviation: f64) -> f64 {
        let p = erf(self.attrs.great_hit_window / (SQRT_2 * deviation));

        let expected_streak = if p >= 1.0 {
            n_notes
        } else {
            // (1 - p^n) / (1 - p) without losing precision for p close to 1
            -(n_notes * (p - 1.0).ln_1p()).exp_m1() / (1.0 - p)
        };

        (expected_streak / STREAK_BENCHMARK).powf(0.15)
    }

    /// Aim is nerfed by the share of difficult sliders that were likely not
    /// followed.
    fn slider_nerf_factor(&self) -> f64 {
        if self.attrs.n_sliders == 0 || self.attrs.aim_difficult_slider_count <= 0.0 {
            return 1.0;
        }

        let improperly_followed_sliders = if self.using_classic_slider_acc {
            // Every missing combo counts as a dropped difficult slider
            let maximum_possible_dropped_sliders =
                f64::from(self.state.n100 + self.state.n50 + self.state.misses);

            f64::min(
                maximum_possible_dropped_sliders,
                f64::from(self.attrs.max_combo.saturating_sub(self.state.max_combo)),
            )
        } else {
            f64::from(self.n_slider_ends_dropped() + self.n_large_tick_miss())
        };

        let estimate_improperly_followed_difficult_sliders =
            improperly_followed_sliders.clamp(0.0, self.attrs.aim_difficult_slider_count);

        (1.0 - self.attrs.slider_factor)
            * f64::powf(
                1.0 - estimate_improperly_followed_difficult_sliders
                    / self.attrs.aim_difficult_slider_count,
                3.0,
            )
            + self.attrs.slider_factor
    }

    fn strain_miss_penalty(&self, difficult_strain_count: f64) -> f64 {
        calculate_miss_penalty(self.effective_miss_count, difficult_strain_count.max(1.0))
    }

    /// Penalty for skills whose strains are spread evenly over the map.
    fn proportional_miss_penalty(&self, difficult_strain_count: f64) -> f64 {
        if self.effective_miss_count <= 0.0 {
            return 1.0;
        }

        let miss_prop = ((difficult_strain_count - self.effective_miss_count)
            / (difficult_strain_count + 1.0))
            .max(0.0);

        if miss_prop <= 0.0 {
            return 0.0;
        }

        let no_miss_prop = difficult_strain_count / (difficult_strain_count + 1.0);

        erf_inv(miss_prop) / erf_inv(no_miss_prop) * miss_prop.powi(8)
    }

    fn n_slider_ends_dropped(&self) -> u32 {
        self.state
            .slider_end_hits
            .map_or(0, |hits| self.attrs.n_sliders.saturating_sub(hits))
    }

    fn n_large_tick_miss(&self) -> u32 {
        self.state
            .large_tick_hits
            .map_or(0, |hits| self.attrs.n_large_ticks.saturating_sub(hits))
    }

    const fn total_hits(&self) -> f64 {
        self.state.total_hits() as f64
    }
}

/// Tap deviation normalized to a delta time of at least 50ms, i.e. 300 BPM
/// 1/4 streams, and doubled once it exceeds what could still be vibro at the
/// map's speed.
fn adjusted_tap_deviation(tap_deviation: f64, delta_time: f64) -> f64 {
    let normalized = tap_deviation * (50.0 / delta_time).max(1.0);

    normalized * (1.0 + logistic(normalized, delta_time / 2.0, 25.0 / delta_time, None))
}

/// Judgements restricted to `n_notes` objects, assuming imperfect
/// judgements all happened on them.
fn relevant_counts(state: &ScoreState, n_notes: f64) -> JudgementCounts {
    let miss = f64::min(f64::from(state.misses), n_notes);
    let meh = f64::min(f64::from(state.n50), n_notes - miss);
    let ok = f64::min(f64::from(state.n100), n_notes - miss - meh);
    let great = f64::max(0.0, n_notes - miss - meh - ok);

    JudgementCounts {
        great,
        ok,
        meh,
        miss,
    }
}

#[cfg(test)]
mod tests {
    use crate::model::mods::GameMods;

    use super::*;

    fn attrs() -> DroidDifficultyAttributes {
        DroidDifficultyAttributes {
            aim: 2.5,
            tap: 2.1,
            rhythm: 1.05,
            flashlight: 1.6,
            visual: 1.3,
            slider_factor: 0.98,
            speed_note_count: 150.0,
            average_speed_delta_time: 90.0,
            vibro_factor: 0.85,
            aim_difficult_strain_count: 80.0,
            tap_difficult_strain_count: 60.0,
            flashlight_difficult_strain_count: 50.0,
            visual_difficult_strain_count: 55.0,
            aim_difficult_slider_count: 20.0,
            great_hit_window: 50.0,
            ok_hit_window: 100.0,
            meh_hit_window: 150.0,
            approach_rate: 9.0,
            overall_difficulty: 8.0,
            n_circles: 200,
            n_sliders: 100,
            max_combo: 500,
            clock_rate: 1.0,
            ..Default::default()
        }
    }

    fn state(n300: u32, n100: u32, n50: u32, misses: u32) -> ScoreState {
        ScoreState {
            max_combo: 500,
            n300,
            n100,
            n50,
            misses,
            ..ScoreState::new()
        }
    }

    fn calculate_with(
        attrs: DroidDifficultyAttributes,
        mods: u32,
        state: ScoreState,
        effective_miss_count: f64,
    ) -> DroidPerformanceAttributes {
        let caps = ModCapabilities::from(&GameMods::from(mods));

        DroidPerformanceCalculator::new(attrs, &caps, state, effective_miss_count, true)
            .calculate()
    }

    fn calculate(mods: u32, state: ScoreState, effective_miss_count: f64) -> DroidPerformanceAttributes {
        calculate_with(attrs(), mods, state, effective_miss_count)
    }

    #[test]
    fn no_hits_give_infinite_deviation() {
        let attrs = calculate(0, state(0, 0, 0, 300), 300.0);

        assert!(attrs.deviation.is_infinite());
        assert!(attrs.tap_deviation.is_infinite());
        assert!(attrs.pp_aim.abs() < f64::EPSILON);
        assert!(attrs.pp_tap.abs() < f64::EPSILON);
        assert!(attrs.pp_accuracy.abs() < f64::EPSILON);
        assert!(attrs.pp_visual.abs() < f64::EPSILON);
        assert!(attrs.pp.abs() < f64::EPSILON);
    }

    #[test]
    fn perfect_play_has_finite_deviation() {
        let attrs = calculate(0, state(300, 0, 0, 0), 0.0);

        assert!(attrs.deviation.is_finite());
        assert!(attrs.tap_deviation.is_finite());
        assert!(attrs.pp > 0.0);
        assert!(attrs.pp_flashlight.abs() < f64::EPSILON);
    }

    #[test]
    fn flashlight_only_counts_with_the_mod() {
        let attrs = calculate(1024, state(300, 0, 0, 0), 0.0);

        assert!(attrs.pp_flashlight > 0.0);
    }

    #[test]
    fn misses_reduce_every_skill() {
        let clean = calculate(1024, state(300, 0, 0, 0), 0.0);
        let missed = calculate(1024, state(295, 0, 0, 5), 5.0);

        assert!(missed.pp_aim < clean.pp_aim);
        assert!(missed.pp_tap < clean.pp_tap);
        assert!(missed.pp_flashlight < clean.pp_flashlight);
        assert!(missed.pp_visual < clean.pp_visual);
    }

    #[test]
    fn relax_removes_tap_accuracy_and_visual() {
        let attrs = calculate(128, state(300, 0, 0, 0), 0.0);

        assert!(attrs.pp_tap.abs() < f64::EPSILON);
        assert!(attrs.pp_accuracy.abs() < f64::EPSILON);
        assert!(attrs.pp_visual.abs() < f64::EPSILON);
        assert!(attrs.pp_aim > 0.0);
    }

    #[test]
    fn deviation_grows_with_worse_judgements() {
        let good = calculate(0, state(290, 10, 0, 0), 0.0);
        let bad = calculate(0, state(200, 80, 20, 0), 0.0);

        assert!(bad.deviation > good.deviation);
        assert!(bad.pp_accuracy < good.pp_accuracy);
    }

    #[test]
    fn sliders_carry_the_deviation_without_circle_hits() {
        let attrs = DroidDifficultyAttributes {
            n_circles: 0,
            n_sliders: 300,
            ..attrs()
        };

        let perf = calculate_with(attrs, 0, state(250, 0, 0, 50), 50.0);

        assert!(perf.deviation.is_finite());
        assert!(perf.deviation > 0.0);
    }

    #[test]
    fn vibro_only_matters_for_sloppy_tapping() {
        let vibro = DroidDifficultyAttributes {
            vibro_factor: 0.5,
            ..attrs()
        };

        let precise = calculate(0, state(300, 0, 0, 0), 0.0);
        let precise_vibro = calculate_with(vibro.clone(), 0, state(300, 0, 0, 0), 0.0);

        let sloppy = calculate(0, state(150, 150, 0, 0), 0.0);
        let sloppy_vibro = calculate_with(vibro, 0, state(150, 150, 0, 0), 0.0);

        let precise_ratio = precise_vibro.pp_tap / precise.pp_tap;
        let sloppy_ratio = sloppy_vibro.pp_tap / sloppy.pp_tap;

        assert!(sloppy_ratio < precise_ratio, "{sloppy_ratio} >= {precise_ratio}");
    }

    #[test]
    fn streaks_reward_consistent_players_on_long_maps() {
        let caps = ModCapabilities::from(&GameMods::default());
        let calc = DroidPerformanceCalculator::new(attrs(), &caps, state(300, 0, 0, 0), 0.0, true);

        let consistent_short = calc.streak_scaling(300.0, 10.0);
        let consistent_long = calc.streak_scaling(3000.0, 10.0);
        let sloppy_short = calc.streak_scaling(300.0, 30.0);
        let sloppy_long = calc.streak_scaling(3000.0, 30.0);

        assert!(consistent_long > 1.0);
        assert!(consistent_long > consistent_short);
        assert!(sloppy_short < consistent_short);
        assert!((sloppy_long - sloppy_short).abs() < 1e-3);
    }

    #[test]
    fn tap_deviation_is_normalized_to_fast_streams() {
        let slow = adjusted_tap_deviation(20.0, 100.0);
        let fast = adjusted_tap_deviation(20.0, 25.0);

        assert!((slow - 20.0).abs() < 0.05, "{slow}");
        assert!(fast > 2.0 * 20.0, "{fast}");
        assert!(adjusted_tap_deviation(60.0, 100.0) > 100.0);
    }

    #[test]
    fn proportional_penalty_is_bounded() {
        let caps = ModCapabilities::from(&GameMods::default());

        let with_misses = |emc| {
            DroidPerformanceCalculator::new(attrs(), &caps, state(290, 0, 0, 10), emc, true)
                .proportional_miss_penalty(50.0)
        };

        assert!((with_misses(0.0) - 1.0).abs() < f64::EPSILON);
        assert!(with_misses(1.0) < 1.0);
        assert!(with_misses(10.0) < with_misses(1.0));
        assert!(with_misses(100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_fail_and_spun_out_reduce_pp() {
        let nomod = calculate(0, state(295, 0, 0, 5), 5.0);
        let nf = calculate(1, state(295, 0, 0, 5), 5.0);

        assert!(nf.pp < nomod.pp);

        let attrs = DroidDifficultyAttributes {
            n_spinners: 30,
            ..attrs()
        };

        let so = calculate_with(attrs.clone(), 4096, state(330, 0, 0, 0), 0.0);
        let no_so = calculate_with(attrs, 0, state(330, 0, 0, 0), 0.0);

        assert!(so.pp < no_so.pp);
    }
}
