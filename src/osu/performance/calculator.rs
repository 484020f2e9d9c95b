use std::f64::consts::{PI, SQRT_2};

use crate::{
    any::{difficulty::skills::difficulty_to_performance, ScoreState},
    model::mods::ModCapabilities,
    osu::{
        attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
        difficulty::skills::flashlight::Flashlight,
    },
    util::{
        difficulty::{erf, erf_inv, reverse_lerp},
        float_ext::FloatExt,
    },
};

use super::{n_large_tick_miss, n_slider_ends_dropped, total_imperfect_hits};

/// Keeps the final pp value scaled around its historical range.
pub const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

pub(super) struct OsuPerformanceCalculator<'caps> {
    attrs: OsuDifficultyAttributes,
    caps: &'caps ModCapabilities,
    acc: f64,
    state: ScoreState,
    effective_miss_count: f64,
    using_classic_slider_acc: bool,
}

impl<'caps> OsuPerformanceCalculator<'caps> {
    pub const fn new(
        attrs: OsuDifficultyAttributes,
        caps: &'caps ModCapabilities,
        acc: f64,
        state: ScoreState,
        effective_miss_count: f64,
        using_classic_slider_acc: bool,
    ) -> Self {
        Self {
            attrs,
            caps,
            acc,
            state,
            effective_miss_count,
            using_classic_slider_acc,
        }
    }
}

impl OsuPerformanceCalculator<'_> {
    pub fn calculate(mut self) -> OsuPerformanceAttributes {
        let total_hits = self.state.total_hits();

        if total_hits == 0 {
            return OsuPerformanceAttributes {
                difficulty: self.attrs,
                speed_deviation: f64::INFINITY,
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

        if self.caps.relax {
            let od = self.attrs.od;

            // OD 13.33 is where the great window closes entirely
            let (n100_mult, n50_mult) = if od > 0.0 {
                (
                    (1.0 - (od / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (od / 13.33).powf(5.0)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.state.n100) * n100_mult
                + f64::from(self.state.n50) * n50_mult)
                .min(total_hits);
        }

        let speed_deviation = self.calculate_speed_deviation();

        let aim_value = self.compute_aim_value();
        let speed_value = self.compute_speed_value(speed_deviation);
        let acc_value = self.compute_accuracy_value();
        let flashlight_value = self.compute_flashlight_value();

        let pp = (aim_value.powf(1.1)
            + speed_value.powf(1.1)
            + acc_value.powf(1.1)
            + flashlight_value.powf(1.1))
        .powf(1.0 / 1.1)
            * multiplier;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pp,
            aim = aim_value,
            speed = speed_value,
            acc = acc_value,
            flashlight = flashlight_value,
            effective_miss_count = self.effective_miss_count,
            "Calculated osu!standard performance"
        );

        OsuPerformanceAttributes {
            difficulty: self.attrs,
            pp,
            pp_acc: acc_value,
            pp_aim: aim_value,
            pp_flashlight: flashlight_value,
            pp_speed: speed_value,
            effective_miss_count: self.effective_miss_count,
            speed_deviation: speed_deviation.unwrap_or(f64::INFINITY),
        }
    }

    fn compute_aim_value(&self) -> f64 {
        if self.caps.autopilot {
            return 0.0;
        }

        let mut aim_difficulty = self.attrs.aim;

        if self.attrs.n_sliders > 0 && self.attrs.aim_difficult_slider_count > 0.0 {
            let estimate_improperly_followed_difficult_sliders = if self.using_classic_slider_acc {
                // Every missing combo counts as a dropped difficult slider
                let maximum_possible_dropped_sliders = total_imperfect_hits(&self.state);

                f64::clamp(
                    f64::min(
                        maximum_possible_dropped_sliders,
                        f64::from(self.attrs.max_combo.saturating_sub(self.state.max_combo)),
                    ),
                    0.0,
                    self.attrs.aim_difficult_slider_count,
                )
            } else {
                f64::clamp(
                    f64::from(
                        n_slider_ends_dropped(&self.attrs, &self.state)
                            + n_large_tick_miss(&self.attrs, &self.state),
                    ),
                    0.0,
                    self.attrs.aim_difficult_slider_count,
                )
            };

            let slider_nerf_factor = (1.0 - self.attrs.slider_factor)
                * f64::powf(
                    1.0 - estimate_improperly_followed_difficult_sliders
                        / self.attrs.aim_difficult_slider_count,
                    3.0,
                )
                + self.attrs.slider_factor;

            aim_difficulty *= slider_nerf_factor;
        }

        let mut aim_value = difficulty_to_performance(aim_difficulty);

        let total_hits = self.total_hits();
        let len_bonus = length_bonus(total_hits);

        aim_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            aim_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        let ar_factor = if self.caps.relax {
            0.0
        } else if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else if self.attrs.ar < 8.0 {
            0.05 * (8.0 - self.attrs.ar)
        } else {
            0.0
        };

        // Longer maps with high AR
        aim_value *= 1.0 + ar_factor * len_bonus;

        if self.caps.hidden || self.caps.traceable {
            aim_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        aim_value *= self.acc;
        aim_value *= 0.98 + f64::powf(f64::max(0.0, self.attrs.od), 2.0) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self, speed_deviation: Option<f64>) -> f64 {
        let Some(speed_deviation) = speed_deviation.filter(|_| !self.caps.relax) else {
            return 0.0;
        };

        let mut speed_value = difficulty_to_performance(self.attrs.speed);

        let total_hits = self.total_hits();
        let len_bonus = length_bonus(total_hits);

        speed_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            speed_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.speed_difficult_strain_count,
            );
        }

        let ar_factor = if self.caps.autopilot {
            0.0
        } else if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else {
            0.0
        };

        speed_value *= 1.0 + ar_factor * len_bonus;

        if self.caps.hidden || self.caps.traceable {
            speed_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        speed_value *= self.calculate_speed_high_deviation_nerf(speed_deviation);

        // Worst case: every imperfect judgement was on a speed note
        let relevant_total_diff = f64::max(0.0, total_hits - self.attrs.speed_note_count);
        let relevant_n300 = (f64::from(self.state.n300) - relevant_total_diff).max(0.0);
        let relevant_n100 = (f64::from(self.state.n100)
            - (relevant_total_diff - f64::from(self.state.n300)).max(0.0))
        .max(0.0);
        let relevant_n50 = (f64::from(self.state.n50)
            - (relevant_total_diff - f64::from(self.state.n300 + self.state.n100)).max(0.0))
        .max(0.0);

        let relevant_acc = if self.attrs.speed_note_count.eq(0.0) {
            0.0
        } else {
            (relevant_n300 * 6.0 + relevant_n100 * 2.0 + relevant_n50)
                / (self.attrs.speed_note_count * 6.0)
        };

        let od = self.attrs.od;

        speed_value *= (0.95 + f64::powf(f64::max(0.0, od), 2.0) / 750.0)
            * f64::powf((self.acc + relevant_acc) / 2.0, (14.5 - od) / 2.0);

        speed_value
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.caps.relax {
            return 0.0;
        }

        // Only objects whose head is judged by timing
        let mut amount_hit_objects_with_acc = self.attrs.n_circles;

        if !self.using_classic_slider_acc {
            amount_hit_objects_with_acc += self.attrs.n_sliders;
        }

        let better_acc_percentage = if amount_hit_objects_with_acc > 0 {
            let n300 = i64::from(self.state.n300);
            let surplus = (i64::from(self.state.total_hits())
                - i64::from(amount_hit_objects_with_acc))
            .max(0);

            let numerator =
                (n300 - surplus) * 6 + i64::from(self.state.n100) * 2 + i64::from(self.state.n50);

            numerator as f64 / f64::from(amount_hit_objects_with_acc * 6)
        } else {
            0.0
        };

        let better_acc_percentage = better_acc_percentage.max(0.0);

        let mut acc_value =
            1.52163_f64.powf(self.attrs.od) * better_acc_percentage.powf(24.0) * 2.83;

        // Longer maps are harder to keep accurate on
        acc_value *= (f64::from(amount_hit_objects_with_acc) / 1000.0)
            .powf(0.3)
            .min(1.15);

        if self.caps.hidden || self.caps.traceable {
            acc_value *= 1.08;
        }

        if self.caps.flashlight {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn compute_flashlight_value(&self) -> f64 {
        if !self.caps.flashlight {
            return 0.0;
        }

        let mut flashlight_value = Flashlight::difficulty_to_performance(self.attrs.flashlight);

        let total_hits = self.total_hits();

        if self.effective_miss_count > 0.0 {
            flashlight_value *= 0.97
                * (1.0 - (self.effective_miss_count / total_hits).powf(0.775))
                    .powf(self.effective_miss_count.powf(0.875));
        }

        flashlight_value *= self.get_combo_scaling_factor();

        // Short maps spend relatively more time at a small flashlight radius
        flashlight_value *= 0.7
            + 0.1 * (total_hits / 200.0).min(1.0)
            + f64::from(u8::from(total_hits > 200.0))
                * 0.2
                * ((total_hits - 200.0) / 200.0).min(1.0);

        flashlight_value *= 0.5 + self.acc / 2.0;
        flashlight_value *= 0.98 + f64::powf(f64::max(0.0, self.attrs.od), 2.0) / 2500.0;

        flashlight_value
    }

    /// Deviation on speed notes; `None` without any successful hit.
    fn calculate_speed_deviation(&self) -> Option<f64> {
        if total_successful_hits(&self.state) == 0 {
            return None;
        }

        let mut speed_note_count = self.attrs.speed_note_count;
        speed_note_count +=
            (f64::from(self.state.total_hits()) - self.attrs.speed_note_count) * 0.1;

        // Worst case: all mistakes were on speed notes
        let relevant_count_miss = f64::min(f64::from(self.state.misses), speed_note_count);
        let relevant_count_meh = f64::min(
            f64::from(self.state.n50),
            speed_note_count - relevant_count_miss,
        );
        let relevant_count_ok = f64::min(
            f64::from(self.state.n100),
            speed_note_count - relevant_count_miss - relevant_count_meh,
        );
        let relevant_count_great = f64::max(
            0.0,
            speed_note_count - relevant_count_miss - relevant_count_meh - relevant_count_ok,
        );

        estimate_deviation(
            JudgementCounts {
                great: relevant_count_great,
                ok: relevant_count_ok,
                meh: relevant_count_meh,
                miss: relevant_count_miss,
            },
            self.attrs.great_hit_window,
            self.attrs.ok_hit_window,
            self.attrs.meh_hit_window,
        )
    }

    /// Scales speed pp above a deviation-dependent cutoff logarithmically.
    fn calculate_speed_high_deviation_nerf(&self, speed_deviation: f64) -> f64 {
        const SCALE: f64 = 50.0;

        let speed_value = difficulty_to_performance(self.attrs.speed);

        let excess_speed_difficulty_cutoff = 100.0 + 220.0 * f64::powf(22.0 / speed_deviation, 6.5);

        if speed_value <= excess_speed_difficulty_cutoff {
            return 1.0;
        }

        let mut adjusted_speed_value = SCALE
            * (f64::ln((speed_value - excess_speed_difficulty_cutoff) / SCALE + 1.0)
                + excess_speed_difficulty_cutoff / SCALE);

        // Up to 220 UR counts as tapped correctly
        let lerp = 1.0 - reverse_lerp(speed_deviation, 22.0, 27.0);
        adjusted_speed_value = f64::lerp(adjusted_speed_value, speed_value, lerp);

        adjusted_speed_value / speed_value
    }

    fn get_combo_scaling_factor(&self) -> f64 {
        if self.attrs.max_combo == 0 {
            1.0
        } else {
            (f64::from(self.state.max_combo).powf(0.8) / f64::from(self.attrs.max_combo).powf(0.8))
                .min(1.0)
        }
    }

    const fn total_hits(&self) -> f64 {
        self.state.total_hits() as f64
    }
}

/// Bonus for long maps, neutral at 250 notes.
pub(crate) fn length_bonus(total_hits: f64) -> f64 {
    0.95 + 0.4 * (total_hits / 2000.0).min(1.0)
        + f64::from(u8::from(total_hits > 2000.0)) * (total_hits / 2000.0).log10() * 0.5
}

/// Misses are assumed to happen on the hardest parts of a map, so maps with
/// few hard sections are punished harder.
pub(crate) fn calculate_miss_penalty(miss_count: f64, diff_strain_count: f64) -> f64 {
    0.96 / ((miss_count / (4.0 * diff_strain_count.ln().powf(0.94))) + 1.0)
}

/// Judgement counts restricted to a subset of objects.
#[derive(Copy, Clone, Debug)]
pub(crate) struct JudgementCounts {
    pub great: f64,
    pub ok: f64,
    pub meh: f64,
    pub miss: f64,
}

/// Estimated hit deviation in milliseconds; `None` without any successful
/// hit.
///
/// Greats and oks are assumed to be normally distributed, mehs uniformly.
pub(crate) fn estimate_deviation(
    counts: JudgementCounts,
    great_hit_window: f64,
    ok_hit_window: f64,
    meh_hit_window: f64,
) -> Option<f64> {
    // One-tailed 99% critical value of the normal distribution
    const Z: f64 = 2.32634787404;

    let JudgementCounts {
        great: relevant_count_great,
        ok: relevant_count_ok,
        meh: relevant_count_meh,
        miss: relevant_count_miss,
    } = counts;

    if relevant_count_great + relevant_count_ok + relevant_count_meh <= 0.0 {
        return None;
    }

    let object_count =
        relevant_count_great + relevant_count_ok + relevant_count_meh + relevant_count_miss;

    let n = f64::max(1.0, object_count - relevant_count_miss - relevant_count_meh);
    let p = relevant_count_great / n;

    // Wilson lower bound of p
    let p_lower_bound = (n * p + Z * Z / 2.0) / (n + Z * Z)
        - Z / (n + Z * Z) * f64::sqrt(n * p * (1.0 - p) + Z * Z / 4.0);

    let mut deviation = great_hit_window / (SQRT_2 * erf_inv(p_lower_bound));

    let random_value = f64::sqrt(2.0 / PI)
        * ok_hit_window
        * f64::exp(-0.5 * f64::powf(ok_hit_window / deviation, 2.0))
        / (deviation * erf(ok_hit_window / (SQRT_2 * deviation)));

    deviation *= f64::sqrt(1.0 - random_value);

    // Deviation as the great count approaches 0
    let limit_value = ok_hit_window / f64::sqrt(3.0);

    if FloatExt::eq(p_lower_bound, 0.0)
        || random_value >= 1.0
        || deviation > limit_value
        || deviation.is_nan()
    {
        deviation = limit_value;
    }

    let meh_variance = (meh_hit_window * meh_hit_window
        + ok_hit_window * meh_hit_window
        + ok_hit_window * ok_hit_window)
        / 3.0;

    let deviation = f64::sqrt(
        ((relevant_count_great + relevant_count_ok) * f64::powf(deviation, 2.0)
            + relevant_count_meh * meh_variance)
            / (relevant_count_great + relevant_count_ok + relevant_count_meh),
    );

    Some(deviation)
}

pub(crate) const fn total_successful_hits(state: &ScoreState) -> u32 {
    state.n300 + state.n100 + state.n50
}

#[cfg(test)]
mod tests {
    use crate::model::mods::GameMods;

    use super::*;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            aim: 2.5,
            speed: 2.0,
            flashlight: 1.5,
            slider_factor: 0.98,
            speed_note_count: 150.0,
            aim_difficult_strain_count: 80.0,
            speed_difficult_strain_count: 60.0,
            aim_difficult_slider_count: 20.0,
            ar: 9.0,
            od: 8.0,
            hp: 5.0,
            great_hit_window: 32.0,
            ok_hit_window: 92.0,
            meh_hit_window: 152.0,
            n_circles: 200,
            n_sliders: 100,
            n_spinners: 0,
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

    fn calculate(mods: u32, state: ScoreState, effective_miss_count: f64) -> OsuPerformanceAttributes {
        let caps = ModCapabilities::from(&GameMods::from(mods));
        let acc = state.accuracy();

        OsuPerformanceCalculator::new(attrs(), &caps, acc, state, effective_miss_count, true)
            .calculate()
    }

    #[test]
    fn no_hits_give_infinite_deviation() {
        let attrs = calculate(0, state(0, 0, 0, 300), 300.0);

        assert!(attrs.speed_deviation.is_infinite());
        assert!(attrs.pp_speed.abs() < f64::EPSILON);
        assert!(!attrs.pp.is_nan());
    }

    #[test]
    fn perfect_play_has_finite_deviation() {
        let attrs = calculate(0, state(300, 0, 0, 0), 0.0);

        assert!(attrs.speed_deviation.is_finite());
        assert!(attrs.pp > 0.0);
        assert!(attrs.pp_flashlight.abs() < f64::EPSILON);
    }

    #[test]
    fn misses_reduce_aim() {
        let clean = calculate(0, state(300, 0, 0, 0), 0.0);
        let missed = calculate(0, state(295, 0, 0, 5), 5.0);

        assert!(missed.pp_aim < clean.pp_aim);
    }

    #[test]
    fn relax_removes_speed_and_accuracy() {
        let attrs = calculate(128, state(300, 0, 0, 0), 0.0);

        assert!(attrs.pp_speed.abs() < f64::EPSILON);
        assert!(attrs.pp_acc.abs() < f64::EPSILON);
        assert!(attrs.pp_aim > 0.0);
    }

    #[test]
    fn deviation_grows_with_worse_judgements() {
        let good = calculate(0, state(290, 10, 0, 0), 0.0);
        let bad = calculate(0, state(200, 80, 20, 0), 0.0);

        assert!(bad.speed_deviation > good.speed_deviation);
    }

    #[test]
    fn miss_penalty_is_bounded() {
        assert!(calculate_miss_penalty(0.0, 100.0) <= 0.96);
        assert!(calculate_miss_penalty(10.0, 100.0) < calculate_miss_penalty(1.0, 100.0));
    }
}
