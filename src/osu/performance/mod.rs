use std::cmp;

use self::calculator::OsuPerformanceCalculator;
pub use self::calculator::PERFORMANCE_BASE_MULTIPLIER;

use crate::{
    any::{
        hitresult_generator::{Fast, HitResultParams},
        Difficulty, HitResultGenerator, HitResultPriority, ScoreState,
    },
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    util::map_or_attrs::MapOrAttrs,
};

use super::{
    attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
    Osu,
};

mod calculator;

pub(crate) use self::calculator::{
    calculate_miss_penalty, estimate_deviation, length_bonus, total_successful_hits,
    JudgementCounts,
};

/// Performance calculator on osu!standard maps.
///
/// # Example
///
/// ```no_run
/// use rosu_droid_pp::{Beatmap, Difficulty, osu::OsuPerformance};
///
/// let map = Beatmap::from_path("./resources/droid_fixture.osu").unwrap();
///
/// let attrs = OsuPerformance::new(&map)
///     .mods(8 + 16) // HDHR
///     .combo(456)
///     .accuracy(98.5)
///     .misses(2)
///     .calculate()
///     .unwrap();
///
/// println!("PP: {}", attrs.pp);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct OsuPerformance<'map> {
    pub(crate) map_or_attrs: MapOrAttrs<'map, Osu>,
    pub(crate) difficulty: Difficulty,
    pub(crate) acc: Option<f64>,
    pub(crate) combo: Option<u32>,
    pub(crate) large_tick_hits: Option<u32>,
    pub(crate) slider_end_hits: Option<u32>,
    pub(crate) n300: Option<u32>,
    pub(crate) n100: Option<u32>,
    pub(crate) n50: Option<u32>,
    pub(crate) misses: Option<u32>,
    pub(crate) hitresult_priority: HitResultPriority,
}

impl<'map> OsuPerformance<'map> {
    /// Create a new performance calculator for osu!standard maps.
    ///
    /// The argument `map_or_attrs` must be either
    /// - previously calculated attributes ([`OsuDifficultyAttributes`]
    ///   or [`OsuPerformanceAttributes`])
    /// - a [`Beatmap`] (by reference or value)
    ///
    /// If a map is given, difficulty attributes will need to be calculated
    /// internally which is a costly operation. Hence, passing attributes
    /// should be prefered.
    ///
    /// However, when passing previously calculated attributes, make sure they
    /// have been calculated for the same map and [`Difficulty`] settings.
    /// Otherwise, the final attributes will be incorrect.
    pub fn new(map_or_attrs: impl Into<MapOrAttrs<'map, Osu>>) -> Self {
        Self::from_map_or_attrs(map_or_attrs.into())
    }

    /// Specify mods.
    ///
    /// Accepted types are
    /// - `u32`
    /// - [`rosu_mods::GameModsLegacy`]
    /// - [`rosu_mods::GameMods`]
    /// - [`rosu_mods::GameModsIntermode`]
    /// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
    ///
    /// See <https://github.com/ppy/osu-api/wiki#mods>
    pub fn mods(mut self, mods: impl Into<GameMods>) -> Self {
        self.difficulty = self.difficulty.mods(mods);

        self
    }

    /// Specify the max combo of the play.
    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    /// Specify the priority of hitresults.
    ///
    /// `HitResultPriority::BestCase` sacrifices 100s and 50s for 300s.
    /// `HitResultPriority::WorstCase` does the opposite.
    pub const fn hitresult_priority(mut self, priority: HitResultPriority) -> Self {
        self.hitresult_priority = priority;

        self
    }

    /// Specify the amount of hit slider ticks and repeats.
    pub const fn large_tick_hits(mut self, large_tick_hits: u32) -> Self {
        self.large_tick_hits = Some(large_tick_hits);

        self
    }

    /// Specify the amount of hit slider ends.
    ///
    /// Providing this value means slider breaks are derived from dropped
    /// slider ends instead of being estimated from the combo.
    pub const fn slider_end_hits(mut self, slider_end_hits: u32) -> Self {
        self.slider_end_hits = Some(slider_end_hits);

        self
    }

    /// Specify the amount of 300s of a play.
    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    /// Specify the amount of 100s of a play.
    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    /// Specify the amount of 50s of a play.
    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

    /// Specify the amount of misses of a play.
    pub const fn misses(mut self, n_misses: u32) -> Self {
        self.misses = Some(n_misses);

        self
    }

    /// Use the specified settings of the given [`Difficulty`].
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;

        self
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.difficulty = self.difficulty.passed_objects(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | 0.01    | 100     |
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.difficulty = self.difficulty.clock_rate(clock_rate);

        self
    }

    /// Override a beatmap's set AR.
    ///
    /// See [`Difficulty::ar`] for the meaning of `with_mods`.
    pub fn ar(mut self, ar: f32, with_mods: bool) -> Self {
        self.difficulty = self.difficulty.ar(ar, with_mods);

        self
    }

    /// Override a beatmap's set CS.
    pub fn cs(mut self, cs: f32, with_mods: bool) -> Self {
        self.difficulty = self.difficulty.cs(cs, with_mods);

        self
    }

    /// Override a beatmap's set HP.
    pub fn hp(mut self, hp: f32, with_mods: bool) -> Self {
        self.difficulty = self.difficulty.hp(hp, with_mods);

        self
    }

    /// Override a beatmap's set OD.
    pub fn od(mut self, od: f32, with_mods: bool) -> Self {
        self.difficulty = self.difficulty.od(od, with_mods);

        self
    }

    /// Provide parameters through a [`ScoreState`].
    #[allow(clippy::needless_pass_by_value)]
    pub const fn state(mut self, state: ScoreState) -> Self {
        let ScoreState {
            max_combo,
            slider_end_hits,
            large_tick_hits,
            n300,
            n100,
            n50,
            misses,
        } = state;

        self.combo = Some(max_combo);
        self.slider_end_hits = slider_end_hits;
        self.large_tick_hits = large_tick_hits;
        self.n300 = Some(n300);
        self.n100 = Some(n100);
        self.n50 = Some(n50);
        self.misses = Some(misses);

        self
    }

    /// Specify the accuracy of a play between `0.0` and `100.0`.
    /// This will be used to generate matching hitresults.
    pub fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc.clamp(0.0, 100.0) / 100.0);

        self
    }

    /// Create the [`ScoreState`] that will be used for performance calculation.
    pub fn generate_state(&mut self) -> Result<ScoreState, ConvertError> {
        let attrs = match self.map_or_attrs {
            MapOrAttrs::Map(ref map) => {
                let attrs = self.difficulty.calculate_osu(map)?;

                self.map_or_attrs.insert_attrs(attrs)
            }
            MapOrAttrs::Attrs(ref attrs) => attrs,
        };

        let state = generate_state(
            attrs.n_objects(),
            attrs.max_combo,
            self.difficulty.get_passed_objects(),
            SliderJudgements {
                n_sliders: attrs.n_sliders,
                n_large_ticks: attrs.n_large_ticks,
                slider_end_hits: self.slider_end_hits,
                large_tick_hits: self.large_tick_hits,
            },
            StateInput {
                acc: self.acc,
                combo: self.combo,
                n300: self.n300,
                n100: self.n100,
                n50: self.n50,
                misses: self.misses,
                priority: self.hitresult_priority,
            },
        );

        self.combo = Some(state.max_combo);
        self.slider_end_hits = state.slider_end_hits;
        self.large_tick_hits = state.large_tick_hits;
        self.n300 = Some(state.n300);
        self.n100 = Some(state.n100);
        self.n50 = Some(state.n50);
        self.misses = Some(state.misses);

        Ok(state)
    }

    /// Calculate all performance related values, including pp and stars.
    pub fn calculate(mut self) -> Result<OsuPerformanceAttributes, ConvertError> {
        let state = self.generate_state()?;

        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(attrs) => attrs,
            MapOrAttrs::Map(ref map) => self.difficulty.calculate_osu(map)?,
        };

        let caps = self.difficulty.capabilities();
        let using_classic_slider_acc = state.slider_end_hits.is_none();

        let effective_miss_count = calculate_effective_miss_count(
            &state,
            attrs.max_combo,
            attrs.n_sliders,
            attrs.n_large_ticks,
        );

        let acc = state.accuracy();

        let inner = OsuPerformanceCalculator::new(
            attrs,
            &caps,
            acc,
            state,
            effective_miss_count,
            using_classic_slider_acc,
        );

        Ok(inner.calculate())
    }

    pub(crate) fn from_map_or_attrs(map_or_attrs: MapOrAttrs<'map, Osu>) -> Self {
        let difficulty = match map_or_attrs {
            MapOrAttrs::Attrs(ref attrs) => {
                Difficulty::from_attributes(&attrs.mods, attrs.clock_rate)
            }
            MapOrAttrs::Map(_) => Difficulty::new(),
        };

        Self {
            map_or_attrs,
            difficulty,
            acc: None,
            combo: None,
            large_tick_hits: None,
            slider_end_hits: None,
            n300: None,
            n100: None,
            n50: None,
            misses: None,
            hitresult_priority: HitResultPriority::BestCase,
        }
    }
}

impl<'map> From<&'map Beatmap> for OsuPerformance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<Beatmap> for OsuPerformance<'_> {
    fn from(map: Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<OsuDifficultyAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuDifficultyAttributes) -> Self {
        Self::new(attrs)
    }
}

impl From<OsuPerformanceAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuPerformanceAttributes) -> Self {
        Self::new(attrs)
    }
}

/// User-provided score settings that [`generate_state`] completes.
pub(crate) struct StateInput {
    pub acc: Option<f64>,
    pub combo: Option<u32>,
    pub n300: Option<u32>,
    pub n100: Option<u32>,
    pub n50: Option<u32>,
    pub misses: Option<u32>,
    pub priority: HitResultPriority,
}

/// Explicit slider judgements of a play next to the map's slider totals.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SliderJudgements {
    pub n_sliders: u32,
    pub n_large_ticks: u32,
    pub slider_end_hits: Option<u32>,
    pub large_tick_hits: Option<u32>,
}

impl SliderJudgements {
    /// Combo that dropped slider ends and missed large ticks cost; zero
    /// without explicit slider data.
    fn combo_penalty(&self) -> u32 {
        let dropped_ends = self
            .slider_end_hits
            .map_or(0, |hits| self.n_sliders.saturating_sub(hits));

        let missed_ticks = self
            .large_tick_hits
            .map_or(0, |hits| self.n_large_ticks.saturating_sub(hits));

        dropped_ends + missed_ticks
    }
}

/// Complete the judgements of a possibly partial play.
///
/// Shared by both rulesets since they judge objects the same way.
pub(crate) fn generate_state(
    n_objects: u32,
    max_combo: u32,
    passed_objects: usize,
    sliders: SliderJudgements,
    input: StateInput,
) -> ScoreState {
    let sliders = SliderJudgements {
        slider_end_hits: sliders
            .slider_end_hits
            .map(|n| cmp::min(n, sliders.n_sliders)),
        large_tick_hits: sliders
            .large_tick_hits
            .map(|n| cmp::min(n, sliders.n_large_ticks)),
        ..sliders
    };

    let n_objects = cmp::min(
        u32::try_from(passed_objects).unwrap_or(u32::MAX),
        n_objects,
    );

    let misses = input.misses.map_or(0, |n| cmp::min(n, n_objects));

    let params = HitResultParams {
        total_hits: n_objects,
        priority: input.priority,
        acc: input.acc,
        n300: input.n300,
        n100: input.n100,
        n50: input.n50,
        misses,
        slider_end_hits: sliders.slider_end_hits,
        large_tick_hits: sliders.large_tick_hits,
    };

    let mut state = Fast::generate_hitresults(&params);

    let max_possible_combo = max_combo
        .saturating_sub(misses)
        .saturating_sub(sliders.combo_penalty());

    state.max_combo = input.combo.map_or(max_possible_combo, |combo| {
        cmp::min(combo, max_possible_combo)
    });

    state
}

/// Misses plus an estimate of slider breaks.
///
/// Without slider end data, a full combo threshold that excludes 10% of all
/// sliders is assumed.
pub(crate) fn calculate_effective_miss_count(
    state: &ScoreState,
    max_combo: u32,
    n_sliders: u32,
    n_large_ticks: u32,
) -> f64 {
    let mut effective_miss_count = f64::from(state.misses);

    if n_sliders > 0 {
        if let Some(slider_end_hits) = state.slider_end_hits {
            let n_dropped = n_sliders.saturating_sub(slider_end_hits);
            let full_combo_threshold = f64::from(max_combo.saturating_sub(n_dropped));

            if f64::from(state.max_combo) < full_combo_threshold {
                effective_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
            }

            // Tick misses break combo as well
            let tick_misses = state
                .large_tick_hits
                .map_or(0, |hits| n_large_ticks.saturating_sub(hits));

            effective_miss_count = effective_miss_count.min(f64::from(tick_misses + state.misses));
        } else {
            let full_combo_threshold = f64::from(max_combo) - 0.1 * f64::from(n_sliders);

            if f64::from(state.max_combo) < full_combo_threshold {
                effective_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
            }

            effective_miss_count = effective_miss_count.min(total_imperfect_hits(state));
        }
    }

    effective_miss_count = effective_miss_count.max(f64::from(state.misses));

    effective_miss_count.min(f64::from(state.total_hits()))
}

fn total_imperfect_hits(state: &ScoreState) -> f64 {
    f64::from(state.n100 + state.n50 + state.misses)
}

fn n_slider_ends_dropped(attrs: &OsuDifficultyAttributes, state: &ScoreState) -> u32 {
    state
        .slider_end_hits
        .map_or(0, |hits| attrs.n_sliders.saturating_sub(hits))
}

fn n_large_tick_miss(attrs: &OsuDifficultyAttributes, state: &ScoreState) -> u32 {
    state
        .large_tick_hits
        .map_or(0, |hits| attrs.n_large_ticks.saturating_sub(hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    const N_OBJECTS: u32 = 600;
    const N_SLIDERS: u32 = 200;
    const MAX_COMBO: u32 = 900;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            aim: 2.4,
            speed: 2.1,
            slider_factor: 0.97,
            speed_note_count: 200.0,
            aim_difficult_strain_count: 90.0,
            speed_difficult_strain_count: 70.0,
            aim_difficult_slider_count: 30.0,
            ar: 9.0,
            od: 8.0,
            great_hit_window: 32.0,
            ok_hit_window: 92.0,
            meh_hit_window: 152.0,
            n_circles: N_OBJECTS - N_SLIDERS,
            n_sliders: N_SLIDERS,
            n_large_ticks: 100,
            max_combo: MAX_COMBO,
            clock_rate: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn hitresults_n300_n100_misses_best() {
        let state = OsuPerformance::from(attrs())
            .combo(500)
            .n300(300)
            .n100(20)
            .misses(2)
            .hitresult_priority(HitResultPriority::BestCase)
            .generate_state()
            .unwrap();

        assert_eq!(
            (state.n300, state.n100, state.n50, state.misses),
            (300, 20, 278, 2)
        );
        assert_eq!(state.max_combo, 500);
    }

    #[test]
    fn hitresults_n50_misses_worst() {
        let state = OsuPerformance::from(attrs())
            .n50(10)
            .misses(2)
            .hitresult_priority(HitResultPriority::WorstCase)
            .generate_state()
            .unwrap();

        assert_eq!(
            (state.n300, state.n100, state.n50, state.misses),
            (0, 588, 10, 2)
        );
        assert_eq!(state.max_combo, MAX_COMBO - 2);
    }

    #[test]
    fn combo_is_capped() {
        let state = OsuPerformance::from(attrs())
            .combo(5000)
            .misses(3)
            .generate_state()
            .unwrap();

        assert_eq!(state.max_combo, MAX_COMBO - 3);
        assert_eq!(state.total_hits(), N_OBJECTS);
    }

    #[test]
    fn combo_excludes_dropped_slider_parts() {
        let state = OsuPerformance::from(attrs())
            .combo(5000)
            .misses(3)
            .slider_end_hits(N_SLIDERS - 5)
            .large_tick_hits(98)
            .generate_state()
            .unwrap();

        assert_eq!(state.max_combo, MAX_COMBO - 3 - 5 - 2);

        let classic = OsuPerformance::from(attrs())
            .combo(5000)
            .misses(3)
            .generate_state()
            .unwrap();

        assert_eq!(classic.max_combo, MAX_COMBO - 3);
    }

    #[test]
    fn attributes_keep_their_mods() {
        let attrs = OsuDifficultyAttributes {
            flashlight: 1.5,
            mods: GameMods::from(8 + 1024),
            ..attrs()
        };

        let with_mods = attrs.clone().performance().calculate().unwrap();
        let nomod = OsuDifficultyAttributes {
            mods: GameMods::default(),
            ..attrs
        }
        .performance()
        .calculate()
        .unwrap();

        assert!(with_mods.pp_flashlight > 0.0);
        assert!(nomod.pp_flashlight.abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_generates_matching_state() {
        let state = OsuPerformance::from(attrs())
            .accuracy(95.0)
            .misses(4)
            .generate_state()
            .unwrap();

        assert_eq!(state.total_hits(), N_OBJECTS);
        assert!((state.accuracy() - 0.95).abs() < 0.005, "{}", state.accuracy());
    }

    #[test]
    fn classic_effective_misses() {
        let state = ScoreState {
            max_combo: 400,
            n300: 590,
            n100: 8,
            n50: 0,
            misses: 2,
            ..ScoreState::new()
        };

        let emc = calculate_effective_miss_count(&state, MAX_COMBO, N_SLIDERS, 100);

        // (900 - 20) / 400 = 2.2, between misses and imperfect hits
        assert!((emc - 2.2).abs() < 1e-9, "{emc}");
    }

    #[test]
    fn slider_end_effective_misses() {
        let state = ScoreState {
            max_combo: 300,
            slider_end_hits: Some(N_SLIDERS - 1),
            large_tick_hits: Some(99),
            n300: 600,
            ..ScoreState::new()
        };

        let emc = calculate_effective_miss_count(&state, MAX_COMBO, N_SLIDERS, 100);

        // Capped by the single tick miss
        assert!((emc - 1.0).abs() < 1e-9, "{emc}");
    }

    #[test]
    fn create() {
        let map = Beatmap::default();

        let _ = OsuPerformance::new(OsuDifficultyAttributes::default());
        let _ = OsuPerformance::new(OsuPerformanceAttributes::default());
        let _ = OsuPerformance::new(&map);
        let _ = OsuPerformance::new(map.clone());

        let _ = OsuPerformance::from(OsuDifficultyAttributes::default());
        let _ = OsuPerformance::from(&map);

        let _ = OsuDifficultyAttributes::default().performance();
        let _ = OsuPerformanceAttributes::default().performance();
    }

    #[test]
    fn empty_map_gives_zero() {
        let attrs = OsuPerformance::new(&Beatmap::default()).calculate().unwrap();

        assert!(attrs.pp.abs() < f64::EPSILON);
        assert!(attrs.speed_deviation.is_infinite());
    }
}
