use self::calculator::DroidPerformanceCalculator;

use crate::{
    any::{Difficulty, HitResultPriority, ScoreState},
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    osu::{calculate_effective_miss_count, generate_state, SliderJudgements, StateInput},
    util::map_or_attrs::MapOrAttrs,
};

use super::{
    attributes::{DroidDifficultyAttributes, DroidPerformanceAttributes},
    Droid,
};

mod calculator;

/// Performance calculator on osu!droid maps.
///
/// # Example
///
/// ```no_run
/// use rosu_droid_pp::{Beatmap, Difficulty, droid::DroidPerformance};
///
/// let map = Beatmap::from_path("./resources/droid_fixture.osu").unwrap();
///
/// let attrs = DroidPerformance::new(&map)
///     .mods(8 + 64) // HDDT
///     .combo(456)
///     .accuracy(98.5)
///     .misses(2)
///     .calculate()
///     .unwrap();
///
/// println!("PP: {} | Deviation: {}", attrs.pp, attrs.deviation);
///
/// // Reuse the difficulty attributes for another score on the same map
/// let next_attrs = DroidPerformance::new(attrs)
///     .mods(8 + 64)
///     .n300(600)
///     .n100(12)
///     .calculate()
///     .unwrap();
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct DroidPerformance<'map> {
    pub(crate) map_or_attrs: MapOrAttrs<'map, Droid>,
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

impl<'map> DroidPerformance<'map> {
    /// Create a new performance calculator for osu!droid maps.
    ///
    /// The argument `map_or_attrs` must be either
    /// - previously calculated attributes ([`DroidDifficultyAttributes`]
    ///   or [`DroidPerformanceAttributes`])
    /// - a [`Beatmap`] (by reference or value)
    ///
    /// Passing attributes skips the difficulty calculation. They must have
    /// been calculated for the same map and [`Difficulty`] settings.
    pub fn new(map_or_attrs: impl Into<MapOrAttrs<'map, Droid>>) -> Self {
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
                let attrs = self.difficulty.calculate_droid(map)?;

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
    pub fn calculate(mut self) -> Result<DroidPerformanceAttributes, ConvertError> {
        let state = self.generate_state()?;

        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(attrs) => attrs,
            MapOrAttrs::Map(ref map) => self.difficulty.calculate_droid(map)?,
        };

        let caps = self.difficulty.capabilities();
        let using_classic_slider_acc = state.slider_end_hits.is_none();

        let effective_miss_count = calculate_effective_miss_count(
            &state,
            attrs.max_combo,
            attrs.n_sliders,
            attrs.n_large_ticks,
        );

        let inner = DroidPerformanceCalculator::new(
            attrs,
            &caps,
            state,
            effective_miss_count,
            using_classic_slider_acc,
        );

        Ok(inner.calculate())
    }

    pub(crate) fn from_map_or_attrs(map_or_attrs: MapOrAttrs<'map, Droid>) -> Self {
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

impl<'map> From<&'map Beatmap> for DroidPerformance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<Beatmap> for DroidPerformance<'_> {
    fn from(map: Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<DroidDifficultyAttributes> for DroidPerformance<'_> {
    fn from(attrs: DroidDifficultyAttributes) -> Self {
        Self::new(attrs)
    }
}

impl From<DroidPerformanceAttributes> for DroidPerformance<'_> {
    fn from(attrs: DroidPerformanceAttributes) -> Self {
        Self::new(attrs)
    }
}

#[cfg(test)]
mod tests {
    use rosu_map::util::Pos;

    use crate::model::hit_object::{HitObject, HitObjectKind};

    use super::*;

    const N_OBJECTS: u32 = 500;
    const MAX_COMBO: u32 = 700;

    fn attrs() -> DroidDifficultyAttributes {
        DroidDifficultyAttributes {
            aim: 2.6,
            tap: 2.2,
            rhythm: 1.1,
            flashlight: 1.8,
            visual: 1.4,
            slider_factor: 0.97,
            speed_note_count: 180.0,
            average_speed_delta_time: 95.0,
            vibro_factor: 0.9,
            aim_difficult_strain_count: 60.0,
            tap_difficult_strain_count: 50.0,
            flashlight_difficult_strain_count: 40.0,
            visual_difficult_strain_count: 45.0,
            aim_difficult_slider_count: 25.0,
            great_hit_window: 50.0,
            ok_hit_window: 100.0,
            meh_hit_window: 150.0,
            approach_rate: 9.0,
            overall_difficulty: 8.0,
            n_circles: 400,
            n_sliders: 100,
            n_large_ticks: 80,
            max_combo: MAX_COMBO,
            clock_rate: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn hitresults_n300_n100_misses_best() {
        let state = DroidPerformance::from(attrs())
            .combo(400)
            .n300(400)
            .n100(20)
            .misses(2)
            .hitresult_priority(HitResultPriority::BestCase)
            .generate_state()
            .unwrap();

        assert_eq!(
            (state.n300, state.n100, state.n50, state.misses),
            (400, 20, 78, 2)
        );
        assert_eq!(state.max_combo, 400);
    }

    #[test]
    fn combo_is_capped() {
        let state = DroidPerformance::from(attrs())
            .combo(5000)
            .misses(3)
            .generate_state()
            .unwrap();

        assert_eq!(state.max_combo, MAX_COMBO - 3);
        assert_eq!(state.total_hits(), N_OBJECTS);
    }

    #[test]
    fn combo_excludes_dropped_slider_parts() {
        let state = DroidPerformance::from(attrs())
            .combo(5000)
            .misses(3)
            .slider_end_hits(96)
            .large_tick_hits(79)
            .generate_state()
            .unwrap();

        assert_eq!(state.max_combo, MAX_COMBO - 3 - 4 - 1);
    }

    #[test]
    fn attributes_keep_their_mods() {
        let hdfl = DroidDifficultyAttributes {
            mods: GameMods::from(8 + 1024),
            ..attrs()
        };

        let with_mods = hdfl.performance().calculate().unwrap();
        let nomod = attrs().performance().calculate().unwrap();

        assert!(with_mods.pp_flashlight > 0.0);
        assert!(nomod.pp_flashlight.abs() < f64::EPSILON);
        assert!(with_mods.pp_accuracy > nomod.pp_accuracy);
    }

    #[test]
    fn accuracy_generates_matching_state() {
        let state = DroidPerformance::from(attrs())
            .accuracy(96.0)
            .misses(1)
            .generate_state()
            .unwrap();

        assert_eq!(state.total_hits(), N_OBJECTS);
        assert!((state.accuracy() - 0.96).abs() < 0.005, "{}", state.accuracy());
    }

    #[test]
    fn misses_lower_pp() {
        let clean = DroidPerformance::from(attrs()).calculate().unwrap();
        let missed = DroidPerformance::from(attrs()).misses(5).calculate().unwrap();

        assert!(missed.pp < clean.pp, "{} >= {}", missed.pp, clean.pp);
        assert!(missed.effective_miss_count >= 5.0);
    }

    #[test]
    fn lower_combo_lowers_pp() {
        let full = DroidPerformance::from(attrs()).calculate().unwrap();
        let broken = DroidPerformance::from(attrs())
            .combo(MAX_COMBO / 3)
            .n100(4)
            .calculate()
            .unwrap();

        assert!(broken.pp < full.pp);
    }

    #[test]
    fn attributes_are_reusable() {
        let first = DroidPerformance::from(attrs()).n100(10).calculate().unwrap();
        let second = first.clone().performance().n100(10).calculate().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn create() {
        let map = Beatmap::default();

        let _ = DroidPerformance::new(DroidDifficultyAttributes::default());
        let _ = DroidPerformance::new(DroidPerformanceAttributes::default());
        let _ = DroidPerformance::new(&map);
        let _ = DroidPerformance::new(map.clone());

        let _ = DroidPerformance::from(DroidDifficultyAttributes::default());
        let _ = DroidPerformance::from(&map);

        let _ = DroidDifficultyAttributes::default().performance();
        let _ = DroidPerformanceAttributes::default().performance();
    }

    #[test]
    fn empty_map_gives_zero() {
        let attrs = DroidPerformance::new(&Beatmap::default()).calculate().unwrap();

        assert!(attrs.pp.abs() < f64::EPSILON);
        assert!(attrs.deviation.is_infinite());
        assert!(attrs.tap_deviation.is_infinite());
    }

    #[test]
    fn map_is_calculated_once() {
        let hit_objects = (0..32)
            .map(|i| HitObject {
                pos: Pos::new(if i % 2 == 0 { 128.0 } else { 384.0 }, 192.0),
                start_time: 500.0 + f64::from(i) * 180.0,
                kind: HitObjectKind::Circle,
            })
            .collect();

        let map = Beatmap {
            hit_objects,
            ..Default::default()
        };

        let mut perf = DroidPerformance::new(&map).accuracy(99.0);
        let state = perf.generate_state().unwrap();

        assert!(matches!(perf.map_or_attrs, MapOrAttrs::Attrs(_)));
        assert_eq!(state.total_hits(), 32);

        let attrs = perf.calculate().unwrap();

        assert!(attrs.pp > 0.0);
        assert!(attrs.deviation.is_finite());
    }
}
