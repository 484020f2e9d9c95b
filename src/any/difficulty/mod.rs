use crate::{
    droid::{Droid, DroidDifficultyAttributes},
    model::{
        beatmap::Beatmap,
        mode::{ConvertError, IGameMode},
        mods::{GameMods, ModCapabilities},
    },
    osu::{Osu, OsuDifficultyAttributes},
};

pub mod object;
pub mod rhythm;
pub mod skills;

/// Difficulty calculator on maps of any supported ruleset.
///
/// # Example
///
/// ```no_run
/// use rosu_droid_pp::{Beatmap, Difficulty};
///
/// let map = Beatmap::from_path("./resources/droid_fixture.osu").unwrap();
///
/// let attrs = Difficulty::new()
///     .mods(8 + 64) // HDDT
///     .calculate_droid(&map)
///     .unwrap();
///
/// println!("Stars: {}", attrs.stars);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Difficulty {
    mods: GameMods,
    passed_objects: Option<u32>,
    clock_rate: Option<f64>,
    ar: Option<ModsDependent>,
    cs: Option<ModsDependent>,
    hp: Option<ModsDependent>,
    od: Option<ModsDependent>,
}

/// A difficulty setting that may or may not have mods applied onto it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModsDependent {
    pub value: f32,
    pub with_mods: bool,
}

impl ModsDependent {
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            with_mods: false,
        }
    }
}

impl Difficulty {
    /// Create a new difficulty calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings that attributes were calculated with.
    pub(crate) fn from_attributes(mods: &GameMods, clock_rate: f64) -> Self {
        let difficulty = Self::new().mods(mods.clone());

        if clock_rate > 0.0 {
            difficulty.clock_rate(clock_rate)
        } else {
            difficulty
        }
    }

    /// Perform the difficulty calculation for the given ruleset.
    pub fn calculate_for_mode<M: IGameMode>(
        &self,
        map: &Beatmap,
    ) -> Result<M::DifficultyAttributes, ConvertError> {
        M::difficulty(self, map)
    }

    /// Perform the osu!droid difficulty calculation.
    pub fn calculate_droid(&self, map: &Beatmap) -> Result<DroidDifficultyAttributes, ConvertError> {
        self.calculate_for_mode::<Droid>(map)
    }

    /// Perform the osu!standard difficulty calculation.
    pub fn calculate_osu(&self, map: &Beatmap) -> Result<OsuDifficultyAttributes, ConvertError> {
        self.calculate_for_mode::<Osu>(map)
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
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.passed_objects = Some(passed_objects);

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
        self.clock_rate = Some(clock_rate.clamp(0.01, 100.0));

        self
    }

    /// Override a beatmap's set AR.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn ar(mut self, ar: f32, with_mods: bool) -> Self {
        self.ar = Some(ModsDependent {
            value: ar.clamp(-20.0, 20.0),
            with_mods,
        });

        self
    }

    /// Override a beatmap's set CS.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn cs(mut self, cs: f32, with_mods: bool) -> Self {
        self.cs = Some(ModsDependent {
            value: cs.clamp(-20.0, 20.0),
            with_mods,
        });

        self
    }

    /// Override a beatmap's set HP.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn hp(mut self, hp: f32, with_mods: bool) -> Self {
        self.hp = Some(ModsDependent {
            value: hp.clamp(-20.0, 20.0),
            with_mods,
        });

        self
    }

    /// Override a beatmap's set OD.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn od(mut self, od: f32, with_mods: bool) -> Self {
        self.od = Some(ModsDependent {
            value: od.clamp(-20.0, 20.0),
            with_mods,
        });

        self
    }

    pub(crate) const fn get_mods(&self) -> &GameMods {
        &self.mods
    }

    pub(crate) fn get_clock_rate(&self) -> f64 {
        self.clock_rate.unwrap_or_else(|| self.mods.clock_rate())
    }

    pub(crate) fn get_passed_objects(&self) -> usize {
        self.passed_objects.map_or(usize::MAX, |n| n as usize)
    }

    pub(crate) const fn get_ar(&self) -> Option<ModsDependent> {
        self.ar
    }

    pub(crate) const fn get_cs(&self) -> Option<ModsDependent> {
        self.cs
    }

    pub(crate) const fn get_hp(&self) -> Option<ModsDependent> {
        self.hp
    }

    pub(crate) const fn get_od(&self) -> Option<ModsDependent> {
        self.od
    }

    /// The mod effects with this calculator's clock rate.
    pub(crate) fn capabilities(&self) -> ModCapabilities {
        ModCapabilities::new(&self.mods, self.get_clock_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_rate_defaults_to_mods() {
        assert!((Difficulty::new().get_clock_rate() - 1.0).abs() < f64::EPSILON);
        assert!((Difficulty::new().mods(64).get_clock_rate() - 1.5).abs() < f64::EPSILON);
        assert!((Difficulty::new().mods(256).get_clock_rate() - 0.75).abs() < f64::EPSILON);

        let custom = Difficulty::new().mods(64).clock_rate(1.2);
        assert!((custom.get_clock_rate() - 1.2).abs() < f64::EPSILON);
        assert!((custom.capabilities().clock_rate - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn settings_are_clamped() {
        let difficulty = Difficulty::new().clock_rate(1000.0).ar(30.0, false);

        assert!((difficulty.get_clock_rate() - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            difficulty.get_ar(),
            Some(ModsDependent {
                value: 20.0,
                with_mods: false
            })
        );
    }

    #[test]
    fn passed_objects_default_to_all() {
        assert_eq!(Difficulty::new().get_passed_objects(), usize::MAX);
        assert_eq!(Difficulty::new().passed_objects(5).get_passed_objects(), 5);
    }
}
