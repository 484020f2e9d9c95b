use crate::{
    any::difficulty::ModsDependent,
    model::{mode::Ruleset, mods::GameMods},
    Difficulty,
};

use super::Beatmap;

/// Summary struct for a [`Beatmap`]'s attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatmapAttributes {
    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The circle size.
    pub cs: f64,
    /// The health drain rate
    pub hp: f64,
    /// The clock rate with respect to mods.
    pub clock_rate: f64,
    /// The hit windows for approach rate and overall difficulty.
    pub hit_windows: HitWindows,
}

/// AR and OD hit windows, adjusted by the clock rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitWindows {
    /// Hit window for approach rate i.e. `TimePreempt` in milliseconds.
    pub ar: f64,
    /// Time to hit a 300 ("Great") in milliseconds.
    pub od_great: f64,
    /// Time to hit a 100 ("Ok") in milliseconds.
    pub od_ok: f64,
    /// Time to hit a 50 ("Meh") in milliseconds.
    pub od_meh: f64,
}

/// A builder for [`BeatmapAttributes`] and [`HitWindows`].
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct BeatmapAttributesBuilder {
    ruleset: Ruleset,
    ar: ModsDependent,
    od: ModsDependent,
    cs: ModsDependent,
    hp: ModsDependent,
    mods: GameMods,
    clock_rate: Option<f64>,
}

impl BeatmapAttributesBuilder {
    const PREEMPT_MIN: f64 = 1800.0;
    const PREEMPT_MID: f64 = 1200.0;
    const PREEMPT_MAX: f64 = 450.0;

    const GREAT_MIN: f64 = 80.0;
    const GREAT_MID: f64 = 50.0;
    const GREAT_MAX: f64 = 20.0;

    const OK_MIN: f64 = 140.0;
    const OK_MID: f64 = 100.0;
    const OK_MAX: f64 = 60.0;

    const MEH_MIN: f64 = 200.0;
    const MEH_MID: f64 = 150.0;
    const MEH_MAX: f64 = 100.0;

    /// Create a new [`BeatmapAttributesBuilder`].
    ///
    /// The ruleset will be [`Ruleset::Osu`] and attributes are set to `5.0`.
    pub const fn new() -> Self {
        Self {
            ruleset: Ruleset::Osu,
            ar: ModsDependent::new(5.0),
            od: ModsDependent::new(5.0),
            cs: ModsDependent::new(5.0),
            hp: ModsDependent::new(5.0),
            mods: GameMods::DEFAULT,
            clock_rate: None,
        }
    }

    /// Use the given [`Beatmap`]'s attributes.
    pub fn map(self, map: &Beatmap) -> Self {
        Self {
            ar: ModsDependent::new(map.ar),
            od: ModsDependent::new(map.od),
            cs: ModsDependent::new(map.cs),
            hp: ModsDependent::new(map.hp),
            ..self
        }
    }

    /// Specify the approach rate.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    pub fn ar(self, ar: f32, with_mods: bool) -> Self {
        Self {
            ar: ModsDependent {
                value: ar,
                with_mods,
            },
            ..self
        }
    }

    /// Specify the overall difficulty.
    ///
    /// See [`BeatmapAttributesBuilder::ar`] for the meaning of `with_mods`.
    pub fn od(self, od: f32, with_mods: bool) -> Self {
        Self {
            od: ModsDependent {
                value: od,
                with_mods,
            },
            ..self
        }
    }

    /// Specify the circle size.
    ///
    /// See [`BeatmapAttributesBuilder::ar`] for the meaning of `with_mods`.
    pub fn cs(self, cs: f32, with_mods: bool) -> Self {
        Self {
            cs: ModsDependent {
                value: cs,
                with_mods,
            },
            ..self
        }
    }

    /// Specify the drain rate.
    ///
    /// See [`BeatmapAttributesBuilder::ar`] for the meaning of `with_mods`.
    pub fn hp(self, hp: f32, with_mods: bool) -> Self {
        Self {
            hp: ModsDependent {
                value: hp,
                with_mods,
            },
            ..self
        }
    }

    /// Specify the mods.
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Specify a custom clock rate.
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        Self {
            clock_rate: Some(clock_rate),
            ..self
        }
    }

    /// Specify the [`Ruleset`] whose conventions apply.
    pub fn ruleset(self, ruleset: Ruleset) -> Self {
        Self { ruleset, ..self }
    }

    /// Specify all settings through [`Difficulty`].
    ///
    /// Values forced by mods, e.g. through lazer's difficulty adjust, are
    /// used when the [`Difficulty`] does not override them.
    pub fn difficulty(self, difficulty: &Difficulty) -> Self {
        let mods = difficulty.get_mods();

        let forced = |value: Option<f64>| {
            value.map(|value| ModsDependent {
                value: value as f32,
                with_mods: true,
            })
        };

        Self {
            ruleset: self.ruleset,
            ar: difficulty.get_ar().or_else(|| forced(mods.ar())).unwrap_or(self.ar),
            od: difficulty.get_od().or_else(|| forced(mods.od())).unwrap_or(self.od),
            cs: difficulty.get_cs().or_else(|| forced(mods.cs())).unwrap_or(self.cs),
            hp: difficulty.get_hp().or_else(|| forced(mods.hp())).unwrap_or(self.hp),
            mods: mods.clone(),
            clock_rate: Some(difficulty.get_clock_rate()),
        }
    }

    fn od_ar_hp_multiplier(&self) -> f32 {
        if self.mods.hr() {
            1.4
        } else if self.mods.ez() {
            0.5
        } else {
            1.0
        }
    }

    /// Calculate the AR and OD hit windows.
    pub fn hit_windows(&self) -> HitWindows {
        let clock_rate = self.clock_rate.unwrap_or_else(|| self.mods.clock_rate());
        let ar_clock_rate = if self.ar.with_mods { 1.0 } else { clock_rate };
        let od_clock_rate = if self.od.with_mods { 1.0 } else { clock_rate };

        let mod_mult = |val: f32| (val * self.od_ar_hp_multiplier()).min(10.0);

        let raw_ar = if self.ar.with_mods {
            self.ar.value
        } else {
            mod_mult(self.ar.value)
        };

        let preempt = difficulty_range(
            f64::from(raw_ar),
            Self::PREEMPT_MIN,
            Self::PREEMPT_MID,
            Self::PREEMPT_MAX,
        ) / ar_clock_rate;

        let raw_od = f64::from(if self.od.with_mods {
            self.od.value
        } else {
            mod_mult(self.od.value)
        });

        let (great, ok, meh) = match self.ruleset {
            Ruleset::Osu => (
                difficulty_range(raw_od, Self::GREAT_MIN, Self::GREAT_MID, Self::GREAT_MAX),
                difficulty_range(raw_od, Self::OK_MIN, Self::OK_MID, Self::OK_MAX),
                difficulty_range(raw_od, Self::MEH_MIN, Self::MEH_MID, Self::MEH_MAX),
            ),
            Ruleset::Droid => {
                let great = 75.0 + 5.0 * (5.0 - raw_od);
                let converted_od = (Self::GREAT_MIN - great) / 6.0;

                (great, 140.0 - 8.0 * converted_od, 200.0 - 10.0 * converted_od)
            }
        };

        HitWindows {
            ar: preempt,
            od_great: great / od_clock_rate,
            od_ok: ok / od_clock_rate,
            od_meh: meh / od_clock_rate,
        }
    }

    /// Calculate the [`BeatmapAttributes`].
    pub fn build(&self) -> BeatmapAttributes {
        let clock_rate = self.clock_rate.unwrap_or_else(|| self.mods.clock_rate());

        let mut hp = self.hp.value;

        if !self.hp.with_mods {
            hp *= self.od_ar_hp_multiplier();
        }

        hp = hp.min(10.0);

        let mut cs = self.cs.value;

        if !self.cs.with_mods {
            match self.ruleset {
                Ruleset::Osu if self.mods.hr() => cs = (cs * 1.3).min(10.0),
                Ruleset::Osu if self.mods.ez() => cs *= 0.5,
                Ruleset::Droid if self.mods.hr() => cs += 1.0,
                Ruleset::Droid if self.mods.ez() => cs -= 1.0,
                Ruleset::Osu | Ruleset::Droid => {}
            }
        }

        let hit_windows = self.hit_windows();

        let ar = if hit_windows.ar > Self::PREEMPT_MID {
            (Self::PREEMPT_MIN - hit_windows.ar) / 120.0
        } else {
            (Self::PREEMPT_MID - hit_windows.ar) / 150.0 + 5.0
        };

        let od = (Self::GREAT_MIN - hit_windows.od_great) / 6.0;

        BeatmapAttributes {
            ar,
            od,
            cs: f64::from(cs),
            hp: f64::from(hp),
            clock_rate,
            hit_windows,
        }
    }
}

impl From<&Beatmap> for BeatmapAttributesBuilder {
    fn from(map: &Beatmap) -> Self {
        Self::new().map(map)
    }
}

impl Default for BeatmapAttributesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a difficulty setting onto `min` at 0, `mid` at 5, and `max` at 10.
pub(crate) fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid - (mid - min) * (5.0 - difficulty) / 5.0
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn consider_mods() {
        let attrs = BeatmapAttributesBuilder::new()
            .ar(8.5, false)
            .mods(16)
            .build();

        let expected = 10.0;

        assert!(attrs.ar.eq(expected), "{} != {expected}", attrs.ar);
    }

    #[test]
    fn skip_mods() {
        let attrs = BeatmapAttributesBuilder::new()
            .ar(8.5, true)
            .mods(16)
            .build();

        let expected = 8.5;

        assert!(attrs.ar.eq(expected), "{} != {expected}", attrs.ar);
    }

    #[test]
    fn double_time_shortens_windows() {
        let attrs = BeatmapAttributesBuilder::new().od(5.0, false).mods(64).build();

        assert!(attrs.hit_windows.od_great.eq(50.0 / 1.5));
        assert!(attrs.hit_windows.od_meh.eq(150.0 / 1.5));
        assert!(attrs.clock_rate.eq(1.5));
    }

    #[test]
    fn droid_circle_size_and_windows() {
        let attrs = BeatmapAttributesBuilder::new()
            .ruleset(Ruleset::Droid)
            .cs(4.0, false)
            .od(5.0, false)
            .mods(16)
            .build();

        assert!(attrs.cs.eq(5.0), "{} != 5", attrs.cs);

        // HR turns OD 5 into OD 7
        let great = 75.0 + 5.0 * (5.0 - 7.0);
        assert!(attrs.hit_windows.od_great.eq(great));

        let converted_od = (80.0 - great) / 6.0;
        assert!(attrs.hit_windows.od_ok.eq(140.0 - 8.0 * converted_od));
        assert!(attrs.od.eq(converted_od));
    }

    #[test]
    fn osu_circle_size_hard_rock() {
        let attrs = BeatmapAttributesBuilder::new().cs(4.0, false).mods(16).build();

        assert!((attrs.cs - 5.2).abs() < 1e-6, "{} != 5.2", attrs.cs);
    }
}
