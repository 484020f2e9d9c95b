use std::fmt::{Debug, Formatter, Result as FmtResult};

use rosu_mods::{
    generated_mods::DifficultyAdjustOsu, GameMod, GameModIntermode, GameMods as GameModsLazer,
    GameModsIntermode, GameModsLegacy,
};

/// Collection of game mods.
///
/// This type can be created through its `From<T>` implementations where `T`
/// can be
/// - `u32`
/// - [`rosu_mods::GameModsLegacy`]
/// - [`rosu_mods::GameMods`]
/// - [`rosu_mods::GameModsIntermode`]
/// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
///
/// # Example
///
/// ```
/// use rosu_droid_pp::GameMods;
/// use rosu_mods::{GameModsIntermode, GameModsLegacy, GameMods as GameModsLazer};
///
/// let int = GameMods::from(64 + 8);
/// let legacy = GameMods::from(GameModsLegacy::Hidden | GameModsLegacy::Easy);
/// let lazer = GameMods::from(GameModsLazer::new());
/// let intermode = GameMods::from(GameModsIntermode::new());
/// ```
#[derive(Clone)]
pub struct GameMods {
    inner: GameModsInner,
}

impl PartialEq for GameMods {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (GameModsInner::Lazer(a), GameModsInner::Lazer(b)) => a == b,
            (GameModsInner::Legacy(a), GameModsInner::Legacy(b)) => a == b,
            _ => self.intermode() == other.intermode(),
        }
    }
}

impl Debug for GameMods {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.inner {
            GameModsInner::Lazer(ref mods) => Debug::fmt(mods, f),
            GameModsInner::Intermode(ref mods) => Debug::fmt(mods, f),
            GameModsInner::Legacy(ref mods) => Debug::fmt(mods, f),
        }
    }
}

/// Inner type of [`GameMods`] so that remote types contained in variants don't
/// need to be re-exported.
#[derive(Clone)]
enum GameModsInner {
    Lazer(GameModsLazer),
    Intermode(GameModsIntermode),
    Legacy(GameModsLegacy),
}

impl GameMods {
    pub(crate) const DEFAULT: Self = Self {
        inner: GameModsInner::Legacy(GameModsLegacy::NoMod),
    };

    /// The legacy bit representation of the mods.
    ///
    /// Mods without a legacy counterpart are dropped.
    pub fn bits(&self) -> u32 {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.bits(),
            GameModsInner::Intermode(ref mods) => mods.bits(),
            GameModsInner::Legacy(mods) => mods.bits(),
        }
    }

    /// The mods without their settings.
    ///
    /// Unlike [`GameMods::bits`], mods without a legacy counterpart are kept.
    pub fn intermode(&self) -> GameModsIntermode {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.iter().map(GameMod::intermode).collect(),
            GameModsInner::Intermode(ref mods) => mods.clone(),
            GameModsInner::Legacy(mods) => mods.to_intermode(),
        }
    }

    /// The mods' acronyms, e.g. `"DTHD"`, or `"NM"` without mods.
    pub fn acronyms(&self) -> String {
        self.intermode().to_string()
    }

    /// Parse mods from their concatenated acronyms.
    pub fn from_acronyms(acronyms: &str) -> Self {
        GameModsIntermode::from_acronyms(acronyms).into()
    }

    /// Returns the mods' clock rate.
    ///
    /// In case of variable clock rates like for `WindUp`, this will return
    /// `1.0`.
    pub(crate) fn clock_rate(&self) -> f64 {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.clock_rate().unwrap_or(1.0),
            GameModsInner::Intermode(ref mods) => mods.legacy_clock_rate(),
            GameModsInner::Legacy(mods) => mods.clock_rate(),
        }
    }

    pub(crate) fn reflection(&self) -> Reflection {
        match self.inner {
            GameModsInner::Lazer(ref mods) => {
                if mods.contains_intermode(GameModIntermode::HardRock) {
                    return Reflection::Vertical;
                }

                mods.iter()
                    .find_map(|m| match m {
                        GameMod::MirrorOsu(mr) => match mr.reflection.as_deref() {
                            None => Some(Reflection::Horizontal),
                            Some("1") => Some(Reflection::Vertical),
                            Some("2") => Some(Reflection::Both),
                            Some(_) => Some(Reflection::None),
                        },
                        _ => None,
                    })
                    .unwrap_or(Reflection::None)
            }
            GameModsInner::Intermode(ref mods) => {
                if mods.contains(GameModIntermode::HardRock) {
                    Reflection::Vertical
                } else {
                    Reflection::None
                }
            }
            GameModsInner::Legacy(mods) => {
                if mods.contains(GameModsLegacy::HardRock) {
                    Reflection::Vertical
                } else {
                    Reflection::None
                }
            }
        }
    }
}

macro_rules! impl_map_attr {
    ( $( $fn:ident: $field:ident [$s:literal] ;)* ) => {
        impl GameMods {
            $(
                #[doc = "Check whether the mods specify a custom "]
                #[doc = $s]
                #[doc = "value."]
                pub(crate) fn $fn(&self) -> Option<f64> {
                    match self.inner {
                        GameModsInner::Lazer(ref mods) => mods.iter().find_map(|gamemod| match gamemod {
                            GameMod::DifficultyAdjustOsu(DifficultyAdjustOsu { $field, .. }) => *$field,
                            _ => None,
                        }),
                        GameModsInner::Intermode(_) | GameModsInner::Legacy(_) => None,
                    }
                }
            )*
        }
    };
}

impl_map_attr! {
    ar: approach_rate ["ar"];
    cs: circle_size ["cs"];
    hp: drain_rate ["hp"];
    od: overall_difficulty ["od"];
}

macro_rules! impl_has_mod {
    ( $( $fn:ident: $sign:tt $name:ident [ $s:literal ], )* ) => {
        impl GameMods {
            $(
                #[doc = "Check whether [`GameMods`] contain `"]
                #[doc = $s]
                #[doc = "`."]
                pub(crate) fn $fn(&self) -> bool {
                    match self.inner {
                        GameModsInner::Lazer(ref mods) => {
                            mods.contains_intermode(GameModIntermode::$name)
                        },
                        GameModsInner::Intermode(ref mods) => {
                            mods.contains(GameModIntermode::$name)
                        },
                        GameModsInner::Legacy(_mods) => {
                            impl_has_mod!(LEGACY $sign $name _mods)
                        },
                    }
                }
            )*
        }
    };

    ( LEGACY + $name:ident $mods:ident ) => {
        $mods.contains(GameModsLegacy::$name)
    };

    ( LEGACY - $name:ident $mods:ident ) => {
        false
    };
}

impl_has_mod! {
    nf: + NoFail ["NoFail"],
    ez: + Easy ["Easy"],
    td: + TouchDevice ["TouchDevice"],
    hd: + Hidden ["Hidden"],
    hr: + HardRock ["HardRock"],
    rx: + Relax ["Relax"],
    fl: + Flashlight ["Flashlight"],
    so: + SpunOut ["SpunOut"],
    ap: + Autopilot ["Autopilot"],
    tc: - Traceable ["Traceable"],
}

impl Default for GameMods {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<GameModsLazer> for GameMods {
    fn from(mods: GameModsLazer) -> Self {
        Self {
            inner: GameModsInner::Lazer(mods),
        }
    }
}

impl From<GameModsIntermode> for GameMods {
    fn from(mods: GameModsIntermode) -> Self {
        Self {
            inner: GameModsInner::Intermode(mods),
        }
    }
}

impl From<&GameModsIntermode> for GameMods {
    fn from(mods: &GameModsIntermode) -> Self {
        // Only legacy mods can be stored without an allocation
        match mods.checked_bits() {
            Some(bits) => bits.into(),
            None => mods.to_owned().into(),
        }
    }
}

impl From<GameModsLegacy> for GameMods {
    fn from(mods: GameModsLegacy) -> Self {
        Self {
            inner: GameModsInner::Legacy(mods),
        }
    }
}

impl From<u32> for GameMods {
    fn from(bits: u32) -> Self {
        GameModsLegacy::from_bits(bits).into()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reflection {
    None,
    Vertical,
    Horizontal,
    Both,
}

/// The effects of a mod combination that difficulty and performance
/// calculation care about.
///
/// Built once per calculation; nothing downstream inspects mod identity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModCapabilities {
    pub hidden: bool,
    pub flashlight: bool,
    pub relax: bool,
    pub autopilot: bool,
    pub hard_rock: bool,
    pub easy: bool,
    pub no_fail: bool,
    pub spun_out: bool,
    pub touch_device: bool,
    pub traceable: bool,
    pub clock_rate: f64,
    pub forced_ar: Option<f64>,
    pub forced_cs: Option<f64>,
    pub forced_od: Option<f64>,
    pub forced_hp: Option<f64>,
}

impl ModCapabilities {
    /// Collapse `mods` into capabilities, using the given clock rate instead
    /// of the one implied by the mods.
    pub fn new(mods: &GameMods, clock_rate: f64) -> Self {
        Self {
            hidden: mods.hd(),
            flashlight: mods.fl(),
            relax: mods.rx(),
            autopilot: mods.ap(),
            hard_rock: mods.hr(),
            easy: mods.ez(),
            no_fail: mods.nf(),
            spun_out: mods.so(),
            touch_device: mods.td(),
            traceable: mods.tc(),
            clock_rate,
            forced_ar: mods.ar(),
            forced_cs: mods.cs(),
            forced_od: mods.od(),
            forced_hp: mods.hp(),
        }
    }
}

impl From<&GameMods> for ModCapabilities {
    fn from(mods: &GameMods) -> Self {
        Self::new(mods, mods.clock_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_bits_round_trip() {
        // HD | HR | DT
        let mods = GameMods::from(8 + 16 + 64);

        assert_eq!(mods.bits(), 88);
        assert_eq!(GameMods::from(mods.bits()), mods);
    }

    #[test]
    fn capabilities_from_legacy() {
        // HD | FL | DT
        let caps = ModCapabilities::from(&GameMods::from(8 + 1024 + 64));

        assert!(caps.hidden);
        assert!(caps.flashlight);
        assert!(!caps.relax);
        assert!((caps.clock_rate - 1.5).abs() < f64::EPSILON);
        assert!(caps.forced_ar.is_none());
    }

    #[test]
    fn capabilities_from_lazer() {
        let mut mods = GameModsLazer::new();
        mods.insert(GameMod::DifficultyAdjustOsu(DifficultyAdjustOsu {
            approach_rate: Some(9.5),
            ..Default::default()
        }));

        let caps = ModCapabilities::from(&GameMods::from(mods));

        assert!(!caps.relax);
        assert_eq!(caps.forced_ar, Some(9.5));
        assert!(caps.forced_cs.is_none());
    }

    #[test]
    fn intermode_acronyms_round_trip() {
        let hddt = GameMods::from(GameModsIntermode::from_acronyms("HDDT"));

        // Sorted by mod kind, then acronym
        assert_eq!(hddt.acronyms(), "DTHD");
        assert_eq!(GameMods::from_acronyms(&hddt.acronyms()), hddt);
        assert_eq!(hddt, GameMods::from(8 + 64));

        // Mods without legacy bits survive too
        let hdbl = GameMods::from_acronyms("HDBL");
        assert_eq!(hdbl.bits(), 8);
        assert_eq!(GameMods::from_acronyms(&hdbl.acronyms()), hdbl);
        assert_ne!(hdbl, GameMods::from(8));

        assert_eq!(GameMods::default().acronyms(), "NM");
        assert_eq!(GameMods::from_acronyms("NM"), GameMods::default());
    }

    #[test]
    fn hard_rock_reflects_vertically() {
        assert_eq!(GameMods::from(16).reflection(), Reflection::Vertical);
        assert_eq!(GameMods::default().reflection(), Reflection::None);
    }
}
