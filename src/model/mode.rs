use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

pub use rosu_map::section::general::GameMode;

use crate::any::Difficulty;

use super::beatmap::Beatmap;

/// A way to specify a ruleset at compile-time.
///
/// Implemented for the marker types [`Osu`] and [`Droid`].
///
/// [`Osu`]: crate::osu::Osu
/// [`Droid`]: crate::droid::Droid
pub trait IGameMode: Sized {
    /// The resulting type of a difficulty calculation.
    type DifficultyAttributes;

    /// How the ruleset derives circle size and hit windows.
    const RULESET: Ruleset;

    /// Perform a difficulty calculation for the given map.
    ///
    /// Fails if the map is not an osu!standard map.
    fn difficulty(
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<Self::DifficultyAttributes, ConvertError>;
}

/// The ruleset whose conventions apply to mod-adjusted beatmap attributes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Ruleset {
    /// osu!standard: HR multiplies CS by 1.3 and OD scales the classic
    /// hit windows.
    #[default]
    Osu,
    /// osu!droid: HR adds 1 to CS and OD scales the droid great window.
    Droid,
}

/// Error when a beatmap cannot be used for the requested ruleset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConvertError {
    /// Only osu!standard beatmaps are supported.
    Mode { mode: GameMode },
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Mode { mode } => write!(
                f,
                "cannot calculate a {mode:?} beatmap; only osu!standard beatmaps are supported"
            ),
        }
    }
}

impl StdError for ConvertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_error_message() {
        let err = ConvertError::Mode {
            mode: GameMode::Mania,
        };

        assert_eq!(
            err.to_string(),
            "cannot calculate a Mania beatmap; only osu!standard beatmaps are supported"
        );
    }
}
