use crate::{
    any::Difficulty,
    model::{
        beatmap::Beatmap,
        mode::{ConvertError, IGameMode, Ruleset},
    },
};

pub use self::{
    attributes::{
        CacheableDroidDifficultyAttributes, DroidDifficultyAttributes, DroidPerformanceAttributes,
    },
    performance::DroidPerformance,
};

mod attributes;
pub(crate) mod difficulty;
mod performance;

/// Marker type for osu!droid.
///
/// osu!droid plays osu!standard beatmaps, so only
/// [`GameMode::Osu`](rosu_map::section::general::GameMode::Osu) maps are
/// accepted.
pub struct Droid;

impl IGameMode for Droid {
    type DifficultyAttributes = DroidDifficultyAttributes;

    const RULESET: Ruleset = Ruleset::Droid;

    fn difficulty(
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<Self::DifficultyAttributes, ConvertError> {
        difficulty::difficulty(difficulty, map)
    }
}
