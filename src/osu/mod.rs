use rosu_map::util::Pos;

use crate::{
    any::Difficulty,
    model::{
        beatmap::Beatmap,
        mode::{ConvertError, IGameMode, Ruleset},
    },
};

pub use self::{
    attributes::{
        CacheableOsuDifficultyAttributes, OsuDifficultyAttributes, OsuPerformanceAttributes,
    },
    performance::OsuPerformance,
};

mod attributes;
pub(crate) mod convert;
pub(crate) mod difficulty;
pub(crate) mod object;
mod performance;

pub(crate) use self::performance::{
    calculate_effective_miss_count, calculate_miss_penalty, estimate_deviation, generate_state,
    length_bonus, total_successful_hits, JudgementCounts, SliderJudgements, StateInput,
};

const PLAYFIELD_BASE_SIZE: Pos = Pos::new(512.0, 384.0);

/// Marker type for [`GameMode::Osu`].
///
/// [`GameMode::Osu`]: rosu_map::section::general::GameMode::Osu
pub struct Osu;

impl IGameMode for Osu {
    type DifficultyAttributes = OsuDifficultyAttributes;

    const RULESET: Ruleset = Ruleset::Osu;

    fn difficulty(
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<Self::DifficultyAttributes, ConvertError> {
        difficulty::difficulty(difficulty, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cacheable_round_trip() {
        let attrs = OsuDifficultyAttributes {
            aim: 2.5,
            speed: 1.75,
            stars: 4.2,
            n_circles: 10,
            max_combo: 12,
            clock_rate: 1.5,
            mods: 64.into(),
            ..Default::default()
        };

        assert_eq!(OsuDifficultyAttributes::from(attrs.to_cacheable()), attrs);
    }
}
