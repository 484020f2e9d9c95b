use std::{io, path::Path, str::FromStr};

use rosu_map::{section::general::GameMode, LATEST_FORMAT_VERSION};

pub use self::{
    attributes::{BeatmapAttributes, BeatmapAttributesBuilder, HitWindows},
    decode::{BeatmapState, ParseBeatmapError},
};

use super::{
    control_point::{difficulty_point_at, timing_point_at, DifficultyPoint, TimingPoint},
    hit_object::HitObject,
    mode::ConvertError,
};

mod attributes;
mod decode;

/// All beatmap data that is relevant for difficulty and performance
/// calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Beatmap {
    pub version: i32,

    // General
    pub stack_leniency: f32,
    pub mode: GameMode,

    // Difficulty
    pub ar: f32,
    pub cs: f32,
    pub hp: f32,
    pub od: f32,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,

    // TimingPoints
    pub timing_points: Vec<TimingPoint>,
    pub difficulty_points: Vec<DifficultyPoint>,

    // HitObjects
    pub hit_objects: Vec<HitObject>,
}

impl Beatmap {
    /// Parse a [`Beatmap`] by providing a path to a `.osu` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        rosu_map::from_path(path)
    }

    /// Parse a [`Beatmap`] by providing the content of a `.osu` file as a
    /// slice of bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, io::Error> {
        rosu_map::from_bytes(bytes)
    }

    /// Returns a [`BeatmapAttributesBuilder`] to calculate modified beatmap
    /// attributes.
    pub fn attributes(&self) -> BeatmapAttributesBuilder {
        BeatmapAttributesBuilder::new().map(self)
    }

    /// Finds the [`TimingPoint`] that is active at the given time.
    pub(crate) fn timing_point_at(&self, time: f64) -> Option<&TimingPoint> {
        timing_point_at(&self.timing_points, time)
    }

    /// Finds the [`DifficultyPoint`] that is active at the given time.
    pub(crate) fn difficulty_point_at(&self, time: f64) -> Option<&DifficultyPoint> {
        difficulty_point_at(&self.difficulty_points, time)
    }

    /// Both rulesets only calculate osu!standard maps.
    pub(crate) const fn check_mode(&self) -> Result<(), ConvertError> {
        match self.mode {
            GameMode::Osu => Ok(()),
            mode => Err(ConvertError::Mode { mode }),
        }
    }
}

impl FromStr for Beatmap {
    type Err = io::Error;

    /// Parse a [`Beatmap`] by providing the content of a `.osu` file as a
    /// string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        rosu_map::from_str(s)
    }
}

const DEFAULT_STACK_LENIENCY: f32 = 0.7;

impl Default for Beatmap {
    fn default() -> Self {
        Self {
            version: LATEST_FORMAT_VERSION,
            stack_leniency: DEFAULT_STACK_LENIENCY,
            mode: GameMode::default(),
            ar: 5.0,
            cs: 5.0,
            hp: 5.0,
            od: 5.0,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
            timing_points: Vec::default(),
            difficulty_points: Vec::default(),
            hit_objects: Vec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::HitObjectKind;

    use super::*;

    const MAP: &str = "osu file format v14

[General]
StackLeniency: 0.5
Mode: 0

[Difficulty]
HPDrainRate:6
CircleSize:4
OverallDifficulty:8
ApproachRate:9
SliderMultiplier:1.8
SliderTickRate:1

[TimingPoints]
1000,500,4,2,0,50,1,0
3000,-50,4,2,0,50,0,0

[HitObjects]
256,192,1000,1,0,0:0:0:0:
100,100,1500,2,0,L|200:100,1,100
256,192,4000,12,0,6000,0:0:0:0:
";

    #[test]
    fn decode_map() {
        let map: Beatmap = MAP.parse().unwrap();

        assert_eq!(map.version, 14);
        assert!((map.stack_leniency - 0.5).abs() < f32::EPSILON);
        assert!((map.cs - 4.0).abs() < f32::EPSILON);
        assert!((map.ar - 9.0).abs() < f32::EPSILON);
        assert!((map.slider_multiplier - 1.8).abs() < f64::EPSILON);
        assert_eq!(map.timing_points.len(), 1);
        assert_eq!(map.difficulty_points.len(), 1);
        assert_eq!(map.hit_objects.len(), 3);

        assert!(map.hit_objects[0].is_circle());
        assert!(map.hit_objects[1].is_slider());

        let HitObjectKind::Spinner(spinner) = map.hit_objects[2].kind else {
            panic!("expected spinner");
        };

        assert!((spinner.duration - 2000.0).abs() < f64::EPSILON);
        assert!(map.check_mode().is_ok());
    }

    #[test]
    fn reject_other_modes() {
        let map = Beatmap {
            mode: GameMode::Taiko,
            ..Default::default()
        };

        assert_eq!(
            map.check_mode(),
            Err(ConvertError::Mode {
                mode: GameMode::Taiko
            })
        );
    }
}
