use serde::{Deserialize, Serialize};

use crate::{droid::performance::DroidPerformance, model::mods::GameMods};

/// The result of a difficulty calculation on an osu!droid map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DroidDifficultyAttributes {
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The difficulty of the tap skill.
    pub tap: f64,
    /// The difficulty of the rhythm skill.
    pub rhythm: f64,
    /// The difficulty of the flashlight skill.
    ///
    /// Calculated regardless of whether flashlight is enabled.
    pub flashlight: f64,
    /// The difficulty of the visual skill.
    pub visual: f64,
    /// The number of sliders weighted by difficulty.
    pub aim_difficult_slider_count: f64,
    /// Sum of aim strains relative to the hardest one.
    pub aim_difficult_strain_count: f64,
    /// Sum of tap strains relative to the hardest one.
    pub tap_difficult_strain_count: f64,
    /// Sum of flashlight strains relative to the hardest one.
    pub flashlight_difficult_strain_count: f64,
    /// Sum of visual strains relative to the hardest one.
    pub visual_difficult_strain_count: f64,
    /// The ratio of the aim strain with and without considering sliders
    pub slider_factor: f64,
    /// The number of clickable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Strain time of the notes that contribute to tap difficulty, weighted
    /// like [`speed_note_count`](Self::speed_note_count).
    pub average_speed_delta_time: f64,
    /// Ratio of tap difficulty when strain times are capped at
    /// [`average_speed_delta_time`](Self::average_speed_delta_time).
    ///
    /// Lower values mean the map is easier to vibro.
    pub vibro_factor: f64,
    /// The perceived hit window for an n300 inclusive of rate-adjusting mods.
    pub great_hit_window: f64,
    /// The perceived hit window for an n100 inclusive of rate-adjusting mods.
    pub ok_hit_window: f64,
    /// The perceived hit window for an n50 inclusive of rate-adjusting mods.
    pub meh_hit_window: f64,
    /// The approach rate.
    pub approach_rate: f64,
    /// The overall difficulty, converted from the droid great hit window.
    pub overall_difficulty: f64,
    /// The amount of circles.
    pub n_circles: u32,
    /// The amount of sliders.
    pub n_sliders: u32,
    /// The amount of slider ticks and repeat points.
    pub n_large_ticks: u32,
    /// The amount of spinners.
    pub n_spinners: u32,
    /// The maximum combo.
    pub max_combo: u32,
    /// The clock rate that was used.
    pub clock_rate: f64,
    /// The mods that were used.
    pub mods: GameMods,
    /// The final star rating.
    pub stars: f64,
}

impl DroidDifficultyAttributes {
    /// Return the maximum combo.
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> DroidPerformance<'a> {
        self.into()
    }

    /// Convert into a form that only contains primitives so it can be stored.
    pub fn to_cacheable(&self) -> CacheableDroidDifficultyAttributes {
        CacheableDroidDifficultyAttributes {
            aim: self.aim,
            tap: self.tap,
            rhythm: self.rhythm,
            flashlight: self.flashlight,
            visual: self.visual,
            aim_difficult_slider_count: self.aim_difficult_slider_count,
            aim_difficult_strain_count: self.aim_difficult_strain_count,
            tap_difficult_strain_count: self.tap_difficult_strain_count,
            flashlight_difficult_strain_count: self.flashlight_difficult_strain_count,
            visual_difficult_strain_count: self.visual_difficult_strain_count,
            slider_factor: self.slider_factor,
            speed_note_count: self.speed_note_count,
            average_speed_delta_time: self.average_speed_delta_time,
            vibro_factor: self.vibro_factor,
            great_hit_window: self.great_hit_window,
            ok_hit_window: self.ok_hit_window,
            meh_hit_window: self.meh_hit_window,
            approach_rate: self.approach_rate,
            overall_difficulty: self.overall_difficulty,
            n_circles: self.n_circles,
            n_sliders: self.n_sliders,
            n_large_ticks: self.n_large_ticks,
            n_spinners: self.n_spinners,
            max_combo: self.max_combo,
            clock_rate: self.clock_rate,
            mods: self.mods.acronyms(),
            stars: self.stars,
        }
    }
}

/// [`DroidDifficultyAttributes`] with the mods stored as acronyms.
///
/// Mod settings are not kept but the clock rate is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheableDroidDifficultyAttributes {
    pub aim: f64,
    pub tap: f64,
    pub rhythm: f64,
    pub flashlight: f64,
    pub visual: f64,
    pub aim_difficult_slider_count: f64,
    pub aim_difficult_strain_count: f64,
    pub tap_difficult_strain_count: f64,
    pub flashlight_difficult_strain_count: f64,
    pub visual_difficult_strain_count: f64,
    pub slider_factor: f64,
    pub speed_note_count: f64,
    pub average_speed_delta_time: f64,
    pub vibro_factor: f64,
    pub great_hit_window: f64,
    pub ok_hit_window: f64,
    pub meh_hit_window: f64,
    pub approach_rate: f64,
    pub overall_difficulty: f64,
    pub n_circles: u32,
    pub n_sliders: u32,
    pub n_large_ticks: u32,
    pub n_spinners: u32,
    pub max_combo: u32,
    pub clock_rate: f64,
    /// The mods' acronyms, e.g. `"DTHD"`.
    pub mods: String,
    pub stars: f64,
}

impl From<CacheableDroidDifficultyAttributes> for DroidDifficultyAttributes {
    fn from(attrs: CacheableDroidDifficultyAttributes) -> Self {
        Self {
            aim: attrs.aim,
            tap: attrs.tap,
            rhythm: attrs.rhythm,
            flashlight: attrs.flashlight,
            visual: attrs.visual,
            aim_difficult_slider_count: attrs.aim_difficult_slider_count,
            aim_difficult_strain_count: attrs.aim_difficult_strain_count,
            tap_difficult_strain_count: attrs.tap_difficult_strain_count,
            flashlight_difficult_strain_count: attrs.flashlight_difficult_strain_count,
            visual_difficult_strain_count: attrs.visual_difficult_strain_count,
            slider_factor: attrs.slider_factor,
            speed_note_count: attrs.speed_note_count,
            average_speed_delta_time: attrs.average_speed_delta_time,
            vibro_factor: attrs.vibro_factor,
            great_hit_window: attrs.great_hit_window,
            ok_hit_window: attrs.ok_hit_window,
            meh_hit_window: attrs.meh_hit_window,
            approach_rate: attrs.approach_rate,
            overall_difficulty: attrs.overall_difficulty,
            n_circles: attrs.n_circles,
            n_sliders: attrs.n_sliders,
            n_large_ticks: attrs.n_large_ticks,
            n_spinners: attrs.n_spinners,
            max_combo: attrs.max_combo,
            clock_rate: attrs.clock_rate,
            mods: GameMods::from_acronyms(&attrs.mods),
            stars: attrs.stars,
        }
    }
}

/// The result of a performance calculation on an osu!droid map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DroidPerformanceAttributes {
    /// The difficulty attributes that were used for the performance calculation
    pub difficulty: DroidDifficultyAttributes,
    /// The final performance points.
    pub pp: f64,
    /// The aim portion of the final pp.
    pub pp_aim: f64,
    /// The tap portion of the final pp.
    pub pp_tap: f64,
    /// The accuracy portion of the final pp.
    pub pp_accuracy: f64,
    /// The flashlight portion of the final pp.
    pub pp_flashlight: f64,
    /// The visual portion of the final pp.
    pub pp_visual: f64,
    /// Misses including an approximated amount of slider breaks
    pub effective_miss_count: f64,
    /// Estimated hit deviation in milliseconds; `f64::INFINITY` if it cannot
    /// be estimated.
    pub deviation: f64,
    /// Estimated hit deviation on notes that matter for tapping;
    /// `f64::INFINITY` if it cannot be estimated.
    pub tap_deviation: f64,
}

impl DroidPerformanceAttributes {
    /// Return the star value.
    pub const fn stars(&self) -> f64 {
        self.difficulty.stars
    }

    /// Return the performance point value.
    pub const fn pp(&self) -> f64 {
        self.pp
    }

    /// Return the maximum combo of the map.
    pub const fn max_combo(&self) -> u32 {
        self.difficulty.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.difficulty.n_objects()
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> DroidPerformance<'a> {
        self.difficulty.into()
    }
}

impl From<DroidPerformanceAttributes> for DroidDifficultyAttributes {
    fn from(attributes: DroidPerformanceAttributes) -> Self {
        attributes.difficulty
    }
}
