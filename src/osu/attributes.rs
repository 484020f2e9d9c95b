use serde::{Deserialize, Serialize};

use crate::{model::mods::GameMods, osu::performance::OsuPerformance};

/// The result of a difficulty calculation on an osu!standard map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsuDifficultyAttributes {
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The number of sliders weighted by difficulty.
    pub aim_difficult_slider_count: f64,
    /// The difficulty of the speed skill.
    pub speed: f64,
    /// The difficulty of the flashlight skill.
    pub flashlight: f64,
    /// The ratio of the aim strain with and without considering sliders
    pub slider_factor: f64,
    /// The number of clickable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Weighted sum of aim strains.
    pub aim_difficult_strain_count: f64,
    /// Weighted sum of speed strains.
    pub speed_difficult_strain_count: f64,
    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The health drain rate.
    pub hp: f64,
    /// The perceived hit window for an n300 inclusive of rate-adjusting mods.
    pub great_hit_window: f64,
    /// The perceived hit window for an n100 inclusive of rate-adjusting mods.
    pub ok_hit_window: f64,
    /// The perceived hit window for an n50 inclusive of rate-adjusting mods.
    pub meh_hit_window: f64,
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

impl OsuDifficultyAttributes {
    /// Return the maximum combo.
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> OsuPerformance<'a> {
        self.into()
    }

    /// Convert into a form that only contains primitives so it can be stored.
    pub fn to_cacheable(&self) -> CacheableOsuDifficultyAttributes {
        CacheableOsuDifficultyAttributes {
            aim: self.aim,
            aim_difficult_slider_count: self.aim_difficult_slider_count,
            speed: self.speed,
            flashlight: self.flashlight,
            slider_factor: self.slider_factor,
            speed_note_count: self.speed_note_count,
            aim_difficult_strain_count: self.aim_difficult_strain_count,
            speed_difficult_strain_count: self.speed_difficult_strain_count,
            ar: self.ar,
            od: self.od,
            hp: self.hp,
            great_hit_window: self.great_hit_window,
            ok_hit_window: self.ok_hit_window,
            meh_hit_window: self.meh_hit_window,
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

/// [`OsuDifficultyAttributes`] with the mods stored as acronyms.
///
/// Mod settings are not kept but the clock rate is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheableOsuDifficultyAttributes {
    pub aim: f64,
    pub aim_difficult_slider_count: f64,
    pub speed: f64,
    pub flashlight: f64,
    pub slider_factor: f64,
    pub speed_note_count: f64,
    pub aim_difficult_strain_count: f64,
    pub speed_difficult_strain_count: f64,
    pub ar: f64,
    pub od: f64,
    pub hp: f64,
    pub great_hit_window: f64,
    pub ok_hit_window: f64,
    pub meh_hit_window: f64,
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

impl From<CacheableOsuDifficultyAttributes> for OsuDifficultyAttributes {
    fn from(attrs: CacheableOsuDifficultyAttributes) -> Self {
        Self {
            aim: attrs.aim,
            aim_difficult_slider_count: attrs.aim_difficult_slider_count,
            speed: attrs.speed,
            flashlight: attrs.flashlight,
            slider_factor: attrs.slider_factor,
            speed_note_count: attrs.speed_note_count,
            aim_difficult_strain_count: attrs.aim_difficult_strain_count,
            speed_difficult_strain_count: attrs.speed_difficult_strain_count,
            ar: attrs.ar,
            od: attrs.od,
            hp: attrs.hp,
            great_hit_window: attrs.great_hit_window,
            ok_hit_window: attrs.ok_hit_window,
            meh_hit_window: attrs.meh_hit_window,
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

/// The result of a performance calculation on an osu!standard map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsuPerformanceAttributes {
    /// The difficulty attributes that were used for the performance calculation
    pub difficulty: OsuDifficultyAttributes,
    /// The final performance points.
    pub pp: f64,
    /// The accuracy portion of the final pp.
    pub pp_acc: f64,
    /// The aim portion of the final pp.
    pub pp_aim: f64,
    /// The flashlight portion of the final pp.
    pub pp_flashlight: f64,
    /// The speed portion of the final pp.
    pub pp_speed: f64,
    /// Misses including an approximated amount of slider breaks
    pub effective_miss_count: f64,
    /// Approximated unstable rate on speed notes; `f64::INFINITY` if it
    /// cannot be estimated.
    pub speed_deviation: f64,
}

impl OsuPerformanceAttributes {
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
    pub fn performance<'a>(self) -> OsuPerformance<'a> {
        self.difficulty.into()
    }
}

impl From<OsuPerformanceAttributes> for OsuDifficultyAttributes {
    fn from(attributes: OsuPerformanceAttributes) -> Self {
        attributes.difficulty
    }
}
