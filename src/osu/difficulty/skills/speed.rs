use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{
            count_top_weighted_strains, strain_decay, weighted_difficulty_value, StrainSections,
            StrainSkill,
        },
    },
    osu::difficulty::{
        evaluators::{RhythmEvaluator, SpeedEvaluator},
        object::OsuDifficultyObject,
    },
};

use super::{DECAY_WEIGHT, REDUCED_STRAIN_BASELINE};

#[derive(Clone)]
pub struct Speed {
    current_strain: f64,
    current_rhythm: f64,
    hit_window: f64,
    autopilot: bool,
    object_strains: Vec<f64>,
    sections: StrainSections,
}

impl Speed {
    const SKILL_MULTIPLIER: f64 = 1.47;
    const STRAIN_DECAY_BASE: f64 = 0.3;
    const REDUCED_SECTION_COUNT: usize = 5;

    pub fn new(hit_window: f64, autopilot: bool) -> Self {
        Self {
            current_strain: 0.0,
            current_rhythm: 0.0,
            hit_window,
            autopilot,
            object_strains: Vec::with_capacity(256),
            sections: StrainSections::new(),
        }
    }

    /// Amount of notes weighted by how close their strain is to the hardest
    /// one.
    pub fn relevant_note_count(&self) -> f64 {
        self.object_strains
            .iter()
            .copied()
            .max_by(f64::total_cmp)
            .filter(|&n| n > 0.0)
            .map_or(0.0, |max_strain| {
                self.object_strains.iter().fold(0.0, |sum, strain| {
                    sum + (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip()
                })
            })
    }

    pub fn count_top_weighted_strains(&self, difficulty_value: f64) -> f64 {
        count_top_weighted_strains(&self.object_strains, difficulty_value)
    }
}

impl StrainSkill for Speed {
    type DifficultyObject<'a> = OsuDifficultyObject<'a>;

    fn sections(&self) -> &StrainSections {
        &self.sections
    }

    fn sections_mut(&mut self) -> &mut StrainSections {
        &mut self.sections
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &OsuDifficultyObject<'a>,
        objects: &[OsuDifficultyObject<'a>],
    ) -> f64 {
        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain +=
            SpeedEvaluator::evaluate_diff_of(curr, objects, self.hit_window, self.autopilot)
                * Self::SKILL_MULTIPLIER;
        self.current_rhythm = RhythmEvaluator::evaluate_diff_of(curr, objects, self.hit_window);

        let total_strain = self.current_strain * self.current_rhythm;
        self.object_strains.push(total_strain);

        total_strain
    }

    fn calculate_initial_strain<'a>(
        &self,
        time: f64,
        curr: &OsuDifficultyObject<'a>,
        objects: &[OsuDifficultyObject<'a>],
    ) -> f64 {
        let prev_start_time = curr
            .previous(0, objects)
            .map_or(0.0, HasStartTime::start_time);

        (self.current_strain * self.current_rhythm)
            * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn difficulty_value(&self) -> f64 {
        weighted_difficulty_value(
            self.sections.current_strain_peaks(),
            Self::REDUCED_SECTION_COUNT,
            REDUCED_STRAIN_BASELINE,
            DECAY_WEIGHT,
        )
    }
}
