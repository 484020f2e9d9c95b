use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{power_mean_difficulty_value, strain_decay, StrainSections, StrainSkill},
    },
    droid::difficulty::{evaluators::RhythmEvaluator, object::DroidDifficultyObject},
};

use super::REDUCED_STRAIN_BASELINE;

/// Rhythm complexity on its own.
///
/// Also stores each object's rhythm multiplier for the skills that are
/// processed after it.
#[derive(Clone)]
pub struct Rhythm {
    current_strain: f64,
    great_window: f64,
    sections: StrainSections,
}

impl Rhythm {
    const SKILL_MULTIPLIER: f64 = 1.0;
    const STRAIN_DECAY_BASE: f64 = 0.3;
    const REDUCED_SECTION_COUNT: usize = 5;
    const STARS_PER_DOUBLE: f64 = 1.75;

    pub fn new(great_window: f64) -> Self {
        Self {
            current_strain: 0.0,
            great_window,
            sections: StrainSections::new(),
        }
    }
}

impl StrainSkill for Rhythm {
    type DifficultyObject<'a> = DroidDifficultyObject<'a>;

    fn sections(&self) -> &StrainSections {
        &self.sections
    }

    fn sections_mut(&mut self) -> &mut StrainSections {
        &mut self.sections
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &DroidDifficultyObject<'a>,
        objects: &[DroidDifficultyObject<'a>],
    ) -> f64 {
        let rhythm_multiplier = RhythmEvaluator::evaluate_diff_of(curr, objects, self.great_window);
        curr.rhythm_multiplier.set(rhythm_multiplier);

        self.current_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += (rhythm_multiplier - 1.0) * Self::SKILL_MULTIPLIER;

        self.current_strain
    }

    fn calculate_initial_strain<'a>(
        &self,
        time: f64,
        curr: &DroidDifficultyObject<'a>,
        objects: &[DroidDifficultyObject<'a>],
    ) -> f64 {
        let prev_start_time = curr
            .previous(0, objects)
            .map_or(0.0, HasStartTime::start_time);

        self.current_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn difficulty_value(&self) -> f64 {
        power_mean_difficulty_value(
            self.sections.current_strain_peaks(),
            Self::REDUCED_SECTION_COUNT,
            REDUCED_STRAIN_BASELINE,
            Self::STARS_PER_DOUBLE,
        )
    }
}
