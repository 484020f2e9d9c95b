use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{power_mean_difficulty_value, strain_decay, StrainSections, StrainSkill},
    },
    droid::difficulty::{evaluators::AimEvaluator, object::DroidDifficultyObject},
};

use super::{REDUCED_SECTION_COUNT, REDUCED_STRAIN_BASELINE};

#[derive(Clone)]
pub struct Aim {
    include_sliders: bool,
    current_strain: f64,
    sections: StrainSections,
}

impl Aim {
    const SKILL_MULTIPLIER: f64 = 24.55;
    const STRAIN_DECAY_BASE: f64 = 0.15;
    const STARS_PER_DOUBLE: f64 = 1.05;

    pub fn new(include_sliders: bool) -> Self {
        Self {
            include_sliders,
            current_strain: 0.0,
            sections: StrainSections::new(),
        }
    }
}

impl StrainSkill for Aim {
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
        self.current_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += AimEvaluator::evaluate_diff_of(curr, objects, self.include_sliders)
            * Self::SKILL_MULTIPLIER;

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

    fn save_to_object<'a>(&self, curr: &DroidDifficultyObject<'a>, strain: f64) {
        if self.include_sliders {
            curr.aim_strain_with_sliders.set(strain);
        }
    }

    fn difficulty_value(&self) -> f64 {
        power_mean_difficulty_value(
            self.sections.current_strain_peaks(),
            REDUCED_SECTION_COUNT,
            REDUCED_STRAIN_BASELINE,
            Self::STARS_PER_DOUBLE,
        )
    }
}
