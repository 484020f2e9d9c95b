use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{power_mean_difficulty_value, strain_decay, StrainSections, StrainSkill},
    },
    droid::difficulty::{evaluators::VisualEvaluator, object::DroidDifficultyObject},
};

use super::{REDUCED_SECTION_COUNT, REDUCED_STRAIN_BASELINE};

pub struct Visual {
    current_strain: f64,
    current_rhythm: f64,
    clock_rate: f64,
    evaluator: VisualEvaluator,
    sections: StrainSections,
}

impl Visual {
    const SKILL_MULTIPLIER: f64 = 10.0;
    const STRAIN_DECAY_BASE: f64 = 0.1;
    const STARS_PER_DOUBLE: f64 = 1.025;

    pub fn new(hidden: bool, time_preempt: f64, time_fade_in: f64, clock_rate: f64) -> Self {
        Self {
            current_strain: 0.0,
            current_rhythm: 0.0,
            clock_rate,
            evaluator: VisualEvaluator::new(time_preempt, time_fade_in, hidden),
            sections: StrainSections::new(),
        }
    }
}

impl StrainSkill for Visual {
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
        self.current_strain += self
            .evaluator
            .evaluate_diff_of(curr, objects, self.clock_rate)
            * Self::SKILL_MULTIPLIER;

        self.current_rhythm = curr.rhythm_multiplier.get();

        self.current_strain * self.current_rhythm
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

        (self.current_strain * self.current_rhythm)
            * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn save_to_object<'a>(&self, curr: &DroidDifficultyObject<'a>, strain: f64) {
        curr.visual_strain.set(strain);
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
