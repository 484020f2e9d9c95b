use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{strain_decay, weighted_difficulty_value, StrainSections, StrainSkill},
    },
    osu::difficulty::{evaluators::FlashlightEvaluator, object::OsuDifficultyObject},
};

pub struct Flashlight {
    current_strain: f64,
    evaluator: FlashlightEvaluator,
    sections: StrainSections,
}

impl Flashlight {
    const SKILL_MULTIPLIER: f64 = 0.05512;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(hidden: bool, radius: f64, time_preempt: f64, time_fade_in: f64) -> Self {
        Self {
            current_strain: 0.0,
            evaluator: FlashlightEvaluator::new(radius, time_preempt, time_fade_in, hidden),
            sections: StrainSections::new(),
        }
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        25.0 * difficulty.powi(2)
    }
}

impl StrainSkill for Flashlight {
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
        self.current_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.current_strain +=
            self.evaluator.evaluate_diff_of(curr, objects) * Self::SKILL_MULTIPLIER;

        self.current_strain
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

        self.current_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    /// Plain sum of all section peaks.
    fn difficulty_value(&self) -> f64 {
        weighted_difficulty_value(self.sections.current_strain_peaks(), 0, 1.0, 1.0)
    }
}
