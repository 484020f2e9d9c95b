use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{
            count_top_weighted_strains, strain_decay, weighted_difficulty_value, StrainSections,
            StrainSkill,
        },
    },
    osu::difficulty::{evaluators::AimEvaluator, object::OsuDifficultyObject},
    util::float_ext::FloatExt,
};

use super::{DECAY_WEIGHT, REDUCED_SECTION_COUNT, REDUCED_STRAIN_BASELINE};

#[derive(Clone)]
pub struct Aim {
    include_sliders: bool,
    current_strain: f64,
    slider_strains: Vec<f64>,
    object_strains: Vec<f64>,
    sections: StrainSections,
}

impl Aim {
    const SKILL_MULTIPLIER: f64 = 26.0;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(include_sliders: bool) -> Self {
        Self {
            include_sliders,
            current_strain: 0.0,
            slider_strains: Vec::with_capacity(64),
            object_strains: Vec::with_capacity(256),
            sections: StrainSections::new(),
        }
    }

    /// Logistic count of sliders relative to the hardest slider strain.
    pub fn get_difficult_sliders(&self) -> f64 {
        let max_slider_strain = self.slider_strains.iter().copied().fold(0.0, f64::max);

        if FloatExt::eq(max_slider_strain, 0.0) {
            return 0.0;
        }

        self.slider_strains
            .iter()
            .map(|strain| 1.0 / (1.0 + f64::exp(-(strain / max_slider_strain * 12.0 - 6.0))))
            .sum()
    }

    pub fn count_top_weighted_strains(&self, difficulty_value: f64) -> f64 {
        count_top_weighted_strains(&self.object_strains, difficulty_value)
    }
}

impl StrainSkill for Aim {
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
        self.current_strain += AimEvaluator::evaluate_diff_of(curr, objects, self.include_sliders)
            * Self::SKILL_MULTIPLIER;

        if curr.base.is_slider() {
            self.slider_strains.push(self.current_strain);
        }

        self.object_strains.push(self.current_strain);

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

    fn difficulty_value(&self) -> f64 {
        weighted_difficulty_value(
            self.sections.current_strain_peaks(),
            REDUCED_SECTION_COUNT,
            REDUCED_STRAIN_BASELINE,
            DECAY_WEIGHT,
        )
    }
}
