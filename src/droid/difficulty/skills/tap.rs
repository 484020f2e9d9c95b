use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{power_mean_difficulty_value, strain_decay, StrainSections, StrainSkill},
    },
    droid::difficulty::{evaluators::TapEvaluator, object::DroidDifficultyObject},
};

use super::{REDUCED_SECTION_COUNT, REDUCED_STRAIN_BASELINE};

/// Tapping speed, scaled by the rhythm multiplier that [`Rhythm`] stored on
/// each object beforehand.
///
/// [`Rhythm`]: super::rhythm::Rhythm
#[derive(Clone)]
pub struct Tap {
    current_strain: f64,
    current_rhythm: f64,
    great_window: f64,
    consider_cheesability: bool,
    strain_time_cap: Option<f64>,
    sections: StrainSections,
}

impl Tap {
    const SKILL_MULTIPLIER: f64 = 1375.0;
    const STRAIN_DECAY_BASE: f64 = 0.3;
    const STARS_PER_DOUBLE: f64 = 1.1;

    pub fn new(great_window: f64, consider_cheesability: bool, strain_time_cap: Option<f64>) -> Self {
        Self {
            current_strain: 0.0,
            current_rhythm: 0.0,
            great_window,
            consider_cheesability,
            strain_time_cap,
            sections: StrainSections::new(),
        }
    }
}

impl StrainSkill for Tap {
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
        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += TapEvaluator::evaluate_diff_of(
            curr,
            objects,
            self.great_window,
            self.consider_cheesability,
            self.strain_time_cap,
        ) * Self::SKILL_MULTIPLIER;

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
        if self.strain_time_cap.is_none() {
            curr.tap_strain.set(strain);
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
