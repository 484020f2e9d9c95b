use crate::{
    any::difficulty::skills::{count_difficult_strains, StrainSkill},
    droid::difficulty::object::DroidDifficultyObject,
    model::mods::ModCapabilities,
    util::float_ext::FloatExt,
};

use self::{aim::Aim, flashlight::Flashlight, rhythm::Rhythm, tap::Tap, visual::Visual};

pub mod aim;
pub mod flashlight;
pub mod rhythm;
pub mod tap;
pub mod visual;

const REDUCED_SECTION_COUNT: usize = 10;
const REDUCED_STRAIN_BASELINE: f64 = 0.75;

/// Every skill of an osu!droid calculation.
pub struct DroidSkills {
    pub aim: Aim,
    pub aim_no_sliders: Aim,
    pub rhythm: Rhythm,
    pub tap: Tap,
    pub flashlight: Flashlight,
    pub visual: Visual,
    relax: bool,
}

impl DroidSkills {
    pub fn new(
        caps: &ModCapabilities,
        radius: f64,
        great_window: f64,
        time_preempt: f64,
        time_fade_in: f64,
    ) -> Self {
        Self {
            aim: Aim::new(true),
            aim_no_sliders: Aim::new(false),
            rhythm: Rhythm::new(great_window),
            tap: Tap::new(great_window, true, None),
            flashlight: Flashlight::new(caps.hidden, radius, time_preempt, time_fade_in),
            visual: Visual::new(caps.hidden, time_preempt, time_fade_in, caps.clock_rate),
            relax: caps.relax,
        }
    }

    /// Process `curr` with every skill.
    ///
    /// Rhythm is processed before tap and visual since both read the rhythm
    /// multiplier it stores on `curr`. Under relax, neither of the three is
    /// processed at all.
    pub fn process<'a>(
        &mut self,
        curr: &DroidDifficultyObject<'a>,
        diff_objects: &[DroidDifficultyObject<'a>],
    ) {
        self.aim.process(curr, diff_objects);
        self.aim_no_sliders.process(curr, diff_objects);

        if !self.relax {
            self.rhythm.process(curr, diff_objects);
            self.tap.process(curr, diff_objects);
            self.visual.process(curr, diff_objects);
        }

        self.flashlight.process(curr, diff_objects);
    }
}

/// Sum of `(strain / max_strain)^4` over the strains one skill saved on the
/// processed objects.
pub fn difficult_strain_count<'a>(
    objects: &[DroidDifficultyObject<'a>],
    saved_strain: impl Fn(&DroidDifficultyObject<'a>) -> f64,
) -> f64 {
    let strains: Vec<f64> = objects.iter().map(saved_strain).collect();

    count_difficult_strains(&strains)
}

/// Logistic count of sliders relative to the hardest slider strain of the
/// slider-aware aim skill.
pub fn difficult_slider_count(objects: &[DroidDifficultyObject<'_>]) -> f64 {
    let slider_strains: Vec<f64> = objects
        .iter()
        .filter(|h| h.base.is_slider())
        .map(|h| h.aim_strain_with_sliders.get())
        .collect();

    let max_slider_strain = slider_strains.iter().copied().fold(0.0, f64::max);

    if FloatExt::eq(max_slider_strain, 0.0) {
        return 0.0;
    }

    slider_strains
        .iter()
        .map(|strain| logistic_weight(*strain, max_slider_strain))
        .sum()
}

/// Amount of notes weighted by how close their tap strain is to the hardest
/// one.
pub fn relevant_note_count(objects: &[DroidDifficultyObject<'_>]) -> f64 {
    let max_strain = max_tap_strain(objects);

    if FloatExt::eq(max_strain, 0.0) {
        return 0.0;
    }

    objects
        .iter()
        .map(|h| logistic_weight(h.tap_strain.get(), max_strain))
        .sum()
}

/// Mean strain time of the notes, weighted like [`relevant_note_count`].
pub fn relevant_delta_time(objects: &[DroidDifficultyObject<'_>]) -> f64 {
    let max_strain = max_tap_strain(objects);

    if FloatExt::eq(max_strain, 0.0) {
        return 0.0;
    }

    let (weighted_sum, weight_sum) = objects.iter().fold((0.0, 0.0), |(sum, weights), h| {
        let weight = logistic_weight(h.tap_strain.get(), max_strain);

        (sum + weight * h.strain_time, weights + weight)
    });

    if FloatExt::eq(weight_sum, 0.0) {
        0.0
    } else {
        weighted_sum / weight_sum
    }
}

fn max_tap_strain(objects: &[DroidDifficultyObject<'_>]) -> f64 {
    objects
        .iter()
        .map(|h| h.tap_strain.get())
        .fold(0.0, f64::max)
}

fn logistic_weight(strain: f64, max_strain: f64) -> f64 {
    (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip()
}
