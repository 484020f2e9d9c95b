use crate::util::{float_ext::FloatExt, strains_vec::StrainsVec};

use super::object::HasStartTime;

/// A skill whose difficulty is accumulated as decaying strain over 400ms
/// sections.
///
/// Implementors hold their own current strain and delegate the section
/// bookkeeping to [`StrainSections`].
pub trait StrainSkill: Sized {
    type DifficultyObject<'a>: HasStartTime;

    fn sections(&self) -> &StrainSections;

    fn sections_mut(&mut self) -> &mut StrainSections;

    /// Decay the current strain up to `curr` and add its evaluation.
    fn strain_value_at<'a>(
        &mut self,
        curr: &Self::DifficultyObject<'a>,
        objects: &[Self::DifficultyObject<'a>],
    ) -> f64;

    /// The strain a new section starts with at `time`.
    fn calculate_initial_strain<'a>(
        &self,
        time: f64,
        curr: &Self::DifficultyObject<'a>,
        objects: &[Self::DifficultyObject<'a>],
    ) -> f64;

    fn save_to_object<'a>(&self, _curr: &Self::DifficultyObject<'a>, _strain: f64) {}

    fn process<'a>(
        &mut self,
        curr: &Self::DifficultyObject<'a>,
        objects: &[Self::DifficultyObject<'a>],
    ) {
        let start_time = curr.start_time();
        self.sections_mut().seed(start_time);

        while start_time > self.sections().section_end() {
            self.sections_mut().save_current_peak();
            let section_end = self.sections().section_end();
            let initial_strain = self.calculate_initial_strain(section_end, curr, objects);
            self.sections_mut().start_new_section(initial_strain);
        }

        let strain = self.strain_value_at(curr, objects);
        self.save_to_object(curr, strain);
        self.sections_mut().update_peak(strain);
    }

    fn difficulty_value(&self) -> f64;
}

/// Peak bookkeeping of a [`StrainSkill`].
#[derive(Clone, Debug, Default)]
pub struct StrainSections {
    current_section_peak: f64,
    current_section_end: f64,
    started: bool,
    strain_peaks: StrainsVec,
}

impl StrainSections {
    pub const SECTION_LENGTH: f64 = 400.0;

    pub fn new() -> Self {
        Self {
            strain_peaks: StrainsVec::with_capacity(256),
            ..Self::default()
        }
    }

    /// Align the first section end to the first processed object.
    fn seed(&mut self, time: f64) {
        if !self.started {
            self.started = true;
            self.current_section_end = (time / Self::SECTION_LENGTH).ceil() * Self::SECTION_LENGTH;
        }
    }

    pub const fn section_end(&self) -> f64 {
        self.current_section_end
    }

    fn save_current_peak(&mut self) {
        self.strain_peaks.push(self.current_section_peak);
    }

    fn start_new_section(&mut self, initial_strain: f64) {
        self.current_section_peak = initial_strain;
        self.current_section_end += Self::SECTION_LENGTH;
    }

    fn update_peak(&mut self, strain: f64) {
        self.current_section_peak = self.current_section_peak.max(strain);
    }

    /// All finalized peaks plus the peak of the current, partial section.
    pub fn current_strain_peaks(&self) -> StrainsVec {
        let mut peaks = self.strain_peaks.clone();

        if self.started {
            peaks.push(self.current_section_peak);
        }

        peaks
    }
}

pub fn strain_decay(ms: f64, strain_decay_base: f64) -> f64 {
    f64::powf(strain_decay_base, ms / 1000.0)
}

/// Sorts the peaks descendingly and scales the hardest `reduced_section_count`
/// of them down towards `reduced_strain_baseline`.
fn reduce_highest_peaks(
    peaks: &mut StrainsVec,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
) {
    let iter = peaks.sorted_non_zero_iter_mut().take(reduced_section_count);

    for (i, strain) in iter.enumerate() {
        let clamped = (i as f64 / reduced_section_count as f64).clamp(0.0, 1.0);
        let scale = f64::log10(f64::lerp(1.0, 10.0, clamped));
        *strain *= f64::lerp(reduced_strain_baseline, 1.0, scale);
    }

    peaks.sort_desc();
}

/// Weighted sum of the peaks where the `i`-th hardest one is weighted by
/// `decay_weight^i`.
pub fn weighted_difficulty_value(
    current_strain_peaks: StrainsVec,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
    decay_weight: f64,
) -> f64 {
    let mut peaks = current_strain_peaks;
    reduce_highest_peaks(&mut peaks, reduced_section_count, reduced_strain_baseline);

    let mut difficulty = 0.0;
    let mut weight = 1.0;

    for strain in peaks.into_vec() {
        difficulty += strain * weight;
        weight *= decay_weight;
    }

    difficulty
}

/// Power mean of the peaks such that doubling the amount of equally hard
/// sections multiplies the difficulty by `stars_per_double`.
pub fn power_mean_difficulty_value(
    current_strain_peaks: StrainsVec,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
    stars_per_double: f64,
) -> f64 {
    let mut peaks = current_strain_peaks;

    if reduced_section_count > 0 {
        reduce_highest_peaks(&mut peaks, reduced_section_count, reduced_strain_baseline);
    } else {
        peaks.retain_non_zero();
    }

    let exponent = stars_per_double.log2();

    let sum: f64 = peaks.iter().map(|strain| strain.powf(exponent.recip())).sum();

    sum.powf(exponent)
}

/// Logistic count of the object strains that are about as hard as the top
/// strain would be if every strain were identical.
pub fn count_top_weighted_strains(object_strains: &[f64], difficulty_value: f64) -> f64 {
    if object_strains.is_empty() {
        return 0.0;
    }

    let consistent_top_strain = difficulty_value / 10.0;

    if FloatExt::eq(consistent_top_strain, 0.0) {
        return object_strains.len() as f64;
    }

    object_strains
        .iter()
        .map(|s| 1.1 / (1.0 + f64::exp(-10.0 * (s / consistent_top_strain - 0.88))))
        .sum()
}

/// `Σ (strain / max_strain)^4`
pub fn count_difficult_strains(object_strains: &[f64]) -> f64 {
    let max_strain = object_strains.iter().copied().fold(0.0, f64::max);

    if FloatExt::eq(max_strain, 0.0) {
        return 0.0;
    }

    object_strains
        .iter()
        .map(|strain| (strain / max_strain).powi(4))
        .sum()
}

/// Performance value of a rating, shared by both rulesets.
pub fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn peaks(values: &[f64]) -> StrainsVec {
        let mut peaks = StrainsVec::with_capacity(values.len());

        for &value in values {
            peaks.push(value);
        }

        peaks
    }

    #[test]
    fn weighted_sum_without_reduction() {
        let value = weighted_difficulty_value(peaks(&[1.0, 0.0, 2.0]), 0, 1.0, 0.5);

        assert!((value - 2.5).abs() < 1e-12);
    }

    #[test]
    fn power_mean_doubles_by_stars_per_double() {
        let single = power_mean_difficulty_value(peaks(&[3.0]), 0, 1.0, 1.1);
        let double = power_mean_difficulty_value(peaks(&[3.0, 3.0]), 0, 1.0, 1.1);

        assert!((single - 3.0).abs() < 1e-9);
        assert!((double / single - 1.1).abs() < 1e-9);
    }

    #[test]
    fn reduction_damps_the_hardest_peak() {
        let reduced = power_mean_difficulty_value(peaks(&[4.0]), 10, 0.75, 1.1);

        assert!((reduced - 3.0).abs() < 1e-9);
    }

    #[test]
    fn difficult_strains_relative_to_max() {
        assert!(count_difficult_strains(&[]).abs() < f64::EPSILON);
        assert!(count_difficult_strains(&[0.0, 0.0]).abs() < f64::EPSILON);
        assert!((count_difficult_strains(&[1.0, 2.0]) - (1.0 + 1.0 / 16.0)).abs() < 1e-12);
    }

    #[test]
    fn base_performance_floor() {
        assert!((difficulty_to_performance(0.0) - 1e-5).abs() < 1e-15);
    }

    #[test]
    fn sections_flush_partial_peak() {
        let mut sections = StrainSections::new();
        assert!(sections.current_strain_peaks().is_empty());

        sections.seed(150.0);
        assert!((sections.section_end() - 400.0).abs() < f64::EPSILON);

        sections.update_peak(2.0);
        sections.save_current_peak();
        sections.start_new_section(1.0);
        sections.update_peak(0.5);

        assert_eq!(sections.current_strain_peaks().into_vec(), [2.0, 1.0]);
        assert!((sections.section_end() - 800.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn power_mean_is_monotonic(values in prop::collection::vec(0.0_f64..100.0, 1..32), extra in 0.0_f64..100.0) {
            let base = power_mean_difficulty_value(peaks(&values), 10, 0.75, 1.05);

            let mut more = values.clone();
            more.push(extra);
            let extended = power_mean_difficulty_value(peaks(&more), 10, 0.75, 1.05);

            prop_assert!(extended + 1e-9 >= base, "{extended} < {base}");
        }
    }
}
