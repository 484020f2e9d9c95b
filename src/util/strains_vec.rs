use std::{
    iter::Copied,
    slice::{Iter, IterMut},
};

/// Section peaks of a strain skill.
#[derive(Clone, Debug, Default)]
pub struct StrainsVec {
    inner: Vec<f64>,
}

impl StrainsVec {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn push(&mut self, value: f64) {
        self.inner.push(value);
    }

    pub fn sort_desc(&mut self) {
        self.inner.sort_by(|a, b| b.total_cmp(a));
    }

    pub fn retain_non_zero(&mut self) {
        self.inner.retain(|&a| a > 0.0);
    }

    pub fn retain_non_zero_and_sort(&mut self) {
        self.retain_non_zero();
        self.sort_desc();
    }

    /// Removes zeros, sorts descendingly, and iterates mutably.
    pub fn sorted_non_zero_iter_mut(&mut self) -> IterMut<'_, f64> {
        self.retain_non_zero_and_sort();

        self.inner.iter_mut()
    }

    pub fn iter(&self) -> Copied<Iter<'_, f64>> {
        self.inner.iter().copied()
    }

    pub fn max(&self) -> f64 {
        self.iter().fold(0.0, f64::max)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_non_zero_drops_zeros() {
        let mut strains = StrainsVec::with_capacity(4);
        strains.push(0.0);
        strains.push(2.0);
        strains.push(0.0);
        strains.push(5.0);

        let sorted: Vec<_> = strains.sorted_non_zero_iter_mut().map(|s| *s).collect();

        assert_eq!(sorted, [5.0, 2.0]);
        assert_eq!(strains.len(), 2);
        assert!((strains.max() - 5.0).abs() < f64::EPSILON);
    }
}
