/// A difficulty object that knows its position within the arena of all
/// difficulty objects of a calculation.
pub trait IDifficultyObject: Sized {
    fn idx(&self) -> usize;

    /// The object `backwards_idx + 1` places before this one.
    fn previous<'a>(&self, backwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        self.idx()
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| diff_objects.get(idx))
    }

    /// The object `forwards_idx + 1` places after this one.
    fn next<'a>(&self, forwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        diff_objects.get(self.idx() + (forwards_idx + 1))
    }
}

pub trait HasStartTime {
    fn start_time(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(usize);

    impl IDifficultyObject for Dummy {
        fn idx(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn traversal_is_bounds_checked() {
        let objects: Vec<_> = (0..4).map(Dummy).collect();

        assert_eq!(objects[2].previous(0, &objects).map(|o| o.0), Some(1));
        assert_eq!(objects[2].previous(1, &objects).map(|o| o.0), Some(0));
        assert!(objects[2].previous(2, &objects).is_none());

        assert_eq!(objects[1].next(0, &objects).map(|o| o.0), Some(2));
        assert_eq!(objects[1].next(1, &objects).map(|o| o.0), Some(3));
        assert!(objects[1].next(2, &objects).is_none());
    }
}
