/// Aggregation for a score's current state.
///
/// Shared by osu!droid and osu!standard since both judge objects the same
/// way.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScoreState {
    /// Maximum combo that the score has had so far. **Not** the maximum
    /// possible combo of the map so far.
    pub max_combo: u32,
    /// Amount of successfully hit slider ends, if known.
    pub slider_end_hits: Option<u32>,
    /// Amount of successfully hit slider ticks and repeats, if known.
    pub large_tick_hits: Option<u32>,
    /// Amount of current 300s.
    pub n300: u32,
    /// Amount of current 100s.
    pub n100: u32,
    /// Amount of current 50s.
    pub n50: u32,
    /// Amount of current misses.
    pub misses: u32,
}

impl ScoreState {
    /// Create a new empty score state.
    pub const fn new() -> Self {
        Self {
            max_combo: 0,
            slider_end_hits: None,
            large_tick_hits: None,
            n300: 0,
            n100: 0,
            n50: 0,
            misses: 0,
        }
    }

    /// Return the total amount of hits by adding everything up.
    pub const fn total_hits(&self) -> u32 {
        self.n300 + self.n100 + self.n50 + self.misses
    }

    /// Calculate the accuracy between `0.0` and `1.0` for this state.
    pub fn accuracy(&self) -> f64 {
        let total_hits = self.total_hits();

        if total_hits == 0 {
            return 0.0;
        }

        let numerator = 6 * self.n300 + 2 * self.n100 + self.n50;
        let denominator = 6 * total_hits;

        f64::from(numerator) / f64::from(denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_of_empty_state() {
        assert!(ScoreState::new().accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_weights_judgements() {
        let state = ScoreState {
            n300: 2,
            n100: 1,
            n50: 1,
            misses: 2,
            ..ScoreState::new()
        };

        assert_eq!(state.total_hits(), 6);
        assert!((state.accuracy() - 15.0 / 36.0).abs() < 1e-12);
    }
}
