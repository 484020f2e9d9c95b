use std::cmp;

use crate::any::ScoreState;

/// Turns partial judgement counts and a target accuracy into a complete
/// [`ScoreState`].
pub trait HitResultGenerator {
    fn generate_hitresults(params: &HitResultParams) -> ScoreState;
}

/// Input of a [`HitResultGenerator`].
#[derive(Clone, Debug, PartialEq)]
pub struct HitResultParams {
    // Guaranteed to be correct
    pub total_hits: u32,
    pub priority: HitResultPriority,

    // Provided by user; may be infeasable
    pub acc: Option<f64>,
    pub n300: Option<u32>,
    pub n100: Option<u32>,
    pub n50: Option<u32>,
    pub misses: u32,
    pub slider_end_hits: Option<u32>,
    pub large_tick_hits: Option<u32>,
}

/// While generating remaining hitresults, decide how they should be
/// distributed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HitResultPriority {
    /// Prioritize good hitresults over bad ones
    #[default]
    BestCase,
    /// Prioritize bad hitresults over good ones
    WorstCase,
}

/// [`HitResultGenerator`] whose result is generated in closed form.
///
/// The distribution maximizes the amount of 300s for the target accuracy.
pub struct Fast;

impl HitResultGenerator for Fast {
    fn generate_hitresults(params: &HitResultParams) -> ScoreState {
        let misses = cmp::min(params.misses, params.total_hits);
        let remain = params.total_hits - misses;

        let clamp = |n: Option<u32>| n.map(|n| cmp::min(n, remain));

        let (n300, n100, n50) = match params.acc {
            Some(acc) => with_accuracy(
                acc,
                params.total_hits,
                remain,
                (clamp(params.n300), clamp(params.n100), clamp(params.n50)),
                params.priority,
            ),
            None => without_accuracy(
                remain,
                (clamp(params.n300), clamp(params.n100), clamp(params.n50)),
                params.priority,
            ),
        };

        ScoreState {
            max_combo: 0,
            slider_end_hits: params.slider_end_hits,
            large_tick_hits: params.large_tick_hits,
            n300,
            n100,
            n50,
            misses,
        }
    }
}

type Counts = (u32, u32, u32);

fn with_accuracy(
    acc: f64,
    total_hits: u32,
    remain: u32,
    given: (Option<u32>, Option<u32>, Option<u32>),
    priority: HitResultPriority,
) -> Counts {
    // The closed form has at most four n100s so only the fully specified
    // case leaves a remainder for the priority to distribute.

    // acc = (6*n300 + 2*n100 + n50) / (6*total_hits)
    let target_total = f64::round(acc.clamp(0.0, 1.0) * f64::from(6 * total_hits)) as u32;

    match given {
        (Some(n300), Some(n100), Some(n50)) => {
            let (n300, n100) = (n300, cmp::min(n100, remain - n300));
            let n50 = cmp::min(n50, remain - n300 - n100);
            let rest = remain - n300 - n100 - n50;

            match priority {
                HitResultPriority::BestCase => (n300 + rest, n100, n50),
                HitResultPriority::WorstCase => (n300, n100, n50 + rest),
            }
        }
        (Some(n300), Some(n100), None) => {
            let n100 = cmp::min(n100, remain - n300);

            (n300, n100, remain - n300 - n100)
        }
        (Some(n300), None, Some(n50)) => {
            let n50 = cmp::min(n50, remain - n300);

            (n300, remain - n300 - n50, n50)
        }
        (None, Some(n100), Some(n50)) => {
            let n50 = cmp::min(n50, remain - n100);

            (remain - n100 - n50, n100, n50)
        }
        (Some(n300), None, None) => {
            // Each n100 is worth one more than an n50
            let remain = remain - n300;
            let baseline = 6 * n300 + remain;
            let n100 = cmp::min(remain, target_total.saturating_sub(baseline));

            (n300, n100, remain - n100)
        }
        (None, Some(n100), None) => {
            // Each n300 is worth five more than an n50
            let remain = remain - n100;
            let baseline = 2 * n100 + remain;
            let n300 = cmp::min(remain, target_total.saturating_sub(baseline) / 5);

            (n300, n100, remain - n300)
        }
        (None, None, Some(n50)) => {
            // Each n300 is worth four more than an n100
            let remain = remain - n50;
            let baseline = n50 + 2 * remain;
            let n300 = cmp::min(remain, target_total.saturating_sub(baseline) / 4);

            (n300, remain - n300, n50)
        }
        (None, None, None) => {
            // Start by assuming every non-miss is an n50
            let delta = target_total.saturating_sub(remain);

            // Each n300 increases by 5, each n100 by 1
            let n300 = cmp::min(remain, delta / 5);
            let n100 = cmp::min(remain - n300, delta % 5);
            let n50 = remain - n300 - n100;

            (n300, n100, n50)
        }
    }
}

fn without_accuracy(
    remain: u32,
    given: (Option<u32>, Option<u32>, Option<u32>),
    priority: HitResultPriority,
) -> Counts {
    let (mut n300, mut n100, mut n50) = (
        given.0.unwrap_or(0),
        given.1.unwrap_or(0),
        given.2.unwrap_or(0),
    );

    n100 = cmp::min(n100, remain - n300);
    n50 = cmp::min(n50, remain - n300 - n100);
    let rest = remain - n300 - n100 - n50;

    match priority {
        HitResultPriority::BestCase => match given {
            (None, ..) => n300 = rest,
            (_, None, _) => n100 = rest,
            (.., None) => n50 = rest,
            _ => n300 += rest,
        },
        HitResultPriority::WorstCase => match (given.2, given.1, given.0) {
            (None, ..) => n50 = rest,
            (_, None, _) => n100 = rest,
            (.., None) => n300 = rest,
            _ => n50 += rest,
        },
    }

    (n300, n100, n50)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn params(total_hits: u32, acc: Option<f64>, misses: u32) -> HitResultParams {
        HitResultParams {
            total_hits,
            priority: HitResultPriority::BestCase,
            acc,
            n300: None,
            n100: None,
            n50: None,
            misses,
            slider_end_hits: None,
            large_tick_hits: None,
        }
    }

    #[test]
    fn perfect_accuracy_no_misses() {
        let state = Fast::generate_hitresults(&params(100, Some(1.0), 0));

        assert_eq!(state.n300, 100);
        assert_eq!(state.n100, 0);
        assert_eq!(state.n50, 0);
        assert_eq!(state.misses, 0);
    }

    #[test]
    fn high_accuracy_with_misses() {
        let state = Fast::generate_hitresults(&params(1000, Some(0.95), 10));

        assert_eq!(state.total_hits(), 1000);
        assert_eq!(state.misses, 10);
        assert!((state.accuracy() - 0.95).abs() < 0.001, "{}", state.accuracy());
    }

    #[test]
    fn misses_are_capped() {
        let state = Fast::generate_hitresults(&params(50, Some(0.0), 80));

        assert_eq!(state.misses, 50);
        assert_eq!(state.total_hits(), 50);
    }

    #[test]
    fn explicit_counts_without_accuracy() {
        let mut params = params(100, None, 3);
        params.n100 = Some(10);

        let state = Fast::generate_hitresults(&params);
        assert_eq!((state.n300, state.n100, state.n50), (87, 10, 0));

        params.priority = HitResultPriority::WorstCase;

        let state = Fast::generate_hitresults(&params);
        assert_eq!((state.n300, state.n100, state.n50), (0, 10, 87));
    }

    #[test]
    fn explicit_n100_with_accuracy() {
        let mut params = params(100, Some(0.9), 0);
        params.n100 = Some(10);

        let state = Fast::generate_hitresults(&params);

        assert_eq!(state.n100, 10);
        assert_eq!(state.total_hits(), 100);
        assert!((state.accuracy() - 0.9).abs() < 0.01, "{}", state.accuracy());
    }

    proptest! {
        #[test]
        fn totals_add_up(total in 1_u32..5000, acc in 0.0_f64..=1.0, misses in 0_u32..100) {
            let state = Fast::generate_hitresults(&params(total, Some(acc), misses));

            prop_assert_eq!(state.total_hits(), total);
            prop_assert_eq!(state.misses, misses.min(total));
        }
    }
}
