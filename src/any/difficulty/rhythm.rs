use crate::util::difficulty::{logistic, smoothstep_bell_curve};

use super::object::{HasStartTime, IDifficultyObject};

/// Difficulty objects that can be rated by [`rhythm_complexity`].
pub trait RhythmObject: IDifficultyObject + HasStartTime {
    fn delta_time(&self) -> f64;

    fn is_slider(&self) -> bool;

    fn doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64;
}

/// Ruleset specific tuning of [`rhythm_complexity`].
#[derive(Copy, Clone, Debug)]
pub struct RhythmConstants {
    pub overall_multiplier: f64,
    pub ratio_multiplier: f64,
}

const HISTORY_TIME_MAX: f64 = 5000.0;
const HISTORY_OBJECTS_MAX: usize = 32;
const MIN_DELTA_TIME: i32 = 25;

/// Rhythm multiplier of `curr` in the range `[1, ∞)`.
///
/// Consecutive objects with roughly equal delta times form islands; changes
/// between islands are rewarded unless they repeat.
#[allow(clippy::too_many_lines)]
pub fn rhythm_complexity<T: RhythmObject>(
    curr: &T,
    diff_objects: &[T],
    available_history: usize,
    hit_window: f64,
    constants: RhythmConstants,
) -> f64 {
    let mut rhythm_complexity_sum = 0.0;

    let delta_difference_eps = hit_window * 0.3;

    let mut island = RhythmIsland::new(delta_difference_eps);
    let mut prev_island = RhythmIsland::new(delta_difference_eps);
    let mut island_counts = Vec::<IslandCount>::new();

    let mut start_ratio = 0.0;
    let mut first_delta_switch = false;

    let historical_note_count = available_history.min(HISTORY_OBJECTS_MAX);

    let mut rhythm_start = 0;

    while curr
        .previous(rhythm_start, diff_objects)
        .filter(|prev| {
            rhythm_start + 2 < historical_note_count
                && curr.start_time() - prev.start_time() < HISTORY_TIME_MAX
        })
        .is_some()
    {
        rhythm_start += 1;
    }

    if let Some((mut prev_obj, mut last_obj)) = curr
        .previous(rhythm_start, diff_objects)
        .zip(curr.previous(rhythm_start + 1, diff_objects))
    {
        // Oldest object first
        for i in (1..=rhythm_start).rev() {
            let Some(curr_obj) = curr.previous(i - 1, diff_objects) else {
                break;
            };

            let time_decay = (HISTORY_TIME_MAX - (curr.start_time() - curr_obj.start_time()))
                / HISTORY_TIME_MAX;
            let note_decay = (historical_note_count - i) as f64 / historical_note_count as f64;

            let curr_historical_decay = note_decay.min(time_decay);

            let curr_delta = curr_obj.delta_time().max(1e-7);
            let prev_delta = prev_obj.delta_time().max(1e-7);
            let last_delta = last_obj.delta_time().max(1e-7);

            // Multiples of each other, e.g. 100 and 200, are barely a change
            let delta_difference = prev_delta.max(curr_delta) / prev_delta.min(curr_delta);
            let delta_difference_fraction = delta_difference - delta_difference.trunc();

            let curr_ratio = 1.0
                + constants.ratio_multiplier
                    * smoothstep_bell_curve(delta_difference_fraction, 0.5, 0.5).min(0.5);

            let difference_multiplier = (2.0 - delta_difference / 8.0).clamp(0.0, 1.0);

            let window_penalty = (((prev_delta - curr_delta).abs() - delta_difference_eps)
                .max(0.0)
                / delta_difference_eps)
                .min(1.0);

            let mut effective_ratio = window_penalty * curr_ratio * difference_multiplier;

            if first_delta_switch {
                if (prev_delta - curr_delta).abs() < delta_difference_eps {
                    island.add_delta(curr_delta as i32);
                } else {
                    if curr_obj.is_slider() {
                        effective_ratio *= 0.125;
                    }

                    if prev_obj.is_slider() {
                        effective_ratio *= 0.3;
                    }

                    if island.is_similar_polarity(&prev_island) {
                        effective_ratio *= 0.5;
                    }

                    // 1/1 -> 1/2 -> 1/4 right after one another
                    if last_delta > prev_delta + delta_difference_eps
                        && prev_delta > curr_delta + delta_difference_eps
                    {
                        effective_ratio *= 0.125;
                    }

                    if prev_island.delta_count == island.delta_count {
                        effective_ratio *= 0.5;
                    }

                    if let Some(island_count) = island_counts
                        .iter_mut()
                        .find(|entry| entry.island == island)
                        .filter(|entry| !entry.island.is_default())
                    {
                        if prev_island == island {
                            island_count.count += 1;
                        }

                        let power = logistic(f64::from(island.delta), 58.33, 0.24, Some(2.75));
                        effective_ratio *= (3.0 / island_count.count as f64)
                            .min((island_count.count as f64).recip().powf(power));
                    } else {
                        island_counts.push(IslandCount { island, count: 1 });
                    }

                    let doubletapness = prev_obj.doubletapness(Some(curr_obj), hit_window);
                    effective_ratio *= 1.0 - doubletapness * 0.75;

                    rhythm_complexity_sum +=
                        (effective_ratio * start_ratio).sqrt() * curr_historical_decay;

                    start_ratio = effective_ratio;
                    prev_island = island;

                    // Slowing down ends the island
                    if prev_delta + delta_difference_eps < curr_delta {
                        first_delta_switch = false;
                    }

                    island = RhythmIsland::new_with_delta(curr_delta as i32, delta_difference_eps);
                }
            } else if prev_delta > curr_delta + delta_difference_eps {
                // Speeding up starts a new island
                first_delta_switch = true;

                if curr_obj.is_slider() {
                    effective_ratio *= 0.6;
                }

                if prev_obj.is_slider() {
                    effective_ratio *= 0.6;
                }

                start_ratio = effective_ratio;

                island = RhythmIsland::new_with_delta(curr_delta as i32, delta_difference_eps);
            }

            last_obj = prev_obj;
            prev_obj = curr_obj;
        }
    }

    (4.0 + rhythm_complexity_sum * constants.overall_multiplier).sqrt() / 2.0
}

#[derive(Copy, Clone)]
struct RhythmIsland {
    delta_difference_eps: f64,
    delta: i32,
    delta_count: i32,
}

impl RhythmIsland {
    const fn new(delta_difference_eps: f64) -> Self {
        Self {
            delta_difference_eps,
            delta: i32::MAX,
            delta_count: 0,
        }
    }

    fn new_with_delta(delta: i32, delta_difference_eps: f64) -> Self {
        Self {
            delta_difference_eps,
            delta: delta.max(MIN_DELTA_TIME),
            delta_count: 1,
        }
    }

    fn add_delta(&mut self, delta: i32) {
        if self.delta == i32::MAX {
            self.delta = delta.max(MIN_DELTA_TIME);
        }

        self.delta_count += 1;
    }

    const fn is_similar_polarity(&self, other: &Self) -> bool {
        self.delta_count % 2 == other.delta_count % 2
    }

    const fn is_default(&self) -> bool {
        self.delta == i32::MAX && self.delta_count == 0
    }
}

impl PartialEq for RhythmIsland {
    fn eq(&self, other: &Self) -> bool {
        (f64::from(self.delta) - f64::from(other.delta)).abs() < self.delta_difference_eps
            && self.delta_count == other.delta_count
    }
}

struct IslandCount {
    island: RhythmIsland,
    count: usize,
}
