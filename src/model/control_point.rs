pub use rosu_map::section::timing_points::DifficultyPoint;

/// Tempo of a section of the beatmap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingPoint {
    pub time: f64,
    pub beat_len: f64,
}

impl TimingPoint {
    pub const DEFAULT_BEAT_LEN: f64 =
        rosu_map::section::timing_points::TimingPoint::DEFAULT_BEAT_LEN;

    pub fn new(time: f64, beat_len: f64) -> Self {
        Self {
            time,
            beat_len: beat_len.clamp(6.0, 60_000.0),
        }
    }
}

impl Default for TimingPoint {
    fn default() -> Self {
        Self {
            time: 0.0,
            beat_len: Self::DEFAULT_BEAT_LEN,
        }
    }
}

/// The [`TimingPoint`] active at `time`, falling back to the first one.
pub fn timing_point_at(points: &[TimingPoint], time: f64) -> Option<&TimingPoint> {
    let i = points
        .binary_search_by(|probe| probe.time.total_cmp(&time))
        .unwrap_or_else(|i| i.saturating_sub(1));

    points.get(i)
}

/// The [`DifficultyPoint`] active at `time`, if any started before it.
pub fn difficulty_point_at(points: &[DifficultyPoint], time: f64) -> Option<&DifficultyPoint> {
    points
        .binary_search_by(|probe| probe.time.total_cmp(&time))
        .map_or_else(|i| i.checked_sub(1), Some)
        .map(|i| &points[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_point_lookup() {
        let points = [TimingPoint::new(1000.0, 500.0), TimingPoint::new(5000.0, 250.0)];

        assert_eq!(timing_point_at(&points, 0.0), Some(&points[0]));
        assert_eq!(timing_point_at(&points, 4999.0), Some(&points[0]));
        assert_eq!(timing_point_at(&points, 5000.0), Some(&points[1]));
        assert_eq!(timing_point_at(&[], 5000.0), None);
    }

    #[test]
    fn difficulty_point_lookup() {
        let points = [DifficultyPoint::new(1000.0, -50.0, 2.0)];

        assert!(difficulty_point_at(&points, 500.0).is_none());
        assert!(difficulty_point_at(&points, 1500.0).is_some());
    }

    #[test]
    fn beat_len_is_clamped() {
        assert!((TimingPoint::new(0.0, 1.0).beat_len - 6.0).abs() < f64::EPSILON);
        assert!((TimingPoint::new(0.0, 1e9).beat_len - 60_000.0).abs() < f64::EPSILON);
    }
}
