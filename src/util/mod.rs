pub mod difficulty;
pub mod float_ext;
pub mod map_or_attrs;
pub mod strains_vec;

pub fn get_precision_adjusted_beat_len(slider_velocity_multiplier: f64, beat_len: f64) -> f64 {
    let slider_velocity_as_beat_len = -100.0 / slider_velocity_multiplier;

    let bpm_multiplier = if slider_velocity_as_beat_len < 0.0 {
        f64::from(((-slider_velocity_as_beat_len) as f32).clamp(10.0, 10_000.0)) / 100.0
    } else {
        1.0
    };

    beat_len * bpm_multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_adjusted_beat_len_clamps_velocity() {
        assert!((get_precision_adjusted_beat_len(1.0, 500.0) - 500.0).abs() < f64::EPSILON);
        assert!((get_precision_adjusted_beat_len(100.0, 500.0) - 50.0).abs() < f64::EPSILON);
        assert!((get_precision_adjusted_beat_len(0.001, 500.0) - 50_000.0).abs() < f64::EPSILON);
    }
}
