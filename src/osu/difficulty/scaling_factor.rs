use rosu_map::util::Pos;

use crate::osu::object::OsuObject;

use super::object::OsuDifficultyObject;

const BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE: f32 = 1.00041;

/// Fields around the scaling of hit objects.
///
/// All objects of a map share the same scaling so it is stored only once.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScalingFactor {
    /// `NORMALIZED_RADIUS / radius`, adjusted if `radius < 30`
    pub factor: f32,
    pub radius: f64,
    pub scale: f32,
}

impl ScalingFactor {
    /// Scaling of osu!standard circles.
    pub fn new(cs: f64) -> Self {
        let scale = (f64::from(1.0_f32) - f64::from(0.7_f32) * ((cs - 5.0) / 5.0)) as f32 / 2.0
            * BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE;

        Self::from_radius(f64::from(OsuObject::OBJECT_RADIUS * scale))
    }

    /// Scaling of osu!droid circles, expressed in osu!pixels.
    pub fn droid(cs: f64) -> Self {
        let droid_scale = (681.0 / 480.0) * (54.42 - 4.48 * cs) * 2.0 / 128.0
            + 0.5 * (11.0 - 5.245_017_071_624_519_5) / 5.0;

        let radius = f64::from(OsuObject::OBJECT_RADIUS) * droid_scale.max(1e-3) * 384.0
            / (681.0 * 0.85);

        Self::from_radius(radius)
    }

    pub fn from_radius(radius: f64) -> Self {
        let factor = OsuDifficultyObject::NORMALIZED_RADIUS as f32 / radius as f32;

        let factor_with_small_circle_bonus = if radius < 30.0 {
            factor * (1.0 + (30.0 - radius as f32).min(5.0) / 50.0)
        } else {
            factor
        };

        Self {
            factor: factor_with_small_circle_bonus,
            radius,
            scale: (radius / f64::from(OsuObject::OBJECT_RADIUS)) as f32,
        }
    }

    pub fn stack_offset(&self, stack_height: i32) -> Pos {
        let stack_offset = stack_height as f32 * self.scale * -6.4;

        Pos::new(stack_offset, stack_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osu_radius_at_cs_5() {
        let scaling = ScalingFactor::new(5.0);

        assert!((scaling.radius - 32.013_12).abs() < 1e-4, "{}", scaling.radius);
        assert!((f64::from(scaling.factor) - 50.0 / scaling.radius).abs() < 1e-4);
    }

    #[test]
    fn small_circles_get_a_bonus() {
        let scaling = ScalingFactor::from_radius(20.0);

        assert!((scaling.factor - 2.5 * 1.1).abs() < 1e-6);
    }

    #[test]
    fn droid_circles_shrink_with_cs() {
        assert!(ScalingFactor::droid(7.0).radius < ScalingFactor::droid(4.0).radius);
    }

    #[test]
    fn stacks_move_up_left() {
        let offset = ScalingFactor::from_radius(64.0).stack_offset(2);

        assert!((offset.x + 12.8).abs() < 1e-5);
        assert!((offset.y + 12.8).abs() < 1e-5);
    }
}
