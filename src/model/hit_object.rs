use std::borrow::Cow;

use rosu_map::section::{
    general::GameMode,
    hit_objects::{Curve, CurveBuffers},
};

pub use rosu_map::{
    section::hit_objects::{PathControlPoint, PathType, SplineType},
    util::Pos,
};

use crate::model::mods::Reflection;

/// All hitobject related data required for difficulty and performance
/// calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: HitObjectKind,
}

impl HitObject {
    /// Whether the hitobject is a circle.
    pub const fn is_circle(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Circle)
    }

    /// Whether the hitobject is a slider.
    pub const fn is_slider(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Slider(_))
    }

    /// Whether the hitobject is a spinner.
    pub const fn is_spinner(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Spinner(_))
    }
}

/// Additional data for a [`HitObject`].
#[derive(Clone, Debug, PartialEq)]
pub enum HitObjectKind {
    Circle,
    Slider(Slider),
    Spinner(Spinner),
}

/// A slider.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    pub expected_dist: Option<f64>,
    pub repeats: usize,
    pub control_points: Box<[PathControlPoint]>,
}

impl Slider {
    /// The amount of spans of the slider.
    pub const fn span_count(&self) -> usize {
        self.repeats + 1
    }

    /// Creates the [`Curve`] of a [`Slider`] after applying the
    /// [`Reflection`] onto its control points.
    pub(crate) fn curve(&self, reflection: Reflection, bufs: &mut CurveBuffers) -> Curve {
        fn reflect<F: Fn(Pos) -> Pos>(points: &mut Cow<'_, [PathControlPoint]>, f: F) {
            points
                .to_mut()
                .iter_mut()
                .for_each(|point| point.pos = f(point.pos));
        }

        let mut points = Cow::Borrowed(self.control_points.as_ref());

        match reflection {
            Reflection::None => {}
            Reflection::Vertical => reflect(&mut points, |pos| Pos::new(pos.x, -pos.y)),
            Reflection::Horizontal => reflect(&mut points, |pos| Pos::new(-pos.x, pos.y)),
            Reflection::Both => reflect(&mut points, |pos| Pos::new(-pos.x, -pos.y)),
        }

        Curve::new(GameMode::Osu, points.as_ref(), self.expected_dist, bufs)
    }
}

/// A spinner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spinner {
    pub duration: f64,
}
