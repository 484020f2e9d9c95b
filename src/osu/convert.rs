use rosu_map::section::hit_objects::CurveBuffers;

use crate::model::{beatmap::Beatmap, mods::Reflection};

use super::{
    difficulty::{object::OsuDifficultyObject, scaling_factor::ScalingFactor},
    object::{NestedSliderObjectKind, OsuObject, OsuObjectKind},
};

/// Object tallies of the first `take` converted objects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectCounts {
    pub max_combo: u32,
    pub n_circles: u32,
    pub n_sliders: u32,
    pub n_spinners: u32,
    pub n_large_ticks: u32,
}

impl ObjectCounts {
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }
}

/// Place the map's hit objects on the playfield.
///
/// Objects are reflected, stacked, and sliders get their lazy cursor path.
/// Only the first `take` objects are counted.
pub fn convert_objects(
    map: &Beatmap,
    scaling_factor: &ScalingFactor,
    reflection: Reflection,
    time_preempt: f64,
    mut take: usize,
    counts: &mut ObjectCounts,
) -> Box<[OsuObject]> {
    let mut curve_bufs = CurveBuffers::default();
    let mut ticks_buf = Vec::new();

    let mut osu_objects: Box<[_]> = map
        .hit_objects
        .iter()
        .map(|h| OsuObject::new(h, map, reflection, &mut curve_bufs, &mut ticks_buf))
        .inspect(|h| {
            if take == 0 {
                return;
            }

            take -= 1;
            counts.max_combo += 1;

            match h.kind {
                OsuObjectKind::Circle => counts.n_circles += 1,
                OsuObjectKind::Slider(ref slider) => {
                    counts.n_sliders += 1;
                    counts.max_combo += slider.nested_objects.len() as u32;
                    counts.n_large_ticks += slider
                        .nested_objects
                        .iter()
                        .filter(|nested| nested.is_tick() || nested.is_repeat())
                        .count() as u32;
                }
                OsuObjectKind::Spinner(_) => counts.n_spinners += 1,
            }
        })
        .collect();

    for h in osu_objects.iter_mut() {
        h.reflect(reflection);
    }

    let stack_threshold = time_preempt * f64::from(map.stack_leniency);

    if map.version >= 6 {
        stacking(&mut osu_objects, stack_threshold);
    } else {
        old_stacking(&mut osu_objects, stack_threshold);
    }

    let cursor_scaling = f64::from(OsuDifficultyObject::NORMALIZED_RADIUS) / scaling_factor.radius;

    for h in osu_objects.iter_mut() {
        h.stack_offset = scaling_factor.stack_offset(h.stack_height);

        let (start_time, stacked_pos, stack_offset) = (h.start_time, h.stacked_pos(), h.stack_offset);

        if let OsuObjectKind::Slider(ref mut slider) = h.kind {
            slider.compute_lazy_cursor(
                start_time,
                stacked_pos,
                stack_offset,
                cursor_scaling,
                f64::from(OsuDifficultyObject::NORMALIZED_RADIUS),
            );
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        n_objects = osu_objects.len(),
        stack_threshold,
        "Converted hit objects"
    );

    osu_objects
}

const STACK_DISTANCE: f32 = 3.0;

fn stacking(hit_objects: &mut [OsuObject], stack_threshold: f64) {
    let mut extended_start_idx = 0;

    let Some(extended_end_idx) = hit_objects.len().checked_sub(1) else {
        return;
    };

    for i in (1..=extended_end_idx).rev() {
        let mut n = i;
        let mut obj_i_idx = i;

        // Objects that already belong to a stack were handled by a later one
        if hit_objects[obj_i_idx].stack_height != 0 || hit_objects[obj_i_idx].is_spinner() {
            continue;
        }

        if hit_objects[obj_i_idx].is_circle() {
            // Ends with a stack of circles, possibly underneath a slider
            while let Some(prev) = n.checked_sub(1) {
                n = prev;

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].end_time() > stack_threshold {
                    break;
                }

                if n < extended_start_idx {
                    hit_objects[n].stack_height = 0;
                    extended_start_idx = n;
                }

                // Circles under the end of a slider stack down and right
                if hit_objects[n].is_slider()
                    && hit_objects[n]
                        .end_pos()
                        .distance(hit_objects[obj_i_idx].pos)
                        < STACK_DISTANCE
                {
                    let offset =
                        hit_objects[obj_i_idx].stack_height - hit_objects[n].stack_height + 1;

                    for j in n + 1..=i {
                        if hit_objects[n].end_pos().distance(hit_objects[j].pos) < STACK_DISTANCE {
                            hit_objects[j].stack_height -= offset;
                        }
                    }

                    // The slider is handled as its own base by the outer loop
                    break;
                }

                if hit_objects[n].pos.distance(hit_objects[obj_i_idx].pos) < STACK_DISTANCE {
                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        } else if hit_objects[obj_i_idx].is_slider() {
            // Starting from a slider, always stack up and left
            while let Some(prev) = n.checked_sub(1) {
                n = prev;

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].start_time > stack_threshold {
                    break;
                }

                if hit_objects[n]
                    .end_pos()
                    .distance(hit_objects[obj_i_idx].pos)
                    < STACK_DISTANCE
                {
                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        }
    }
}

/// Stacking of maps before format version 6.
fn old_stacking(hit_objects: &mut [OsuObject], stack_threshold: f64) {
    for i in 0..hit_objects.len() {
        if hit_objects[i].stack_height != 0 && !hit_objects[i].is_slider() {
            continue;
        }

        let mut start_time = hit_objects[i].end_time();

        let path_end_pos = {
            let h = &hit_objects[i];

            match h.kind {
                OsuObjectKind::Circle | OsuObjectKind::Spinner(_) => h.pos,
                OsuObjectKind::Slider(ref slider) => {
                    // End of the path, not of the slider
                    let nested = if slider.repeat_count() % 2 == 0 {
                        slider.tail()
                    } else {
                        slider
                            .nested_objects
                            .iter()
                            .find(|nested| matches!(nested.kind, NestedSliderObjectKind::Repeat))
                    };

                    nested.map_or(h.pos, |nested| nested.pos)
                }
            }
        };

        let mut slider_stack = 0;

        for j in i + 1..hit_objects.len() {
            if hit_objects[j].start_time - stack_threshold > start_time {
                break;
            }

            // Compared against the start time of `j` on purpose
            if hit_objects[j].pos.distance(hit_objects[i].pos) < STACK_DISTANCE {
                hit_objects[i].stack_height += 1;
                start_time = hit_objects[j].start_time;
            } else if hit_objects[j].pos.distance(path_end_pos) < STACK_DISTANCE {
                slider_stack += 1;
                hit_objects[j].stack_height -= slider_stack;
                start_time = hit_objects[j].start_time;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rosu_map::util::Pos;

    use crate::model::hit_object::{HitObject, HitObjectKind};

    use super::*;

    fn circle(x: f32, y: f32, start_time: f64) -> HitObject {
        HitObject {
            pos: Pos::new(x, y),
            start_time,
            kind: HitObjectKind::Circle,
        }
    }

    fn map(hit_objects: Vec<HitObject>) -> Beatmap {
        Beatmap {
            hit_objects,
            ..Default::default()
        }
    }

    #[test]
    fn circles_on_the_same_spot_stack() {
        let map = map(vec![
            circle(100.0, 100.0, 1000.0),
            circle(100.0, 100.0, 1100.0),
            circle(100.0, 100.0, 1200.0),
        ]);

        let scaling_factor = ScalingFactor::new(4.0);
        let mut counts = ObjectCounts::default();

        let objects = convert_objects(
            &map,
            &scaling_factor,
            Reflection::None,
            1200.0,
            usize::MAX,
            &mut counts,
        );

        let heights: Vec<_> = objects.iter().map(|h| h.stack_height).collect();
        assert_eq!(heights, [2, 1, 0]);

        assert!(objects[0].stack_offset.x < objects[1].stack_offset.x);
        assert_eq!(counts.n_circles, 3);
        assert_eq!(counts.max_combo, 3);
    }

    #[test]
    fn distant_circles_do_not_stack() {
        let map = map(vec![circle(0.0, 0.0, 1000.0), circle(200.0, 200.0, 1100.0)]);

        let mut counts = ObjectCounts::default();

        let objects = convert_objects(
            &map,
            &ScalingFactor::new(4.0),
            Reflection::None,
            1200.0,
            1,
            &mut counts,
        );

        assert!(objects.iter().all(|h| h.stack_height == 0));
        assert_eq!(counts.n_objects(), 1);
    }

    #[test]
    fn reflection_mirrors_positions() {
        let map = map(vec![circle(100.0, 84.0, 1000.0)]);

        let objects = convert_objects(
            &map,
            &ScalingFactor::new(4.0),
            Reflection::Vertical,
            1200.0,
            usize::MAX,
            &mut ObjectCounts::default(),
        );

        assert!((objects[0].pos.y - 300.0).abs() < f32::EPSILON);
    }
}
