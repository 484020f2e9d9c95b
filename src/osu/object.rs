use std::borrow::Cow;

use rosu_map::{
    section::hit_objects::{Curve, CurveBuffers, SliderEvent, SliderEventType, SliderEventsIter},
    util::Pos,
};

use crate::{
    model::{
        beatmap::Beatmap,
        control_point::{DifficultyPoint, TimingPoint},
        hit_object::{HitObject, HitObjectKind, Slider, Spinner},
        mods::Reflection,
    },
    util::get_precision_adjusted_beat_len,
};

use super::PLAYFIELD_BASE_SIZE;

/// A hit object placed on the playfield, shared by both rulesets.
pub struct OsuObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub stack_offset: Pos,
    pub kind: OsuObjectKind,
}

impl OsuObject {
    pub const OBJECT_RADIUS: f32 = 64.0;

    const BASE_SCORING_DIST: f64 = 100.0;

    pub fn new(
        h: &HitObject,
        map: &Beatmap,
        reflection: Reflection,
        curve_bufs: &mut CurveBuffers,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let kind = match h.kind {
            HitObjectKind::Circle => OsuObjectKind::Circle,
            HitObjectKind::Slider(ref slider) => OsuObjectKind::Slider(OsuSlider::new(
                h, slider, map, reflection, curve_bufs, ticks_buf,
            )),
            HitObjectKind::Spinner(spinner) => OsuObjectKind::Spinner(spinner),
        };

        Self {
            pos: h.pos,
            start_time: h.start_time,
            stack_height: 0,
            stack_offset: Pos::default(),
            kind,
        }
    }

    /// Mirror the position across the playfield and make nested positions
    /// absolute.
    pub fn reflect(&mut self, reflection: Reflection) {
        match reflection {
            Reflection::None => {}
            Reflection::Vertical => self.pos.y = PLAYFIELD_BASE_SIZE.y - self.pos.y,
            Reflection::Horizontal => self.pos.x = PLAYFIELD_BASE_SIZE.x - self.pos.x,
            Reflection::Both => {
                self.pos.x = PLAYFIELD_BASE_SIZE.x - self.pos.x;
                self.pos.y = PLAYFIELD_BASE_SIZE.y - self.pos.y;
            }
        }

        if let OsuObjectKind::Slider(ref mut slider) = self.kind {
            for nested in slider.nested_objects.iter_mut() {
                nested.pos = self.pos + nested.pos;
            }
        }
    }

    pub fn end_time(&self) -> f64 {
        match self.kind {
            OsuObjectKind::Circle => self.start_time,
            OsuObjectKind::Slider(ref slider) => slider.end_time,
            OsuObjectKind::Spinner(ref spinner) => self.start_time + spinner.duration,
        }
    }

    pub const fn stacked_pos(&self) -> Pos {
        Pos::new(
            self.pos.x + self.stack_offset.x,
            self.pos.y + self.stack_offset.y,
        )
    }

    pub fn end_pos(&self) -> Pos {
        match self.kind {
            OsuObjectKind::Circle | OsuObjectKind::Spinner(_) => self.pos,
            OsuObjectKind::Slider(ref slider) => slider.tail().map_or(self.pos, |tail| tail.pos),
        }
    }

    pub fn stacked_end_pos(&self) -> Pos {
        self.end_pos() + self.stack_offset
    }

    /// Where a lazy cursor ends up after this object.
    pub fn lazy_end_pos(&self) -> Pos {
        match self.kind {
            OsuObjectKind::Slider(ref slider) => slider.lazy_end_pos,
            OsuObjectKind::Circle | OsuObjectKind::Spinner(_) => self.stacked_pos(),
        }
    }

    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Circle)
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Slider { .. })
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Spinner(_))
    }
}

pub enum OsuObjectKind {
    Circle,
    Slider(OsuSlider),
    Spinner(Spinner),
}

pub struct OsuSlider {
    pub end_time: f64,
    pub span_count: f64,
    pub path: Curve,
    pub nested_objects: Vec<NestedSliderObject>,
    pub lazy_end_pos: Pos,
    pub lazy_travel_dist: f64,
    pub lazy_travel_time: f64,
}

impl OsuSlider {
    /// Leniency before the slider end in which the tail counts as tracked.
    const TAIL_LENIENCY: f64 = -36.0;

    fn new(
        h: &HitObject,
        slider: &Slider,
        map: &Beatmap,
        reflection: Reflection,
        curve_bufs: &mut CurveBuffers,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let start_time = h.start_time;

        let beat_len = map
            .timing_point_at(start_time)
            .map_or(TimingPoint::DEFAULT_BEAT_LEN, |point| point.beat_len);

        let (slider_velocity, generate_ticks) = map.difficulty_point_at(start_time).map_or(
            (
                DifficultyPoint::DEFAULT_SLIDER_VELOCITY,
                DifficultyPoint::DEFAULT_GENERATE_TICKS,
            ),
            |point| (point.slider_velocity, point.generate_ticks),
        );

        let path = slider.curve(reflection, curve_bufs);
        let span_count = slider.span_count() as f64;

        let velocity = OsuObject::BASE_SCORING_DIST * map.slider_multiplier
            / get_precision_adjusted_beat_len(slider_velocity, beat_len);
        let scoring_dist = velocity * beat_len;

        let end_time = start_time + span_count * path.dist() / velocity;
        let span_duration = (end_time - start_time) / span_count;

        let tick_dist_multiplier = if map.version < 8 {
            slider_velocity.recip()
        } else {
            1.0
        };

        let tick_dist = if generate_ticks {
            scoring_dist / map.slider_tick_rate * tick_dist_multiplier
        } else {
            f64::INFINITY
        };

        let events = SliderEventsIter::new(
            start_time,
            span_duration,
            velocity,
            tick_dist,
            path.dist(),
            slider.span_count() as i32,
            ticks_buf,
        );

        let span_at = |progress: f64| (progress * span_count) as i32;

        let obj_progress_at = |progress: f64| {
            let p = progress * span_count % 1.0;

            if span_at(progress) % 2 == 1 {
                1.0 - p
            } else {
                p
            }
        };

        let end_path_pos = path.position_at(obj_progress_at(1.0));

        // Positions stay relative to the head until the object is reflected
        let mut nested_objects: Vec<_> = events
            .filter_map(|e| {
                let obj = match e.kind {
                    SliderEventType::Tick => NestedSliderObject {
                        pos: path.position_at(e.path_progress),
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tick,
                    },
                    SliderEventType::Repeat => NestedSliderObject {
                        pos: path.position_at(e.path_progress),
                        start_time: start_time + f64::from(e.span_idx + 1) * span_duration,
                        kind: NestedSliderObjectKind::Repeat,
                    },
                    SliderEventType::Tail => NestedSliderObject {
                        pos: end_path_pos,
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tail,
                    },
                    SliderEventType::Head | SliderEventType::LastTick => return None,
                };

                Some(obj)
            })
            .collect();

        nested_objects.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Self {
            end_time,
            span_count,
            path,
            nested_objects,
            lazy_end_pos: Pos::default(),
            lazy_travel_dist: 0.0,
            lazy_travel_time: 0.0,
        }
    }

    pub fn repeat_count(&self) -> usize {
        self.nested_objects
            .iter()
            .filter(|nested| nested.is_repeat())
            .count()
    }

    pub fn tail(&self) -> Option<&NestedSliderObject> {
        // Not necessarily the last nested object on short buzz sliders
        self.nested_objects
            .iter()
            .rfind(|nested| matches!(nested.kind, NestedSliderObjectKind::Tail))
    }

    /// Follow the slider with a cursor that only moves as much as the follow
    /// circle requires.
    ///
    /// `scaling_factor` normalizes distances onto a radius of 50.
    pub fn compute_lazy_cursor(
        &mut self,
        start_time: f64,
        stacked_pos: Pos,
        stack_offset: Pos,
        scaling_factor: f64,
        normalized_radius: f64,
    ) {
        let assumed_slider_radius = normalized_radius * 1.8;

        let duration = self.end_time - start_time;

        let mut nested_objects = Cow::Borrowed(self.nested_objects.as_slice());

        let mut tracking_end_time =
            (start_time + duration + Self::TAIL_LENIENCY).max(start_time + duration / 2.0);

        let last_real_tick = nested_objects
            .iter()
            .enumerate()
            .rfind(|(_, nested)| nested.is_tick());

        if let Some((idx, last_real_tick)) =
            last_real_tick.filter(|(_, tick)| tick.start_time > tracking_end_time)
        {
            tracking_end_time = last_real_tick.start_time;

            // The last tick is tracked after the tail
            nested_objects.to_mut()[idx..].rotate_left(1);
        }

        self.lazy_travel_time = tracking_end_time - start_time;

        let span_duration = duration / self.span_count;
        let mut end_time_min = self.lazy_travel_time / span_duration;

        if end_time_min % 2.0 >= 1.0 {
            end_time_min = 1.0 - end_time_min % 1.0;
        } else {
            end_time_min %= 1.0;
        }

        let mut lazy_end_pos = stacked_pos + self.path.position_at(end_time_min);
        let mut curr_cursor_pos = stacked_pos;
        let mut lazy_travel_dist = 0.0;

        for (curr_movement_obj, i) in nested_objects.iter().zip(1..) {
            let mut curr_movement = curr_movement_obj.pos + stack_offset - curr_cursor_pos;
            let mut curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            let mut required_movement = assumed_slider_radius;

            if i == nested_objects.len() {
                let lazy_movement = lazy_end_pos - curr_cursor_pos;

                if lazy_movement.length() < curr_movement.length() {
                    curr_movement = lazy_movement;
                }

                curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            } else if curr_movement_obj.is_repeat() {
                required_movement = normalized_radius;
            }

            if curr_movement_len > required_movement {
                curr_cursor_pos += curr_movement
                    * ((curr_movement_len - required_movement) / curr_movement_len) as f32;
                curr_movement_len *= (curr_movement_len - required_movement) / curr_movement_len;
                lazy_travel_dist += curr_movement_len;
            }

            if i == nested_objects.len() {
                lazy_end_pos = curr_cursor_pos;
            }
        }

        self.lazy_end_pos = lazy_end_pos;
        self.lazy_travel_dist = lazy_travel_dist;
    }
}

#[derive(Clone, Debug)]
pub struct NestedSliderObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedSliderObjectKind,
}

impl NestedSliderObject {
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Repeat)
    }

    pub const fn is_tick(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Tick)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum NestedSliderObjectKind {
    Repeat,
    Tail,
    Tick,
}
