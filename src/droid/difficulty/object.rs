use std::cell::Cell;

use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        rhythm::RhythmObject,
    },
    osu::{
        difficulty::{
            object::{angle_between, doubletapness, opacity_at},
            scaling_factor::ScalingFactor,
        },
        object::{OsuObject, OsuObjectKind},
    },
};

pub struct DroidDifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a OsuObject,
    pub start_time: f64,
    pub end_time: f64,
    pub delta_time: f64,

    pub strain_time: f64,
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub angle: Option<f64>,

    /// Circle radius in osu!pixels.
    pub radius: f64,
    pub note_density: f64,
    pub overlapping_factor: f64,

    pub rhythm_multiplier: Cell<f64>,
    pub aim_strain_with_sliders: Cell<f64>,
    pub tap_strain: Cell<f64>,
    pub flashlight_strain: Cell<f64>,
    pub visual_strain: Cell<f64>,
}

impl<'a> DroidDifficultyObject<'a> {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    const OVERLAP_TIME_THRESHOLD: f64 = 5.0;

    pub fn new(
        hit_object: &'a OsuObject,
        last_object: Option<&'a OsuObject>,
        last_diff_obj: Option<&DroidDifficultyObject<'_>>,
        last_last_diff_obj: Option<&DroidDifficultyObject<'_>>,
        clock_rate: f64,
        idx: usize,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let start_time = hit_object.start_time / clock_rate;
        let end_time = hit_object.end_time() / clock_rate;

        let delta_time = last_object.map_or(0.0, |last| {
            (hit_object.start_time - last.start_time) / clock_rate
        });

        let mut this = Self {
            idx,
            base: hit_object,
            start_time,
            end_time,
            delta_time,
            strain_time: delta_time.max(Self::MIN_DELTA_TIME),
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            min_jump_time: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
            radius: scaling_factor.radius,
            note_density: 1.0,
            overlapping_factor: 0.0,
            rhythm_multiplier: Cell::new(1.0),
            aim_strain_with_sliders: Cell::new(0.0),
            tap_strain: Cell::new(0.0),
            flashlight_strain: Cell::new(0.0),
            visual_strain: Cell::new(0.0),
        };

        if let OsuObjectKind::Slider(ref slider) = hit_object.kind {
            this.travel_dist = slider.lazy_travel_dist
                * (1.0 + slider.repeat_count() as f64 / 2.5).powf(1.0 / 2.5);

            this.travel_time = (slider.lazy_travel_time / clock_rate).max(Self::MIN_DELTA_TIME);
        }

        if let Some(last_object) = last_object {
            this.set_distances(
                last_object,
                last_diff_obj,
                last_last_diff_obj,
                clock_rate,
                scaling_factor,
            );
        }

        this
    }

    /// Opacity of this object at `time`, both in unadjusted milliseconds.
    pub fn opacity_at(&self, time: f64, hidden: bool, time_preempt: f64, time_fade_in: f64) -> f64 {
        opacity_at(self.base.start_time, time, hidden, time_preempt, time_fade_in)
    }

    pub fn get_doubletapness(&self, next: Option<&Self>, great_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        let great_window = if self.base.is_spinner() {
            0.0
        } else {
            great_window
        };

        doubletapness(self.delta_time, next.delta_time, great_window)
    }

    /// Whether this object is effectively tapped together with its
    /// predecessor.
    pub fn is_overlapping(&self, consider_distance: bool, diff_objects: &[Self]) -> bool {
        if self.base.is_spinner() {
            return false;
        }

        let Some(prev) = self
            .previous(0, diff_objects)
            .filter(|prev| !prev.base.is_spinner())
        else {
            return false;
        };

        if self.delta_time >= Self::OVERLAP_TIME_THRESHOLD {
            return false;
        }

        if !consider_distance {
            return true;
        }

        let dist = (prev.base.stacked_end_pos() - self.base.stacked_pos()).length();

        f64::from(dist) <= 2.0 * self.radius
    }

    /// Compute note density and the overlapping factor from the objects
    /// that are visible while this one is hit.
    ///
    /// `time_preempt` must already be adjusted by the clock rate.
    pub fn compute_visibility(&mut self, following: &[Self], time_preempt: f64) {
        let mut note_density = 1.0;
        let mut overlapping_factor = 0.0;

        for next in following {
            let delta_time = next.start_time - self.start_time;

            if delta_time >= time_preempt {
                break;
            }

            note_density += 1.0 - delta_time / time_preempt;

            if next.base.is_spinner() || self.base.is_spinner() {
                continue;
            }

            let dist = f64::from((next.base.stacked_pos() - self.base.stacked_end_pos()).length());

            overlapping_factor += (1.0 - dist / (2.5 * self.radius)).max(0.0)
                * (7.5 / (1.0 + f64::exp(0.15 * (delta_time - 75.0))));
        }

        self.note_density = note_density;
        self.overlapping_factor = overlapping_factor;
    }

    fn set_distances(
        &mut self,
        last_object: &OsuObject,
        last_diff_obj: Option<&DroidDifficultyObject<'_>>,
        last_last_diff_obj: Option<&DroidDifficultyObject<'_>>,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) {
        if self.base.is_spinner() || last_object.is_spinner() {
            return;
        }

        let scaling_factor = scaling_factor.factor;
        let last_cursor_pos = last_object.lazy_end_pos();

        self.lazy_jump_dist = f64::from(
            (self.base.stacked_pos() * scaling_factor - last_cursor_pos * scaling_factor).length(),
        );
        self.min_jump_time = self.strain_time;
        self.min_jump_dist = self.lazy_jump_dist;

        if let OsuObjectKind::Slider(ref last_slider) = last_object.kind {
            let last_travel_time =
                (last_slider.lazy_travel_time / clock_rate).max(Self::MIN_DELTA_TIME);
            self.min_jump_time = (self.strain_time - last_travel_time).max(Self::MIN_DELTA_TIME);

            let tail_jump_dist =
                (last_object.stacked_end_pos() - self.base.stacked_pos()).length() * scaling_factor;

            let diff = f64::from(Self::MAX_SLIDER_RADIUS - Self::ASSUMED_SLIDER_RADIUS);
            let min = f64::from(tail_jump_dist - Self::MAX_SLIDER_RADIUS);
            self.min_jump_dist = (self.lazy_jump_dist - diff).min(min).max(0.0);
        }

        let Some(last_last_diff_obj) = last_last_diff_obj.filter(|_| last_diff_obj.is_some())
        else {
            return;
        };

        if !last_last_diff_obj.base.is_spinner() {
            self.angle = Some(angle_between(
                last_last_diff_obj.base.lazy_end_pos(),
                last_object.stacked_pos(),
                last_cursor_pos,
                self.base.stacked_pos(),
            ));
        }
    }
}

impl IDifficultyObject for DroidDifficultyObject<'_> {
    fn idx(&self) -> usize {
        self.idx
    }
}

impl HasStartTime for DroidDifficultyObject<'_> {
    fn start_time(&self) -> f64 {
        self.start_time
    }
}

impl RhythmObject for DroidDifficultyObject<'_> {
    fn delta_time(&self) -> f64 {
        self.delta_time
    }

    fn is_slider(&self) -> bool {
        self.base.is_slider()
    }

    fn doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        self.get_doubletapness(next, hit_window)
    }
}

#[cfg(test)]
mod tests {
    use rosu_map::util::Pos;

    use super::*;

    fn circle(x: f32, start_time: f64) -> OsuObject {
        OsuObject {
            pos: Pos::new(x, 192.0),
            start_time,
            stack_height: 0,
            stack_offset: Pos::default(),
            kind: OsuObjectKind::Circle,
        }
    }

    fn diff_objects(objects: &[OsuObject], time_preempt: f64) -> Vec<DroidDifficultyObject<'_>> {
        let scaling_factor = ScalingFactor::droid(4.0);
        let mut diff_objects: Vec<DroidDifficultyObject<'_>> = Vec::new();

        for (idx, h) in objects.iter().enumerate() {
            let last = idx.checked_sub(1).map(|i| &objects[i]);
            let last_diff = idx.checked_sub(1).and_then(|i| diff_objects.get(i));
            let last_last_diff = idx.checked_sub(2).and_then(|i| diff_objects.get(i));

            let diff_object = DroidDifficultyObject::new(
                h,
                last,
                last_diff,
                last_last_diff,
                1.0,
                idx,
                &scaling_factor,
            );

            diff_objects.push(diff_object);
        }

        for i in 0..diff_objects.len() {
            let (head, tail) = diff_objects.split_at_mut(i + 1);
            head[i].compute_visibility(tail, time_preempt);
        }

        diff_objects
    }

    #[test]
    fn first_object_has_no_movement() {
        let objects = [circle(100.0, 1000.0), circle(300.0, 1200.0)];
        let diff_objects = diff_objects(&objects, 600.0);

        assert!(diff_objects[0].delta_time.abs() < f64::EPSILON);
        assert!(diff_objects[0].lazy_jump_dist.abs() < f64::EPSILON);
        assert!(diff_objects[1].lazy_jump_dist > 0.0);
        assert!(diff_objects[1].angle.is_none());
    }

    #[test]
    fn simultaneous_close_objects_overlap() {
        let objects = [
            circle(100.0, 1000.0),
            circle(102.0, 1002.0),
            circle(400.0, 1004.0),
            circle(400.0, 1500.0),
        ];
        let diff_objects = diff_objects(&objects, 600.0);

        assert!(!diff_objects[0].is_overlapping(true, &diff_objects));
        assert!(diff_objects[1].is_overlapping(true, &diff_objects));
        assert!(!diff_objects[2].is_overlapping(true, &diff_objects));
        assert!(diff_objects[2].is_overlapping(false, &diff_objects));
        assert!(!diff_objects[3].is_overlapping(false, &diff_objects));
    }

    #[test]
    fn density_counts_visible_followers() {
        let objects = [
            circle(100.0, 1000.0),
            circle(200.0, 1300.0),
            circle(300.0, 2000.0),
        ];
        let diff_objects = diff_objects(&objects, 600.0);

        // Only the second object is visible, halfway into its fade
        assert!((diff_objects[0].note_density - 1.5).abs() < 1e-12);
        assert!((diff_objects[2].note_density - 1.0).abs() < 1e-12);
        assert!(diff_objects[0].overlapping_factor.abs() < 1e-12);
    }

    #[test]
    fn stacked_followers_raise_overlapping_factor() {
        let objects = [circle(100.0, 1000.0), circle(100.0, 1050.0)];
        let diff_objects = diff_objects(&objects, 600.0);

        assert!(diff_objects[0].overlapping_factor > 1.0);
    }
}
