use rosu_map::util::Pos;

use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        rhythm::RhythmObject,
    },
    osu::object::{OsuObject, OsuObjectKind},
};

use super::{scaling_factor::ScalingFactor, HD_FADE_IN_DURATION_MULTIPLIER, HD_FADE_OUT_DURATION_MULTIPLIER};

pub struct OsuDifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a OsuObject,
    pub start_time: f64,
    pub delta_time: f64,

    pub strain_time: f64,
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub angle: Option<f64>,

    pub small_circle_bonus: f64,
}

impl<'a> OsuDifficultyObject<'a> {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    pub const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    pub const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    pub fn new(
        hit_object: &'a OsuObject,
        last_object: &'a OsuObject,
        last_diff_obj: Option<&OsuDifficultyObject<'_>>,
        last_last_diff_obj: Option<&OsuDifficultyObject<'_>>,
        clock_rate: f64,
        idx: usize,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let delta_time = (hit_object.start_time - last_object.start_time) / clock_rate;
        let start_time = hit_object.start_time / clock_rate;

        let strain_time = delta_time.max(Self::MIN_DELTA_TIME);
        let small_circle_bonus = (1.0 + (30.0 - scaling_factor.radius) / 40.0).max(1.0);

        let mut this = Self {
            idx,
            base: hit_object,
            start_time,
            delta_time,
            strain_time,
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            min_jump_time: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
            small_circle_bonus,
        };

        this.set_distances(
            last_object,
            last_diff_obj,
            last_last_diff_obj,
            clock_rate,
            scaling_factor,
        );

        this
    }

    /// Opacity of this object at `time`, both in unadjusted milliseconds.
    pub fn opacity_at(&self, time: f64, hidden: bool, time_preempt: f64, time_fade_in: f64) -> f64 {
        opacity_at(self.base.start_time, time, hidden, time_preempt, time_fade_in)
    }

    pub fn get_doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        let hit_window = if self.base.is_spinner() {
            0.0
        } else {
            hit_window
        };

        doubletapness(self.delta_time, next.delta_time, hit_window)
    }

    fn set_distances(
        &mut self,
        last_object: &OsuObject,
        last_diff_obj: Option<&OsuDifficultyObject<'_>>,
        last_last_diff_obj: Option<&OsuDifficultyObject<'_>>,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) {
        if let OsuObjectKind::Slider(ref slider) = self.base.kind {
            self.travel_dist = slider.lazy_travel_dist
                * (1.0 + slider.repeat_count() as f64 / 2.5).powf(1.0 / 2.5);

            self.travel_time = (slider.lazy_travel_time / clock_rate).max(Self::MIN_DELTA_TIME);
        }

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

/// How likely the object with delta time `curr_delta_time` gets tapped
/// together with its successor, in `[0, 1]`.
pub fn doubletapness(curr_delta_time: f64, next_delta_time: f64, hit_window: f64) -> f64 {
    let curr_delta_time = curr_delta_time.max(1.0);
    let next_delta_time = next_delta_time.max(1.0);
    let delta_diff = (next_delta_time - curr_delta_time).abs();
    let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
    let window_ratio = (curr_delta_time / hit_window).min(1.0).powf(2.0);

    1.0 - speed_ratio.powf(1.0 - window_ratio)
}

/// Absolute angle between the movement into the previous object and the
/// movement out of it.
pub fn angle_between(last_last_cursor: Pos, last_pos: Pos, last_cursor: Pos, curr_pos: Pos) -> f64 {
    let v1 = last_last_cursor - last_pos;
    let v2 = curr_pos - last_cursor;

    let dot = v1.dot(v2);
    let det = v1.x * v2.y - v1.y * v2.x;

    f64::from(det).atan2(f64::from(dot)).abs()
}

/// Opacity of an object starting at `start_time` when looked at at `time`.
pub fn opacity_at(
    start_time: f64,
    time: f64,
    hidden: bool,
    time_preempt: f64,
    time_fade_in: f64,
) -> f64 {
    // Hit objects count as invisible once their start time has passed
    if time >= start_time {
        return 0.0;
    }

    let fade_in_start_time = start_time - time_preempt;

    if hidden {
        let fade_in_duration = time_preempt * HD_FADE_IN_DURATION_MULTIPLIER;
        let fade_out_start_time = fade_in_start_time + fade_in_duration;
        let fade_out_duration = time_preempt * HD_FADE_OUT_DURATION_MULTIPLIER;

        ((time - fade_in_start_time) / fade_in_duration)
            .clamp(0.0, 1.0)
            .min(1.0 - ((time - fade_out_start_time) / fade_out_duration).clamp(0.0, 1.0))
    } else {
        ((time - fade_in_start_time) / time_fade_in).clamp(0.0, 1.0)
    }
}

impl IDifficultyObject for OsuDifficultyObject<'_> {
    fn idx(&self) -> usize {
        self.idx
    }
}

impl HasStartTime for OsuDifficultyObject<'_> {
    fn start_time(&self) -> f64 {
        self.start_time
    }
}

impl RhythmObject for OsuDifficultyObject<'_> {
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
