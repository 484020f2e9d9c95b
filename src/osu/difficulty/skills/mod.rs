use crate::{
    any::difficulty::skills::StrainSkill,
    model::mods::ModCapabilities,
    osu::difficulty::{object::OsuDifficultyObject, scaling_factor::ScalingFactor},
};

use self::{aim::Aim, flashlight::Flashlight, speed::Speed};

pub mod aim;
pub mod flashlight;
pub mod speed;

const REDUCED_SECTION_COUNT: usize = 10;
const REDUCED_STRAIN_BASELINE: f64 = 0.75;
const DECAY_WEIGHT: f64 = 0.9;

pub struct OsuSkills {
    pub aim: Aim,
    pub aim_no_sliders: Aim,
    pub speed: Speed,
    pub flashlight: Flashlight,
}

impl OsuSkills {
    pub fn new(
        caps: &ModCapabilities,
        scaling_factor: &ScalingFactor,
        great_hit_window: f64,
        time_preempt: f64,
        time_fade_in: f64,
    ) -> Self {
        Self {
            aim: Aim::new(true),
            aim_no_sliders: Aim::new(false),
            speed: Speed::new(great_hit_window, caps.autopilot),
            flashlight: Flashlight::new(
                caps.hidden,
                scaling_factor.radius,
                time_preempt,
                time_fade_in,
            ),
        }
    }

    pub fn process<'a>(
        &mut self,
        curr: &OsuDifficultyObject<'a>,
        diff_objects: &[OsuDifficultyObject<'a>],
    ) {
        self.aim.process(curr, diff_objects);
        self.aim_no_sliders.process(curr, diff_objects);
        self.speed.process(curr, diff_objects);
        self.flashlight.process(curr, diff_objects);
    }
}
