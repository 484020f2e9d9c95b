pub use self::{
    aim::AimEvaluator, flashlight::FlashlightEvaluator, rhythm::RhythmEvaluator,
    tap::TapEvaluator, visual::VisualEvaluator,
};

mod aim;
mod flashlight;
mod rhythm;
mod tap;
mod visual;
