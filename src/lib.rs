//! Difficulty and performance calculation for [osu!droid] and osu!standard.
//!
//! Both rulesets share the beatmap model, object conversion and the strain
//! framework. osu!droid rates aim, tap, rhythm, flashlight and visual
//! difficulty and estimates the player's hit deviation for performance.
//!
//! # Usage
//!
//! ```no_run
//! use rosu_droid_pp::{Beatmap, Difficulty, droid::DroidPerformance};
//!
//! let map = Beatmap::from_path("./resources/droid_fixture.osu").unwrap();
//!
//! // Difficulty attributes can be reused for multiple scores
//! let diff_attrs = Difficulty::new()
//!     .mods(8 + 64) // HDDT
//!     .calculate_droid(&map)
//!     .unwrap();
//!
//! println!("Stars: {}", diff_attrs.stars);
//!
//! let perf_attrs = DroidPerformance::new(diff_attrs)
//!     .mods(8 + 64)
//!     .combo(1234)
//!     .misses(2)
//!     .accuracy(98.7)
//!     .calculate()
//!     .unwrap();
//!
//! println!("PP: {} | Tap deviation: {}", perf_attrs.pp, perf_attrs.tap_deviation);
//! ```
//!
//! # Features
//!
//! | Flag      | Description |
//! | --------- | ----------- |
//! | `default` | No features enabled |
//! | `tracing` | Calculations emit `tracing` debug events and skipped hit objects during decoding are logged |
//!
//! [osu!droid]: https://osudroid.moe

#![deny(rustdoc::broken_intra_doc_links, rustdoc::missing_crate_level_docs)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::missing_panics_doc
)]

#[doc(inline)]
pub use self::{
    any::{Difficulty, HitResultPriority, ScoreState},
    model::{
        beatmap::{Beatmap, BeatmapAttributes, BeatmapAttributesBuilder, ParseBeatmapError},
        mode::{ConvertError, GameMode, IGameMode},
        mods::{GameMods, ModCapabilities},
    },
};

/// Types for calculations of any ruleset.
pub mod any;

/// Types for osu!droid calculations.
pub mod droid;

/// Types for osu!standard calculations.
pub mod osu;

/// Types used in and around this crate.
pub mod model;

mod util;
