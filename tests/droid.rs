use std::sync::OnceLock;

use proptest::prelude::*;
use rosu_mods::GameModsIntermode;
use rosu_droid_pp::{
    droid::{CacheableDroidDifficultyAttributes, DroidDifficultyAttributes, DroidPerformance},
    Beatmap, Difficulty, GameMode,
};

use self::common::*;

mod common;

fn mixed_attrs() -> &'static DroidDifficultyAttributes {
    static ATTRS: OnceLock<DroidDifficultyAttributes> = OnceLock::new();

    ATTRS.get_or_init(|| Difficulty::new().calculate_droid(&mixed()).unwrap())
}

#[test]
fn difficulty_is_deterministic() {
    let map = mixed();

    let a = Difficulty::new().mods(8 + 64).calculate_droid(&map).unwrap();
    let b = Difficulty::new().mods(8 + 64).calculate_droid(&map).unwrap();

    assert_eq!(a, b);
}

#[test]
fn mixed_map_counts() {
    let attrs = mixed_attrs();

    assert_eq!(attrs.n_circles, 56);
    assert_eq!(attrs.n_sliders, 16);
    assert_eq!(attrs.n_spinners, 1);
    assert!(attrs.max_combo > attrs.n_objects());
    assert!(attrs.aim > 0.0);
    assert!(attrs.tap > 0.0);
    assert!(attrs.rhythm > 0.0);
    assert!(attrs.visual > 0.0);
    assert!(attrs.slider_factor > 0.0 && attrs.slider_factor <= 1.0);
    assert!(attrs.stars > 0.0);
}

#[test]
fn relax_zeroes_tap_and_rhythm() {
    let attrs = Difficulty::new()
        .mods(128)
        .calculate_droid(&mixed())
        .unwrap();

    assert_eq!(attrs.tap, 0.0);
    assert_eq!(attrs.rhythm, 0.0);
    assert_eq!(attrs.visual, 0.0);
    assert!(attrs.aim > 0.0);
}

#[test]
fn empty_map_gives_zeros() {
    let map = Beatmap::default();

    let diff = Difficulty::new().calculate_droid(&map).unwrap();
    assert_eq!(diff.stars, 0.0);
    assert_eq!(diff.n_objects(), 0);

    let perf = DroidPerformance::new(&map).calculate().unwrap();
    assert_eq!(perf.pp, 0.0);
    assert!(perf.deviation.is_infinite());
}

#[test]
fn other_modes_are_rejected() {
    let map = Beatmap {
        mode: GameMode::Taiko,
        ..stream(8, 200.0)
    };

    assert!(Difficulty::new().calculate_droid(&map).is_err());
    assert!(DroidPerformance::new(&map).calculate().is_err());
}

#[test]
fn hard_rock_and_double_time_increase_stars() {
    let map = mixed();
    let nomod = mixed_attrs();

    let hr = Difficulty::new().mods(16).calculate_droid(&map).unwrap();
    let dt = Difficulty::new().mods(64).calculate_droid(&map).unwrap();

    assert!(hr.stars > nomod.stars);
    assert!(dt.stars > nomod.stars);
    assert!(dt.tap > nomod.tap);
}

#[test]
fn cacheable_attributes_survive_json() {
    let attrs = Difficulty::new()
        .mods(8 + 16)
        .calculate_droid(&mixed())
        .unwrap();

    let json = serde_json::to_string(&attrs.to_cacheable()).unwrap();
    let cached: CacheableDroidDifficultyAttributes = serde_json::from_str(&json).unwrap();

    assert_eq!(DroidDifficultyAttributes::from(cached), attrs);
}

#[test]
fn cacheable_attributes_keep_intermode_mods() {
    let hddt = GameModsIntermode::from_acronyms("HDDT");
    let attrs = Difficulty::new()
        .mods(&hddt)
        .calculate_droid(&mixed())
        .unwrap();

    let cacheable = attrs.to_cacheable();
    assert_eq!(cacheable.mods, "DTHD");

    let json = serde_json::to_string(&cacheable).unwrap();
    let cached: CacheableDroidDifficultyAttributes = serde_json::from_str(&json).unwrap();
    let restored = DroidDifficultyAttributes::from(cached);

    assert_eq!(restored.mods, attrs.mods);
    assert_eq!(restored.mods.intermode(), hddt);
    assert_eq!(restored, attrs);
}

#[test]
fn performance_from_map_matches_attributes() {
    let map = mixed();

    let from_map = DroidPerformance::new(&map)
        .accuracy(97.0)
        .misses(1)
        .calculate()
        .unwrap();

    let from_attrs = DroidPerformance::new(mixed_attrs().clone())
        .accuracy(97.0)
        .misses(1)
        .calculate()
        .unwrap();

    assert_eq!(from_map, from_attrs);
}

#[test]
fn infinite_deviation_zeroes_dependent_terms() {
    let perf = DroidPerformance::new(mixed_attrs().clone())
        .n300(0)
        .n100(0)
        .n50(0)
        .misses(mixed_attrs().n_objects())
        .calculate()
        .unwrap();

    assert!(perf.deviation.is_infinite());
    assert!(perf.tap_deviation.is_infinite());
    assert_eq!(perf.pp_aim, 0.0);
    assert_eq!(perf.pp_tap, 0.0);
    assert_eq!(perf.pp_accuracy, 0.0);
    assert_eq!(perf.pp_visual, 0.0);
    assert!(!perf.pp.is_nan());
}

#[test]
fn partial_play_is_easier() {
    let map = mixed();

    let full = DroidPerformance::new(&map).calculate().unwrap();
    let partial = DroidPerformance::new(&map)
        .passed_objects(30)
        .calculate()
        .unwrap();

    assert_eq!(partial.difficulty.n_objects(), 30);
    assert!(partial.pp < full.pp);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn more_misses_never_increase_pp(misses in 0_u32..20, extra in 1_u32..10) {
        let attrs = mixed_attrs();

        let fewer = DroidPerformance::new(attrs.clone())
            .misses(misses)
            .calculate()
            .unwrap();

        let more = DroidPerformance::new(attrs.clone())
            .misses(misses + extra)
            .calculate()
            .unwrap();

        prop_assert!(more.pp <= fewer.pp, "{} > {}", more.pp, fewer.pp);
    }

    #[test]
    fn lower_combo_never_increases_pp(combo in 1_u32..100, drop in 1_u32..50) {
        let attrs = mixed_attrs();
        let combo = combo.min(attrs.max_combo);
        let lower = combo.saturating_sub(drop).max(1);

        let high = DroidPerformance::new(attrs.clone())
            .combo(combo)
            .n100(3)
            .calculate()
            .unwrap();

        let low = DroidPerformance::new(attrs.clone())
            .combo(lower)
            .n100(3)
            .calculate()
            .unwrap();

        prop_assert!(low.pp <= high.pp, "{} > {}", low.pp, high.pp);
    }

    #[test]
    fn performance_is_finite(acc in 0.0..=100.0_f64, misses in 0_u32..80) {
        let perf = DroidPerformance::new(mixed_attrs().clone())
            .accuracy(acc)
            .misses(misses)
            .calculate()
            .unwrap();

        prop_assert!(perf.pp.is_finite());
        prop_assert!(perf.pp >= 0.0);
    }
}

/// Ratings of the reference map with object counts, hit windows, and speed
/// statistics that are consistent with its performance values.
fn fixture_attrs() -> DroidDifficultyAttributes {
    DroidDifficultyAttributes {
        aim: 2.4814071238381215,
        tap: 1.4997744292829895,
        rhythm: 0.8775324539140502,
        flashlight: 1.5206253436039583,
        visual: 0.7897655464962676,
        speed_note_count: 669.2498916772661,
        average_speed_delta_time: 120.0,
        vibro_factor: 0.95,
        slider_factor: 0.98,
        great_hit_window: 72.94213612852167,
        ok_hit_window: 130.5895148380289,
        meh_hit_window: 188.2368935475361,
        approach_rate: 9.0,
        overall_difficulty: 5.411572774295665,
        n_circles: 521,
        n_sliders: 390,
        n_spinners: 2,
        max_combo: 1500,
        clock_rate: 1.0,
        stars: 3.987460853080255,
        ..Default::default()
    }
}

#[test]
fn fixture_performance_from_attributes() {
    let perf = DroidPerformance::new(fixture_attrs()).calculate().unwrap();

    assert_eq_float(perf.pp_aim, 17.313250473522285, 1e-5);
    assert_eq_float(perf.pp_tap, 13.123766516437668, 1e-5);
    assert_eq_float(perf.pp, 65.00217965720257, 1e-5);
    assert_eq_float(perf.pp_tap / perf.pp_aim, 0.7580186, 1e-6);
}

#[test]
#[ignore = "requires resources/droid_fixture.osu"]
fn fixture_nomod() {
    let map = Beatmap::from_path(FIXTURE).unwrap();
    let attrs = Difficulty::new().calculate_droid(&map).unwrap();

    assert_eq_float(attrs.aim, 2.4814071238381215, 1e-5);
    assert_eq_float(attrs.tap, 1.4997744292829895, 1e-5);
    assert_eq_float(attrs.rhythm, 0.8775324539140502, 1e-5);
    assert_eq_float(attrs.flashlight, 1.5206253436039583, 1e-5);
    assert_eq_float(attrs.visual, 0.7897655464962676, 1e-5);
    assert_eq_float(attrs.stars, 3.987460853080255, 1e-6);
}

#[test]
#[ignore = "requires resources/droid_fixture.osu"]
fn fixture_double_time() {
    let map = Beatmap::from_path(FIXTURE).unwrap();
    let attrs = Difficulty::new().mods(64).calculate_droid(&map).unwrap();

    assert_eq_float(attrs.aim, 3.3905334356485666, 1e-5);
    assert_eq_float(attrs.stars, 5.123759461521921, 1e-6);
}

#[test]
#[ignore = "requires resources/droid_fixture.osu"]
fn fixture_performance() {
    assert!(fixture_exists());

    let map = Beatmap::from_path(FIXTURE).unwrap();
    let attrs = DroidPerformance::new(&map).calculate().unwrap();

    assert_eq_float(attrs.pp_aim, 17.313250473522285, 1e-5);
    assert_eq_float(attrs.pp_tap, 13.123766516437668, 1e-5);
    assert_eq_float(attrs.pp, 65.00217965720257, 1e-5);
}
