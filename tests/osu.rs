use proptest::prelude::*;
use rosu_mods::GameModsIntermode;
use rosu_droid_pp::{
    osu::{CacheableOsuDifficultyAttributes, OsuDifficultyAttributes, OsuPerformance},
    Beatmap, Difficulty, HitResultPriority,
};

use self::common::*;

mod common;

#[test]
fn difficulty_is_deterministic() {
    let map = mixed();

    let a = Difficulty::new().mods(16).calculate_osu(&map).unwrap();
    let b = Difficulty::new().mods(16).calculate_osu(&map).unwrap();

    assert_eq!(a, b);
}

#[test]
fn rulesets_share_object_counts() {
    let map = mixed();

    let osu = Difficulty::new().calculate_osu(&map).unwrap();
    let droid = Difficulty::new().calculate_droid(&map).unwrap();

    assert_eq!(osu.n_objects(), droid.n_objects());
    assert_eq!(osu.max_combo, droid.max_combo);
    assert!(osu.stars > 0.0);
}

#[test]
fn flashlight_needs_the_mod() {
    let map = mixed();

    let nomod = Difficulty::new().calculate_osu(&map).unwrap();
    let fl = Difficulty::new().mods(1024).calculate_osu(&map).unwrap();

    assert_eq!(nomod.flashlight, 0.0);
    assert!(fl.flashlight > 0.0);
}

#[test]
fn cacheable_attributes_survive_json() {
    let attrs = Difficulty::new()
        .mods(64)
        .calculate_osu(&stream(48, 120.0))
        .unwrap();

    let json = serde_json::to_string(&attrs.to_cacheable()).unwrap();
    let cached: CacheableOsuDifficultyAttributes = serde_json::from_str(&json).unwrap();

    assert_eq!(OsuDifficultyAttributes::from(cached), attrs);
}

#[test]
fn cacheable_attributes_keep_intermode_mods() {
    let hddt = GameModsIntermode::from_acronyms("HDDT");
    let attrs = Difficulty::new()
        .mods(&hddt)
        .calculate_osu(&stream(48, 120.0))
        .unwrap();

    let cacheable = attrs.to_cacheable();
    assert_eq!(cacheable.mods, "DTHD");

    let json = serde_json::to_string(&cacheable).unwrap();
    let cached: CacheableOsuDifficultyAttributes = serde_json::from_str(&json).unwrap();
    let restored = OsuDifficultyAttributes::from(cached);

    assert_eq!(restored.mods, attrs.mods);
    assert_eq!(restored.mods.intermode(), hddt);
    assert_eq!(restored, attrs);
}

#[test]
fn worst_case_priority_lowers_pp() {
    let attrs = Difficulty::new().calculate_osu(&mixed()).unwrap();

    let best = OsuPerformance::new(attrs.clone())
        .accuracy(95.0)
        .hitresult_priority(HitResultPriority::BestCase)
        .calculate()
        .unwrap();

    let worst = OsuPerformance::new(attrs)
        .accuracy(95.0)
        .hitresult_priority(HitResultPriority::WorstCase)
        .calculate()
        .unwrap();

    assert!(worst.pp <= best.pp);
}

#[test]
fn empty_map_gives_zeros() {
    let perf = OsuPerformance::new(Beatmap::default()).calculate().unwrap();

    assert_eq!(perf.pp, 0.0);
    assert_eq!(perf.difficulty.stars, 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn more_misses_never_increase_pp(misses in 0_u32..20, extra in 1_u32..10) {
        let map = stream(200, 150.0);
        let attrs = Difficulty::new().calculate_osu(&map).unwrap();

        let fewer = OsuPerformance::new(attrs.clone())
            .misses(misses)
            .calculate()
            .unwrap();

        let more = OsuPerformance::new(attrs)
            .misses(misses + extra)
            .calculate()
            .unwrap();

        prop_assert!(more.pp <= fewer.pp, "{} > {}", more.pp, fewer.pp);
    }
}
