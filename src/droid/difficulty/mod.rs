use std::cmp;

use crate::{
    any::difficulty::{
        skills::{difficulty_to_performance, StrainSkill},
        Difficulty,
    },
    droid::attributes::DroidDifficultyAttributes,
    model::{
        beatmap::{Beatmap, BeatmapAttributes},
        mode::{ConvertError, Ruleset},
        mods::ModCapabilities,
    },
    osu::{
        convert::{convert_objects, ObjectCounts},
        difficulty::{fade_in_duration, scaling_factor::ScalingFactor},
        object::OsuObject,
    },
};

use self::{
    object::DroidDifficultyObject,
    skills::{tap::Tap, DroidSkills},
};

pub mod evaluators;
pub mod object;
pub mod skills;

const DIFFICULTY_MULTIPLIER: f64 = 0.18;
const STAR_RATING_MULTIPLIER: f64 = 0.027;

pub fn difficulty(
    difficulty: &Difficulty,
    map: &Beatmap,
) -> Result<DroidDifficultyAttributes, ConvertError> {
    map.check_mode()?;

    let caps = difficulty.capabilities();
    let values = DifficultyValues::calculate(difficulty, map);
    let DifficultyValues {
        skills,
        capped_tap_difficulty,
        mut attrs,
    } = values;

    DifficultyValues::eval(&mut attrs, &caps, &skills, capped_tap_difficulty);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        aim = attrs.aim,
        tap = attrs.tap,
        rhythm = attrs.rhythm,
        flashlight = attrs.flashlight,
        visual = attrs.visual,
        stars = attrs.stars,
        "Calculated osu!droid difficulty"
    );

    Ok(attrs)
}

/// Map attributes and derived timings of an osu!droid calculation.
pub struct DroidDifficultySetup {
    pub scaling_factor: ScalingFactor,
    pub map_attrs: BeatmapAttributes,
    pub attrs: DroidDifficultyAttributes,
    /// Unadjusted preempt in milliseconds.
    pub time_preempt: f64,
    pub time_fade_in: f64,
}

impl DroidDifficultySetup {
    pub fn new(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let clock_rate = difficulty.get_clock_rate();

        let map_attrs = map
            .attributes()
            .ruleset(Ruleset::Droid)
            .difficulty(difficulty)
            .build();

        let scaling_factor = ScalingFactor::droid(map_attrs.cs);

        let attrs = DroidDifficultyAttributes {
            approach_rate: map_attrs.ar,
            overall_difficulty: map_attrs.od,
            great_hit_window: map_attrs.hit_windows.od_great,
            ok_hit_window: map_attrs.hit_windows.od_ok,
            meh_hit_window: map_attrs.hit_windows.od_meh,
            vibro_factor: 1.0,
            clock_rate,
            mods: difficulty.get_mods().clone(),
            ..Default::default()
        };

        let time_preempt = f64::from((map_attrs.hit_windows.ar * clock_rate) as f32);
        let time_fade_in = fade_in_duration(time_preempt, difficulty.get_mods().hd());

        Self {
            scaling_factor,
            map_attrs,
            attrs,
            time_preempt,
            time_fade_in,
        }
    }
}

pub struct DifficultyValues {
    pub skills: DroidSkills,
    /// Tap difficulty with strain times capped at the average speed delta
    /// time.
    pub capped_tap_difficulty: f64,
    pub attrs: DroidDifficultyAttributes,
}

impl DifficultyValues {
    pub fn calculate(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let caps = difficulty.capabilities();
        let take = difficulty.get_passed_objects();
        let clock_rate = difficulty.get_clock_rate();

        let DroidDifficultySetup {
            scaling_factor,
            map_attrs,
            mut attrs,
            time_preempt,
            time_fade_in,
        } = DroidDifficultySetup::new(difficulty, map);

        let mut counts = ObjectCounts::default();

        let droid_objects = convert_objects(
            map,
            &scaling_factor,
            difficulty.get_mods().reflection(),
            time_preempt,
            take,
            &mut counts,
        );

        attrs.n_circles = counts.n_circles;
        attrs.n_sliders = counts.n_sliders;
        attrs.n_spinners = counts.n_spinners;
        attrs.n_large_ticks = counts.n_large_ticks;
        attrs.max_combo = counts.max_combo;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            n_objects = counts.n_objects(),
            clock_rate,
            "Starting osu!droid difficulty calculation"
        );

        let diff_objects = Self::create_difficulty_objects(
            &droid_objects,
            &scaling_factor,
            clock_rate,
            map_attrs.hit_windows.ar,
        );

        let great_window = map_attrs.hit_windows.od_great;

        let mut skills = DroidSkills::new(
            &caps,
            scaling_factor.radius,
            great_window,
            time_preempt,
            time_fade_in,
        );

        let take_diff_objects = cmp::min(diff_objects.len(), take);

        // The first object has no predecessor to strain from
        let processed = diff_objects.get(1..take_diff_objects).unwrap_or_default();

        for hit_object in processed {
            skills.process(hit_object, &diff_objects);
        }

        Self::eval_saved_strains(&mut attrs, processed);

        let capped_tap_difficulty = if caps.relax {
            0.0
        } else {
            let mut capped_tap = Tap::new(
                great_window,
                true,
                Some(attrs.average_speed_delta_time),
            );

            for hit_object in processed {
                capped_tap.process(hit_object, &diff_objects);
            }

            capped_tap.difficulty_value()
        };

        Self {
            skills,
            capped_tap_difficulty,
            attrs,
        }
    }

    /// Process the difficulty values and store the results in `attrs`.
    pub fn eval(
        attrs: &mut DroidDifficultyAttributes,
        caps: &ModCapabilities,
        skills: &DroidSkills,
        capped_tap_difficulty: f64,
    ) {
        let DroidSkills {
            aim,
            aim_no_sliders,
            rhythm,
            tap,
            flashlight,
            visual,
            ..
        } = skills;

        let aim_rating = calculate_rating(aim.difficulty_value());
        let aim_no_sliders_rating = calculate_rating(aim_no_sliders.difficulty_value());

        let slider_factor = if aim_rating > 0.0 {
            aim_no_sliders_rating / aim_rating
        } else {
            1.0
        };

        let flashlight_rating = calculate_rating(flashlight.difficulty_value());

        let (tap_rating, rhythm_rating, visual_rating) = if caps.relax {
            (0.0, 0.0, 0.0)
        } else {
            (
                calculate_rating(tap.difficulty_value()),
                calculate_rating(rhythm.difficulty_value()),
                calculate_rating(visual.difficulty_value()),
            )
        };

        let vibro_factor = if tap_rating > 0.0 {
            calculate_rating(capped_tap_difficulty) / tap_rating
        } else {
            1.0
        };

        let aim_performance = difficulty_to_performance(aim_rating.powf(0.8));
        let tap_performance = difficulty_to_performance(tap_rating);

        let flashlight_performance = if caps.flashlight {
            flashlight_rating.powf(1.6) * 25.0
        } else {
            0.0
        };

        let visual_performance = visual_rating.powf(1.6) * 22.5;

        let base_performance = (aim_performance.powf(1.1)
            + tap_performance.powf(1.1)
            + flashlight_performance.powf(1.1)
            + visual_performance.powf(1.1))
        .powf(1.0 / 1.1);

        attrs.aim = aim_rating;
        attrs.tap = tap_rating;
        attrs.rhythm = rhythm_rating;
        attrs.flashlight = flashlight_rating;
        attrs.visual = visual_rating;
        attrs.slider_factor = slider_factor;
        attrs.vibro_factor = vibro_factor;
        attrs.stars = calculate_star_rating(base_performance);
    }

    /// Store the counts derived from the strains each skill saved on the
    /// processed objects.
    ///
    /// Skills that were skipped, e.g. tap under relax, left their strains at
    /// zero so their counts are zero as well.
    fn eval_saved_strains(
        attrs: &mut DroidDifficultyAttributes,
        processed: &[DroidDifficultyObject<'_>],
    ) {
        attrs.aim_difficult_slider_count = skills::difficult_slider_count(processed);
        attrs.aim_difficult_strain_count =
            skills::difficult_strain_count(processed, |h| h.aim_strain_with_sliders.get());
        attrs.tap_difficult_strain_count =
            skills::difficult_strain_count(processed, |h| h.tap_strain.get());
        attrs.flashlight_difficult_strain_count =
            skills::difficult_strain_count(processed, |h| h.flashlight_strain.get());
        attrs.visual_difficult_strain_count =
            skills::difficult_strain_count(processed, |h| h.visual_strain.get());
        attrs.speed_note_count = skills::relevant_note_count(processed);
        attrs.average_speed_delta_time = skills::relevant_delta_time(processed);
    }

    /// One difficulty object per hit object, including the first one.
    pub fn create_difficulty_objects<'a>(
        droid_objects: &'a [OsuObject],
        scaling_factor: &ScalingFactor,
        clock_rate: f64,
        time_preempt: f64,
    ) -> Vec<DroidDifficultyObject<'a>> {
        let mut diff_objects: Vec<DroidDifficultyObject<'a>> =
            Vec::with_capacity(droid_objects.len());

        for (idx, h) in droid_objects.iter().enumerate() {
            let last = idx.checked_sub(1).and_then(|i| droid_objects.get(i));
            let last_diff = idx.checked_sub(1).and_then(|i| diff_objects.get(i));
            let last_last_diff = idx.checked_sub(2).and_then(|i| diff_objects.get(i));

            let diff_object = DroidDifficultyObject::new(
                h,
                last,
                last_diff,
                last_last_diff,
                clock_rate,
                idx,
                scaling_factor,
            );

            diff_objects.push(diff_object);
        }

        for i in 0..diff_objects.len() {
            let (head, following) = diff_objects.split_at_mut(i + 1);

            if let Some(curr) = head.last_mut() {
                curr.compute_visibility(following, time_preempt);
            }
        }

        diff_objects
    }
}

fn calculate_rating(difficulty_value: f64) -> f64 {
    difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER
}

fn calculate_star_rating(base_performance: f64) -> f64 {
    if base_performance <= 0.00001 {
        return 0.0;
    }

    STAR_RATING_MULTIPLIER
        * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
}

#[cfg(test)]
mod tests {
    use rosu_map::util::Pos;

    use crate::model::hit_object::{HitObject, HitObjectKind};

    use super::*;

    fn stream(n: usize, spacing: f64) -> Beatmap {
        let hit_objects = (0..n)
            .map(|i| HitObject {
                pos: Pos::new(if i % 2 == 0 { 100.0 } else { 300.0 }, 192.0),
                start_time: 1000.0 + i as f64 * spacing,
                kind: HitObjectKind::Circle,
            })
            .collect();

        Beatmap {
            hit_objects,
            ..Default::default()
        }
    }

    #[test]
    fn star_rating_floor() {
        assert!(calculate_star_rating(0.0).abs() < f64::EPSILON);
        assert!(calculate_star_rating(1e-6).abs() < f64::EPSILON);
        assert!(calculate_star_rating(1.0) > 0.0);
    }

    #[test]
    fn empty_map_has_no_difficulty() {
        let attrs = difficulty(&Difficulty::new(), &Beatmap::default()).unwrap();

        assert!(attrs.stars.abs() < f64::EPSILON);
        assert!(attrs.aim.abs() < f64::EPSILON);
        assert!(attrs.tap.abs() < f64::EPSILON);
        assert_eq!(attrs.max_combo, 0);
        assert!((attrs.vibro_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn faster_streams_are_harder() {
        let slow = difficulty(&Difficulty::new(), &stream(64, 200.0)).unwrap();
        let fast = difficulty(&Difficulty::new(), &stream(64, 100.0)).unwrap();

        assert!(fast.tap > slow.tap, "{} <= {}", fast.tap, slow.tap);
        assert!(fast.stars > slow.stars);
        assert_eq!(fast.n_circles, 64);
    }

    #[test]
    fn relax_zeroes_tapping_skills() {
        let attrs = difficulty(&Difficulty::new().mods(128), &stream(64, 100.0)).unwrap();

        assert!(attrs.tap.abs() < f64::EPSILON);
        assert!(attrs.rhythm.abs() < f64::EPSILON);
        assert!(attrs.visual.abs() < f64::EPSILON);
        assert!(attrs.aim > 0.0);
    }

    #[test]
    fn strain_counts_follow_the_processed_objects() {
        let map = stream(64, 120.0);

        let full = difficulty(&Difficulty::new(), &map).unwrap();
        let partial = difficulty(&Difficulty::new().passed_objects(16), &map).unwrap();
        let relax = difficulty(&Difficulty::new().mods(128), &map).unwrap();

        assert!(full.tap_difficult_strain_count > 0.0);
        assert!(full.tap_difficult_strain_count <= 63.0);
        assert!(full.visual_difficult_strain_count > 0.0);
        assert!(full.flashlight_difficult_strain_count > 0.0);
        assert!(partial.aim_difficult_strain_count < full.aim_difficult_strain_count);
        assert!(partial.speed_note_count < full.speed_note_count);

        assert!(relax.tap_difficult_strain_count.abs() < f64::EPSILON);
        assert!(relax.speed_note_count.abs() < f64::EPSILON);
        assert!(relax.aim_difficult_strain_count > 0.0);
    }

    #[test]
    fn flashlight_is_rated_without_the_mod() {
        let attrs = difficulty(&Difficulty::new(), &stream(64, 150.0)).unwrap();

        assert!(attrs.flashlight > 0.0);
    }

    #[test]
    fn vibro_factor_is_a_ratio() {
        let attrs = difficulty(&Difficulty::new(), &stream(128, 90.0)).unwrap();

        assert!(attrs.vibro_factor > 0.0);
        assert!(attrs.vibro_factor <= 1.0 + 1e-9, "{}", attrs.vibro_factor);
        assert!(attrs.average_speed_delta_time > 0.0);
    }

    #[test]
    fn passed_objects_limit_the_calculation() {
        let map = stream(64, 150.0);

        let full = difficulty(&Difficulty::new(), &map).unwrap();
        let partial = difficulty(&Difficulty::new().passed_objects(16), &map).unwrap();

        assert_eq!(partial.n_circles, 16);
        assert_eq!(partial.max_combo, 16);
        assert!(partial.stars <= full.stars);
    }

    #[test]
    fn other_modes_are_rejected() {
        let map = Beatmap {
            mode: rosu_map::section::general::GameMode::Mania,
            ..Default::default()
        };

        assert!(difficulty(&Difficulty::new(), &map).is_err());
    }

    #[test]
    fn double_time_is_harder() {
        let map = stream(64, 150.0);

        let nomod = difficulty(&Difficulty::new(), &map).unwrap();
        let dt = difficulty(&Difficulty::new().mods(64), &map).unwrap();

        assert!(dt.stars > nomod.stars);
        assert!(dt.great_hit_window < nomod.great_hit_window);
    }
}
