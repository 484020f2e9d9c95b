use std::cmp;

use crate::{
    any::difficulty::{
        skills::{difficulty_to_performance, StrainSkill},
        Difficulty,
    },
    model::{
        beatmap::{Beatmap, BeatmapAttributes},
        mode::{ConvertError, Ruleset},
        mods::ModCapabilities,
    },
    osu::{
        attributes::OsuDifficultyAttributes,
        convert::{convert_objects, ObjectCounts},
        object::OsuObject,
        performance::PERFORMANCE_BASE_MULTIPLIER,
    },
};

use self::{
    object::OsuDifficultyObject, rating::OsuRatingCalculator, scaling_factor::ScalingFactor,
    skills::{flashlight::Flashlight, OsuSkills},
};

pub mod evaluators;
pub mod object;
pub mod rating;
pub mod scaling_factor;
pub mod skills;

const STAR_RATING_MULTIPLIER: f64 = 0.0265;

const HD_FADE_IN_DURATION_MULTIPLIER: f64 = 0.4;
const HD_FADE_OUT_DURATION_MULTIPLIER: f64 = 0.3;

const PREEMPT_MIN: f64 = 450.0;
const FADE_IN_DURATION: f64 = 400.0;

pub fn difficulty(
    difficulty: &Difficulty,
    map: &Beatmap,
) -> Result<OsuDifficultyAttributes, ConvertError> {
    map.check_mode()?;

    let DifficultyValues { skills, mut attrs } = DifficultyValues::calculate(difficulty, map);

    DifficultyValues::eval(&mut attrs, &difficulty.capabilities(), &skills);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        aim = attrs.aim,
        speed = attrs.speed,
        flashlight = attrs.flashlight,
        stars = attrs.stars,
        "Calculated osu!standard difficulty"
    );

    Ok(attrs)
}

/// Map attributes and derived timings that every part of the calculation
/// agrees on.
pub struct OsuDifficultySetup {
    pub scaling_factor: ScalingFactor,
    pub map_attrs: BeatmapAttributes,
    pub attrs: OsuDifficultyAttributes,
    /// Unadjusted preempt in milliseconds.
    pub time_preempt: f64,
    pub time_fade_in: f64,
}

impl OsuDifficultySetup {
    pub fn new(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let clock_rate = difficulty.get_clock_rate();

        let map_attrs = map
            .attributes()
            .ruleset(Ruleset::Osu)
            .difficulty(difficulty)
            .build();

        let scaling_factor = ScalingFactor::new(map_attrs.cs);

        let attrs = OsuDifficultyAttributes {
            ar: map_attrs.ar,
            od: map_attrs.od,
            hp: map_attrs.hp,
            great_hit_window: map_attrs.hit_windows.od_great,
            ok_hit_window: map_attrs.hit_windows.od_ok,
            meh_hit_window: map_attrs.hit_windows.od_meh,
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

/// Duration in which an object fades in, given its unadjusted preempt.
pub(crate) fn fade_in_duration(time_preempt: f64, hidden: bool) -> f64 {
    if hidden {
        time_preempt * HD_FADE_IN_DURATION_MULTIPLIER
    } else {
        FADE_IN_DURATION * (time_preempt / PREEMPT_MIN).min(1.0)
    }
}

pub struct DifficultyValues {
    pub skills: OsuSkills,
    pub attrs: OsuDifficultyAttributes,
}

impl DifficultyValues {
    pub fn calculate(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let caps = difficulty.capabilities();
        let take = difficulty.get_passed_objects();

        let OsuDifficultySetup {
            scaling_factor,
            map_attrs,
            mut attrs,
            time_preempt,
            time_fade_in,
        } = OsuDifficultySetup::new(difficulty, map);

        let mut counts = ObjectCounts::default();

        let osu_objects = convert_objects(
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
            clock_rate = attrs.clock_rate,
            "Starting osu!standard difficulty calculation"
        );

        let diff_objects = Self::create_difficulty_objects(
            &osu_objects,
            &scaling_factor,
            difficulty.get_clock_rate(),
        );

        let mut skills = OsuSkills::new(
            &caps,
            &scaling_factor,
            map_attrs.hit_windows.od_great,
            time_preempt,
            time_fade_in,
        );

        // The first hit object has no difficulty object
        let take_diff_objects = cmp::min(map.hit_objects.len(), take).saturating_sub(1);

        for hit_object in diff_objects.iter().take(take_diff_objects) {
            skills.process(hit_object, &diff_objects);
        }

        Self { skills, attrs }
    }

    /// Process the difficulty values and store the results in `attrs`.
    pub fn eval(attrs: &mut OsuDifficultyAttributes, caps: &ModCapabilities, skills: &OsuSkills) {
        let OsuSkills {
            aim,
            aim_no_sliders,
            speed,
            flashlight,
        } = skills;

        let aim_difficulty_value = aim.difficulty_value();
        let aim_difficult_strain_count = aim.count_top_weighted_strains(aim_difficulty_value);
        let difficult_sliders = aim.get_difficult_sliders();

        let aim_no_sliders_difficulty_value = aim_no_sliders.difficulty_value();

        let slider_factor = if aim_difficulty_value > 0.0 {
            OsuRatingCalculator::calculate_difficulty_rating(aim_no_sliders_difficulty_value)
                / OsuRatingCalculator::calculate_difficulty_rating(aim_difficulty_value)
        } else {
            1.0
        };

        let speed_difficulty_value = speed.difficulty_value();
        let speed_difficult_strain_count = speed.count_top_weighted_strains(speed_difficulty_value);

        let mechanical_difficulty_rating =
            calculate_mechanical_difficulty_rating(aim_difficulty_value, speed_difficulty_value);

        let rating_calculator = OsuRatingCalculator::new(
            caps,
            attrs.n_objects(),
            attrs.ar,
            attrs.od,
            mechanical_difficulty_rating,
            slider_factor,
        );

        let aim_rating = rating_calculator.compute_aim_rating(aim_difficulty_value);
        let speed_rating = rating_calculator.compute_speed_rating(speed_difficulty_value);

        let flashlight_rating = if caps.flashlight {
            rating_calculator.compute_flashlight_rating(flashlight.difficulty_value())
        } else {
            0.0
        };

        let base_performance = (difficulty_to_performance(aim_rating).powf(1.1)
            + difficulty_to_performance(speed_rating).powf(1.1)
            + Flashlight::difficulty_to_performance(flashlight_rating).powf(1.1))
        .powf(1.0 / 1.1);

        attrs.aim = aim_rating;
        attrs.aim_difficult_slider_count = difficult_sliders;
        attrs.speed = speed_rating;
        attrs.flashlight = flashlight_rating;
        attrs.slider_factor = slider_factor;
        attrs.aim_difficult_strain_count = aim_difficult_strain_count;
        attrs.speed_difficult_strain_count = speed_difficult_strain_count;
        attrs.speed_note_count = speed.relevant_note_count();
        attrs.stars = calculate_star_rating(base_performance);
    }

    pub fn create_difficulty_objects<'a>(
        osu_objects: &'a [OsuObject],
        scaling_factor: &ScalingFactor,
        clock_rate: f64,
    ) -> Vec<OsuDifficultyObject<'a>> {
        let mut osu_objects_iter = osu_objects.iter();

        let Some(mut last) = osu_objects_iter.next() else {
            return Vec::new();
        };

        let mut diff_objects = Vec::with_capacity(osu_objects_iter.len());

        for (idx, h) in osu_objects_iter.enumerate() {
            let last_diff = idx.checked_sub(1).and_then(|i| diff_objects.get(i));
            let last_last_diff = idx.checked_sub(2).and_then(|i| diff_objects.get(i));

            let diff_object = OsuDifficultyObject::new(
                h,
                last,
                last_diff,
                last_last_diff,
                clock_rate,
                idx,
                scaling_factor,
            );

            last = h;

            diff_objects.push(diff_object);
        }

        diff_objects
    }
}

/// Star rating of only the aim and speed skills, without mod adjustments.
fn calculate_mechanical_difficulty_rating(
    aim_difficulty_value: f64,
    speed_difficulty_value: f64,
) -> f64 {
    let aim_value = difficulty_to_performance(OsuRatingCalculator::calculate_difficulty_rating(
        aim_difficulty_value,
    ));
    let speed_value = difficulty_to_performance(OsuRatingCalculator::calculate_difficulty_rating(
        speed_difficulty_value,
    ));

    let total_value = (aim_value.powf(1.1) + speed_value.powf(1.1)).powf(1.0 / 1.1);

    calculate_star_rating(total_value)
}

fn calculate_star_rating(base_performance: f64) -> f64 {
    if base_performance <= 0.00001 {
        return 0.0;
    }

    PERFORMANCE_BASE_MULTIPLIER.cbrt()
        * STAR_RATING_MULTIPLIER
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
        assert!(calculate_star_rating(1.0) > 0.0);
    }

    #[test]
    fn empty_map_has_no_difficulty() {
        let attrs = difficulty(&Difficulty::new(), &Beatmap::default()).unwrap();

        assert!(attrs.stars.abs() < f64::EPSILON);
        assert_eq!(attrs.max_combo, 0);
        assert!((attrs.slider_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn faster_streams_are_harder() {
        let slow = difficulty(&Difficulty::new(), &stream(64, 200.0)).unwrap();
        let fast = difficulty(&Difficulty::new(), &stream(64, 100.0)).unwrap();

        assert!(fast.speed > slow.speed, "{} <= {}", fast.speed, slow.speed);
        assert!(fast.stars > slow.stars);
        assert_eq!(fast.n_circles, 64);
    }

    #[test]
    fn passed_objects_limit_the_calculation() {
        let map = stream(64, 150.0);

        let full = difficulty(&Difficulty::new(), &map).unwrap();
        let partial = difficulty(&Difficulty::new().passed_objects(16), &map).unwrap();

        assert_eq!(partial.n_circles, 16);
        assert!(partial.stars <= full.stars);
    }

    #[test]
    fn other_modes_are_rejected() {
        let map = Beatmap {
            mode: rosu_map::section::general::GameMode::Taiko,
            ..Default::default()
        };

        assert!(difficulty(&Difficulty::new(), &map).is_err());
    }
}
