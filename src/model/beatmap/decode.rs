use std::{
    cmp,
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

use rosu_map::{
    section::{
        difficulty::{Difficulty, DifficultyState, ParseDifficultyError},
        general::{GameMode, GeneralKey, ParseGameModeError},
        hit_objects::{HitObjectType, ParseHitObjectTypeError, PathControlPoint, PathType},
        timing_points::ControlPoint,
    },
    util::{KeyValue, ParseNumber, ParseNumberError, Pos, StrExt, MAX_PARSE_VALUE},
    DecodeBeatmap, DecodeState,
};

use crate::{
    model::{
        control_point::{difficulty_point_at, DifficultyPoint, TimingPoint},
        hit_object::{HitObject, HitObjectKind, Slider, Spinner},
    },
    util::float_ext::FloatExt,
};

use super::{Beatmap, DEFAULT_STACK_LENIENCY};

const MAX_COORDINATE_VALUE: i32 = 131_072;

/// The state of a [`Beatmap`] for [`DecodeBeatmap`].
pub struct BeatmapState {
    version: i32,
    stack_leniency: f32,
    mode: GameMode,
    difficulty: DifficultyState,
    timing_points: Vec<TimingPoint>,
    difficulty_points: Vec<DifficultyPoint>,
    hit_objects: Vec<HitObject>,

    pending_control_points_time: f64,
    pending_timing_point: Option<TimingPoint>,
    pending_difficulty_point: Option<DifficultyPoint>,

    curve_points: Vec<PathControlPoint>,
    vertices: Vec<PathControlPoint>,
}

impl BeatmapState {
    fn add_pending_point<P: Pending>(&mut self, time: f64, point: P, timing_change: bool) {
        if time.not_eq(self.pending_control_points_time) {
            self.flush_pending_points();
        }

        if timing_change {
            point.push_front(self);
        } else {
            point.push_back(self);
        }

        self.pending_control_points_time = time;
    }

    fn flush_pending_points(&mut self) {
        if let Some(point) = self.pending_timing_point.take() {
            self.add_control_point(point);
        }

        if let Some(point) = self.pending_difficulty_point.take() {
            self.add_control_point(point);
        }
    }

    fn add_control_point<P: ControlPoint<Self>>(&mut self, point: P) {
        if !point.check_already_existing(self) {
            point.add(self);
        }
    }

    /// Converts a slider's point string into [`PathControlPoint`]s.
    ///
    /// Every segment starts at a path type letter and extends to the next
    /// letter. All but the last segment also take the first point of the
    /// following segment as their end point.
    fn convert_path_str(&mut self, point_str: &str, offset: Pos) -> Result<(), ParseBeatmapError> {
        let tokens: Vec<&str> = point_str.split('|').collect();
        let mut segment_starts = vec![0];

        for (i, token) in tokens.iter().enumerate().skip(1) {
            let first_char = token
                .chars()
                .next()
                .ok_or(ParseBeatmapError::InvalidHitObjectLine)?;

            if first_char.is_ascii_alphabetic() {
                segment_starts.push(i);
            }
        }

        for (n, &start) in segment_starts.iter().enumerate() {
            let (end, end_point) = match segment_starts.get(n + 1) {
                Some(&next) => (next, tokens.get(next + 1).copied()),
                None => (tokens.len(), None),
            };

            self.convert_points(&tokens[start..end], end_point, n == 0, offset)?;
        }

        Ok(())
    }

    fn convert_points(
        &mut self,
        points: &[&str],
        end_point: Option<&str>,
        first: bool,
        offset: Pos,
    ) -> Result<(), ParseBeatmapError> {
        fn read_point(value: &str, start_pos: Pos) -> Result<PathControlPoint, ParseBeatmapError> {
            let mut coords = value
                .split(':')
                .map(|s| s.parse_with_limits(f64::from(MAX_COORDINATE_VALUE)));

            let (x, y) = coords
                .next()
                .zip(coords.next())
                .ok_or(ParseBeatmapError::InvalidHitObjectLine)?;

            let pos = Pos::new(x? as i32 as f32, y? as i32 as f32);

            Ok(PathControlPoint::new(pos - start_pos))
        }

        fn is_linear(p0: Pos, p1: Pos, p2: Pos) -> bool {
            ((p1.y - p0.y) * (p2.x - p0.x)).eq((p1.x - p0.x) * (p2.y - p0.y))
        }

        let mut path_type = points
            .first()
            .copied()
            .map(PathType::new_from_str)
            .ok_or(ParseBeatmapError::InvalidHitObjectLine)?;

        let end_point_len = usize::from(end_point.is_some());

        self.vertices.clear();

        if first {
            self.vertices.push(PathControlPoint::default());
        }

        for &point in points.iter().skip(1) {
            self.vertices.push(read_point(point, offset)?);
        }

        if let Some(end_point) = end_point {
            self.vertices.push(read_point(end_point, offset)?);
        }

        if path_type == PathType::PERFECT_CURVE {
            if let [a, b, c] = self.vertices.as_slice() {
                if is_linear(a.pos, b.pos, c.pos) {
                    path_type = PathType::LINEAR;
                }
            } else {
                path_type = PathType::BEZIER;
            }
        }

        let Some(head) = self.vertices.first_mut() else {
            return Err(ParseBeatmapError::InvalidHitObjectLine);
        };

        head.path_type = Some(path_type);

        // Consecutive duplicate positions split the segment into sub-paths
        let limit = self.vertices.len() - end_point_len;
        let mut start = 0;

        for end in 1..limit {
            let is_split = self.vertices[end].pos == self.vertices[end - 1].pos
                && !(path_type == PathType::CATMULL && end > 1)
                && end != limit - 1;

            if is_split {
                self.vertices[end - 1].path_type = Some(path_type);
                self.curve_points.extend(&self.vertices[start..end]);
                start = end + 1;
            }
        }

        let end = cmp::max(1, limit);

        if end > start {
            self.curve_points.extend(&self.vertices[start..end]);
        }

        Ok(())
    }

    fn parse_slider<'a>(
        &mut self,
        mut split: impl Iterator<Item = &'a str>,
        pos: Pos,
    ) -> Result<Slider, ParseBeatmapError> {
        let (point_str, repeat_count) = split
            .next()
            .zip(split.next())
            .ok_or(ParseBeatmapError::InvalidHitObjectLine)?;

        let span_count = repeat_count.parse_num::<i32>()?;

        if span_count > 9000 {
            return Err(ParseBeatmapError::InvalidRepeatCount);
        }

        let expected_dist = match split.next() {
            Some(len) => {
                let len = len
                    .parse_with_limits(f64::from(MAX_COORDINATE_VALUE))?
                    .max(0.0);

                Some(len).filter(|&len| len.not_eq(0.0))
            }
            None => None,
        };

        self.convert_path_str(point_str, pos)?;

        Ok(Slider {
            expected_dist,
            repeats: cmp::max(0, span_count - 1) as usize,
            control_points: std::mem::take(&mut self.curve_points).into_boxed_slice(),
        })
    }
}

fn parse_spinner<'a>(
    mut split: impl Iterator<Item = &'a str>,
    start_time: f64,
) -> Result<Spinner, ParseBeatmapError> {
    let end_time = split
        .next()
        .ok_or(ParseBeatmapError::InvalidHitObjectLine)?
        .parse_num::<f64>()?;

    Ok(Spinner {
        duration: (end_time - start_time).max(0.0),
    })
}

/// Parses a beat length while still accepting NaN.
fn parse_beat_len(s: &str) -> Result<f64, ParseBeatmapError> {
    let beat_len = s
        .trim()
        .parse::<f64>()
        .map_err(ParseNumberError::InvalidFloat)?;

    if beat_len < f64::from(-MAX_PARSE_VALUE) {
        Err(ParseNumberError::NumberUnderflow.into())
    } else if beat_len > f64::from(MAX_PARSE_VALUE) {
        Err(ParseNumberError::NumberOverflow.into())
    } else {
        Ok(beat_len)
    }
}

impl DecodeState for BeatmapState {
    fn create(version: i32) -> Self {
        Self {
            version,
            stack_leniency: DEFAULT_STACK_LENIENCY,
            mode: GameMode::Osu,
            difficulty: DifficultyState::create(version),
            timing_points: Vec::with_capacity(1),
            difficulty_points: Vec::new(),
            hit_objects: Vec::with_capacity(512),
            pending_control_points_time: 0.0,
            pending_timing_point: None,
            pending_difficulty_point: None,
            curve_points: Vec::with_capacity(8),
            vertices: Vec::with_capacity(8),
        }
    }
}

impl From<BeatmapState> for Beatmap {
    fn from(mut state: BeatmapState) -> Self {
        state.flush_pending_points();

        let Difficulty {
            hp_drain_rate,
            circle_size,
            overall_difficulty,
            approach_rate,
            slider_multiplier,
            slider_tick_rate,
        } = state.difficulty.into();

        // Stable so that objects sharing a start time keep their file order
        state
            .hit_objects
            .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Beatmap {
            version: state.version,
            stack_leniency: state.stack_leniency,
            mode: state.mode,
            ar: approach_rate,
            cs: circle_size,
            hp: hp_drain_rate,
            od: overall_difficulty,
            slider_multiplier,
            slider_tick_rate,
            timing_points: state.timing_points,
            difficulty_points: state.difficulty_points,
            hit_objects: state.hit_objects,
        }
    }
}

/// All the ways that parsing a [`Beatmap`] can fail.
#[derive(Debug)]
pub enum ParseBeatmapError {
    HitObjectType(ParseHitObjectTypeError),
    InvalidRepeatCount,
    InvalidTimingPointLine,
    InvalidHitObjectLine,
    Mode(ParseGameModeError),
    Number(ParseNumberError),
    TimingControlPointNaN,
    UnknownHitObjectType,
}

impl Display for ParseBeatmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::HitObjectType(_) => f.write_str("failed to parse hit object type"),
            Self::InvalidRepeatCount => f.write_str("repeat count is way too high"),
            Self::InvalidTimingPointLine => f.write_str("invalid timing point line"),
            Self::InvalidHitObjectLine => f.write_str("invalid hit object line"),
            Self::Mode(_) => f.write_str("failed to parse mode"),
            Self::Number(_) => f.write_str("failed to parse number"),
            Self::TimingControlPointNaN => {
                f.write_str("beat length cannot be NaN in a timing control point")
            }
            Self::UnknownHitObjectType => f.write_str("unknown hit object type"),
        }
    }
}

impl StdError for ParseBeatmapError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::HitObjectType(err) => Some(err),
            Self::Mode(err) => Some(err),
            Self::Number(err) => Some(err),
            Self::InvalidRepeatCount
            | Self::InvalidTimingPointLine
            | Self::InvalidHitObjectLine
            | Self::TimingControlPointNaN
            | Self::UnknownHitObjectType => None,
        }
    }
}

impl From<ParseHitObjectTypeError> for ParseBeatmapError {
    fn from(err: ParseHitObjectTypeError) -> Self {
        Self::HitObjectType(err)
    }
}

impl From<ParseGameModeError> for ParseBeatmapError {
    fn from(err: ParseGameModeError) -> Self {
        Self::Mode(err)
    }
}

impl From<ParseNumberError> for ParseBeatmapError {
    fn from(err: ParseNumberError) -> Self {
        Self::Number(err)
    }
}

impl From<ParseDifficultyError> for ParseBeatmapError {
    fn from(err: ParseDifficultyError) -> Self {
        match err {
            ParseDifficultyError::Number(err) => Self::Number(err),
        }
    }
}

impl DecodeBeatmap for Beatmap {
    type Error = ParseBeatmapError;
    type State = BeatmapState;

    fn parse_general(state: &mut Self::State, line: &str) -> Result<(), Self::Error> {
        let Ok(KeyValue { key, value }) = KeyValue::parse(line.trim_comment()) else {
            return Ok(());
        };

        match key {
            GeneralKey::StackLeniency => state.stack_leniency = value.parse_num()?,
            GeneralKey::Mode => state.mode = value.parse()?,
            _ => {}
        }

        Ok(())
    }

    fn parse_editor(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_metadata(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_difficulty(state: &mut Self::State, line: &str) -> Result<(), Self::Error> {
        Difficulty::parse_difficulty(&mut state.difficulty, line).map_err(ParseBeatmapError::from)
    }

    fn parse_events(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_timing_points(state: &mut Self::State, line: &str) -> Result<(), Self::Error> {
        let mut split = line.trim_comment().split(',');

        let (time, beat_len) = split
            .next()
            .zip(split.next())
            .ok_or(ParseBeatmapError::InvalidTimingPointLine)?;

        let time = time.parse_num::<f64>()?;
        let beat_len = parse_beat_len(beat_len)?;

        let speed_multiplier = if beat_len < 0.0 {
            100.0 / -beat_len
        } else {
            1.0
        };

        let _ = split.next(); // timing signature
        let _ = split.next(); // sample set
        let _ = split.next(); // custom sample bank
        let _ = split.next(); // sample volume

        let timing_change = split
            .next()
            .map_or(true, |next| matches!(next.chars().next(), Some('1')));

        if timing_change {
            if beat_len.is_nan() {
                return Err(ParseBeatmapError::TimingControlPointNaN);
            }

            let timing = TimingPoint::new(time, beat_len);
            state.add_pending_point(time, timing, timing_change);
        }

        let difficulty = DifficultyPoint::new(time, beat_len, speed_multiplier);
        state.add_pending_point(time, difficulty, timing_change);

        state.pending_control_points_time = time;

        Ok(())
    }

    fn parse_colors(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_hit_objects(state: &mut Self::State, line: &str) -> Result<(), Self::Error> {
        let mut split = line.trim_comment().split(',');

        let (Some(x), Some(y), Some(start_time), Some(kind), Some(_sound_type)) = (
            split.next(),
            split.next(),
            split.next(),
            split.next(),
            split.next(),
        ) else {
            return Err(ParseBeatmapError::InvalidHitObjectLine);
        };

        let pos = Pos {
            x: x.parse_with_limits(MAX_COORDINATE_VALUE as f32)? as i32 as f32,
            y: y.parse_with_limits(MAX_COORDINATE_VALUE as f32)? as i32 as f32,
        };

        let start_time = f64::parse(start_time)?;
        let hit_object_type: HitObjectType = kind.parse()?;

        let kind = if hit_object_type.has_flag(HitObjectType::CIRCLE) {
            HitObjectKind::Circle
        } else if hit_object_type.has_flag(HitObjectType::SLIDER) {
            HitObjectKind::Slider(state.parse_slider(split, pos)?)
        } else if hit_object_type.has_flag(HitObjectType::SPINNER) {
            HitObjectKind::Spinner(parse_spinner(split, start_time)?)
        } else if hit_object_type.has_flag(HitObjectType::HOLD) {
            #[cfg(feature = "tracing")]
            tracing::warn!(start_time, "Skipping hold note in an osu!standard beatmap");

            return Ok(());
        } else {
            return Err(ParseBeatmapError::UnknownHitObjectType);
        };

        state.hit_objects.push(HitObject {
            pos,
            start_time,
            kind,
        });

        Ok(())
    }

    fn parse_variables(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_catch_the_beat(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn parse_mania(_: &mut Self::State, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

trait Pending: Sized {
    fn pending(state: &mut BeatmapState) -> &mut Option<Self>;

    fn push_front(self, state: &mut BeatmapState) {
        let pending = Self::pending(state);

        if pending.is_none() {
            *pending = Some(self);
        }
    }

    fn push_back(self, state: &mut BeatmapState) {
        *Self::pending(state) = Some(self);
    }
}

impl Pending for TimingPoint {
    fn pending(state: &mut BeatmapState) -> &mut Option<Self> {
        &mut state.pending_timing_point
    }
}

impl Pending for DifficultyPoint {
    fn pending(state: &mut BeatmapState) -> &mut Option<Self> {
        &mut state.pending_difficulty_point
    }
}

impl ControlPoint<BeatmapState> for TimingPoint {
    fn check_already_existing(&self, _: &BeatmapState) -> bool {
        false
    }

    fn add(self, state: &mut BeatmapState) {
        match state
            .timing_points
            .binary_search_by(|probe| probe.time.total_cmp(&self.time))
        {
            Err(i) => state.timing_points.insert(i, self),
            Ok(i) => state.timing_points[i] = self,
        }
    }
}

impl ControlPoint<BeatmapState> for DifficultyPoint {
    fn check_already_existing(&self, state: &BeatmapState) -> bool {
        match difficulty_point_at(&state.difficulty_points, self.time) {
            Some(existing) => self.is_redundant(existing),
            None => self.is_redundant(&DifficultyPoint::default()),
        }
    }

    fn add(self, state: &mut BeatmapState) {
        match state
            .difficulty_points
            .binary_search_by(|probe| probe.time.total_cmp(&self.time))
        {
            Err(i) => state.difficulty_points.insert(i, self),
            Ok(i) => state.difficulty_points[i] = self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(points: &str) -> Vec<(Pos, Option<PathType>)> {
        let mut state = BeatmapState::create(14);
        state.convert_path_str(points, Pos::new(0.0, 0.0)).unwrap();

        state
            .curve_points
            .iter()
            .map(|point| (point.pos, point.path_type))
            .collect()
    }

    #[test]
    fn segments_share_their_end_points() {
        let path = path_of("L|100:0|B|100:100|200:100");

        assert_eq!(
            path,
            [
                (Pos::new(0.0, 0.0), Some(PathType::LINEAR)),
                (Pos::new(100.0, 0.0), None),
                (Pos::new(100.0, 100.0), Some(PathType::BEZIER)),
                (Pos::new(200.0, 100.0), None),
            ]
        );
    }

    #[test]
    fn duplicate_points_split_the_segment() {
        let path = path_of("B|50:0|50:0|100:0");

        assert_eq!(
            path,
            [
                (Pos::new(0.0, 0.0), Some(PathType::BEZIER)),
                (Pos::new(50.0, 0.0), Some(PathType::BEZIER)),
                (Pos::new(100.0, 0.0), None),
            ]
        );
    }

    #[test]
    fn empty_point_is_rejected() {
        let mut state = BeatmapState::create(14);

        assert!(matches!(
            state.convert_path_str("B||100:0", Pos::new(0.0, 0.0)),
            Err(ParseBeatmapError::InvalidHitObjectLine)
        ));
    }

    #[test]
    fn beat_length_accepts_nan() {
        assert!(parse_beat_len("NaN").unwrap().is_nan());
        assert!(parse_beat_len("1e12").is_err());
        assert!((parse_beat_len(" -50 ").unwrap() + 50.0).abs() < f64::EPSILON);
    }
}
