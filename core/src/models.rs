use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkoutId(pub String);

impl ProgramId {
    pub fn generate() -> Self {
        ProgramId(uuid::Uuid::new_v4().to_string())
    }
}

impl WorkoutId {
    pub fn generate() -> Self {
        WorkoutId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Running totals and current values of a rowing session.
///
/// `distance`, `strokes`, `duration` and `energy` only grow; `pulse`, `speed`
/// and `stroke_rate` hold the last reported value. All zero means no data yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, uniffi::Record)]
pub struct Measurement {
    /// Metres
    pub distance: u32,
    pub strokes: u32,
    /// Seconds
    pub duration: u32,
    /// Kilocalories
    pub energy: u32,
    /// Beats per minute, 0 when unknown
    pub pulse: u32,
    /// Centimetres per second
    pub speed: u32,
    /// Strokes per minute
    pub stroke_rate: u32,
}

impl Measurement {
    pub fn has_progress(&self) -> bool {
        self.distance > 0 || self.duration > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    None,
    Easy,
    Medium,
    Hard,
}

/// The cumulative metric a segment is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetMetric {
    Distance,
    Strokes,
    Energy,
    Duration,
}

impl TargetMetric {
    pub fn value_of(&self, measurement: &Measurement) -> u32 {
        match self {
            TargetMetric::Distance => measurement.distance,
            TargetMetric::Strokes => measurement.strokes,
            TargetMetric::Energy => measurement.energy,
            TargetMetric::Duration => measurement.duration,
        }
    }
}

// Rough pace figures for estimating how long a segment takes.
const SECONDS_PER_500M: u32 = 120;
const STROKES_PER_MINUTE: u32 = 25;
const KCAL_PER_MINUTE: u32 = 10;

/// One unit of a training program: a single target plus optional minimums.
///
/// Setting a target clears the others, so at most one is ever non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    difficulty: Difficulty,
    distance: u32,
    strokes: u32,
    energy: u32,
    duration: u32,
    speed: u32,
    pulse: u32,
    stroke_rate: u32,
}

impl Segment {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            distance: 0,
            strokes: 0,
            energy: 0,
            duration: 0,
            speed: 0,
            pulse: 0,
            stroke_rate: 0,
        }
    }

    fn clear_target(&mut self) {
        self.distance = 0;
        self.strokes = 0;
        self.energy = 0;
        self.duration = 0;
    }

    pub fn with_distance(mut self, meters: u32) -> Self {
        self.clear_target();
        self.distance = meters;
        self
    }

    pub fn with_strokes(mut self, strokes: u32) -> Self {
        self.clear_target();
        self.strokes = strokes;
        self
    }

    pub fn with_energy(mut self, kcal: u32) -> Self {
        self.clear_target();
        self.energy = kcal;
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.clear_target();
        self.duration = seconds;
        self
    }

    /// Minimum speed in centimetres per second, 0 for none.
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_pulse(mut self, pulse: u32) -> Self {
        self.pulse = pulse;
        self
    }

    pub fn with_stroke_rate(mut self, stroke_rate: u32) -> Self {
        self.stroke_rate = stroke_rate;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn strokes(&self) -> u32 {
        self.strokes
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn pulse(&self) -> u32 {
        self.pulse
    }

    pub fn stroke_rate(&self) -> u32 {
        self.stroke_rate
    }

    /// The metric and amount to reach, `None` for a segment without target.
    pub fn target(&self) -> Option<(TargetMetric, u32)> {
        if self.distance > 0 {
            Some((TargetMetric::Distance, self.distance))
        } else if self.strokes > 0 {
            Some((TargetMetric::Strokes, self.strokes))
        } else if self.energy > 0 {
            Some((TargetMetric::Energy, self.energy))
        } else if self.duration > 0 {
            Some((TargetMetric::Duration, self.duration))
        } else {
            None
        }
    }

    /// Estimated seconds to complete this segment.
    pub fn as_duration(&self) -> u32 {
        match self.target() {
            Some((TargetMetric::Distance, meters)) => meters * SECONDS_PER_500M / 500,
            Some((TargetMetric::Strokes, strokes)) => strokes * 60 / STROKES_PER_MINUTE,
            Some((TargetMetric::Energy, kcal)) => kcal * 60 / KCAL_PER_MINUTE,
            Some((TargetMetric::Duration, seconds)) => seconds,
            None => 0,
        }
    }

    /// Whether the instantaneous values meet every minimum set on this segment.
    pub fn in_limit(&self, measurement: &Measurement) -> bool {
        measurement.speed >= self.speed
            && measurement.pulse >= self.pulse
            && measurement.stroke_rate >= self.stroke_rate
    }
}

/// An ordered list of segments. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    segments: Vec<Segment>,
}

impl Program {
    /// A program with a single easy segment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProgramId::generate(),
            name: name.into(),
            segments: vec![Segment::new(Difficulty::Easy)],
        }
    }

    pub fn meters(name: impl Into<String>, meters: u32, difficulty: Difficulty) -> Self {
        Self::single(name, Segment::new(difficulty).with_distance(meters))
    }

    pub fn calories(name: impl Into<String>, kcal: u32, difficulty: Difficulty) -> Self {
        Self::single(name, Segment::new(difficulty).with_energy(kcal))
    }

    pub fn minutes(name: impl Into<String>, minutes: u32, difficulty: Difficulty) -> Self {
        Self::single(name, Segment::new(difficulty).with_duration(minutes * 60))
    }

    pub fn strokes(name: impl Into<String>, strokes: u32, difficulty: Difficulty) -> Self {
        Self::single(name, Segment::new(difficulty).with_strokes(strokes))
    }

    fn single(name: impl Into<String>, segment: Segment) -> Self {
        let mut program = Self::new(name);
        program.segments[0] = segment;
        program
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segments_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    /// Index of the segment after `index`, `None` past the last one.
    pub fn next_segment(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        (next < self.segments.len()).then_some(next)
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Insert an easy segment in front of `index`.
    pub fn create_segment_before(&mut self, index: usize) {
        let index = index.min(self.segments.len());
        self.segments.insert(index, Segment::new(Difficulty::Easy));
    }

    /// Insert an easy segment behind `index`.
    pub fn create_segment_after(&mut self, index: usize) {
        let index = (index + 1).min(self.segments.len());
        self.segments.insert(index, Segment::new(Difficulty::Easy));
    }

    /// Remove a segment. Removing the last one leaves a default easy segment.
    pub fn remove_segment(&mut self, index: usize) -> Option<Segment> {
        if index >= self.segments.len() {
            return None;
        }
        let removed = self.segments.remove(index);
        if self.segments.is_empty() {
            self.segments.push(Segment::new(Difficulty::Easy));
        }
        Some(removed)
    }

    /// Estimated seconds to complete all segments.
    pub fn as_duration(&self) -> u32 {
        self.segments.iter().map(Segment::as_duration).sum()
    }

    pub fn new_workout(&self, start_time_unix: i64) -> Workout {
        Workout::new(Some(self.id.clone()), start_time_unix)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    /// Radius of 68% confidence in metres.
    pub accuracy_m: f32,
}

/// A rowing session, live or imported.
#[derive(Clone, Debug, PartialEq)]
pub struct Workout {
    pub id: WorkoutId,
    /// `None` when the session followed no stored program.
    pub program_id: Option<ProgramId>,
    pub start_time_unix: i64,
    pub location: Option<Location>,
    /// Whether the workout counts in evaluations. Imported workouts do not.
    pub evaluate: bool,
    pub distance: u32,
    pub duration: u32,
    pub strokes: u32,
    pub energy: u32,
}

impl Workout {
    pub fn new(program_id: Option<ProgramId>, start_time_unix: i64) -> Self {
        Self {
            id: WorkoutId::generate(),
            program_id,
            start_time_unix,
            location: None,
            evaluate: true,
            distance: 0,
            duration: 0,
            strokes: 0,
            energy: 0,
        }
    }

    /// Take over the totals of `measurement`, returning whether anything changed.
    pub fn on_measured(&mut self, measurement: &Measurement) -> bool {
        let changed = self.distance != measurement.distance
            || self.duration != measurement.duration
            || self.strokes != measurement.strokes
            || self.energy != measurement.energy;

        self.distance = measurement.distance;
        self.duration = measurement.duration;
        self.strokes = measurement.strokes;
        self.energy = measurement.energy;

        changed
    }
}

/// A copy of the measurement at one point of a workout.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub workout_id: WorkoutId,
    /// Wall time the measurement was taken.
    pub time_unix: i64,
    pub distance: u32,
    pub strokes: u32,
    pub duration: u32,
    pub energy: u32,
    pub pulse: u32,
    pub speed: u32,
    pub stroke_rate: u32,
}

impl Snapshot {
    pub fn new(workout_id: WorkoutId, time_unix: i64, measurement: &Measurement) -> Self {
        Self {
            workout_id,
            time_unix,
            distance: measurement.distance,
            strokes: measurement.strokes,
            duration: measurement.duration,
            energy: measurement.energy,
            pulse: measurement.pulse,
            speed: measurement.speed,
            stroke_rate: measurement.stroke_rate,
        }
    }

    pub fn measurement(&self) -> Measurement {
        Measurement {
            distance: self.distance,
            strokes: self.strokes,
            duration: self.duration,
            energy: self.energy,
            pulse: self.pulse,
            speed: self.speed,
            stroke_rate: self.stroke_rate,
        }
    }
}
