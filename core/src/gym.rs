//! Live session engine.
//!
//! The gym holds the selected program and turns each new measurement into
//! progress through the program's segments. A workout is only created once
//! the measurement shows forward progress, so selecting a program and then
//! sitting idle leaves nothing behind in the store.
//!
//! Listeners are notified synchronously after every measurement and every
//! selection. They receive no handle to the gym and so cannot register or
//! unregister listeners while being notified.

use chrono::Utc;

use crate::error::{GymError, StoreError};
use crate::location::Locator;
use crate::models::{
    Difficulty, Measurement, Program, ProgramId, Segment, Snapshot, Workout, WorkoutId,
};
use crate::storage::{Store, WorkoutQuery};

/// Name of the synthetic program used to challenge a past workout.
pub const CHALLENGE_NAME: &str = "Challenge";

/// What a measurement did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Acknowledged,
    ProgramStarted,
    SegmentChanged,
    ProgramFinished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No program selected.
    Idle,
    /// Program selected, waiting for the first stroke.
    Selected,
    /// Workout running.
    Active,
    /// All segments completed. Measurements are acknowledged only.
    Finished,
}

/// Achievement within the current segment, relative to where it started.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    index: usize,
    segment: Segment,
    start: Measurement,
}

impl Progress {
    pub fn new(index: usize, segment: Segment, start: &Measurement) -> Self {
        Self {
            index,
            segment,
            start: start.clone(),
        }
    }

    pub fn segment_index(&self) -> usize {
        self.index
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn start(&self) -> &Measurement {
        &self.start
    }

    /// Amount of the target metric gained since the segment started.
    pub fn achieved(&self, current: &Measurement) -> u32 {
        match self.segment.target() {
            Some((metric, _)) => metric
                .value_of(current)
                .saturating_sub(metric.value_of(&self.start)),
            None => 0,
        }
    }

    /// Fraction of the target reached, in `[0.0, 1.0]`.
    pub fn completion(&self, current: &Measurement) -> f32 {
        match self.segment.target() {
            Some((_, target)) => (self.achieved(current) as f32 / target as f32).min(1.0),
            None => 0.0,
        }
    }

    pub fn is_complete(&self, current: &Measurement) -> bool {
        match self.segment.target() {
            Some((_, target)) => self.achieved(current) >= target,
            None => false,
        }
    }

    pub fn in_limit(&self, current: &Measurement) -> bool {
        self.segment.in_limit(current)
    }
}

pub trait Listener {
    fn changed(&mut self);
}

impl<F: FnMut()> Listener for F {
    fn changed(&mut self) {
        self()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

enum Run {
    /// Holds a workout whose first write to the store failed.
    Waiting(Option<Workout>),
    Active { workout: Workout, progress: Progress },
    Finished,
}

pub struct Gym<St: Store, L: Locator> {
    store: St,
    locator: L,
    clock: fn() -> i64,
    program: Option<Program>,
    /// Whether `program` is a synthetic challenge, not a stored one.
    challenge: bool,
    pace: Option<Workout>,
    measurement: Measurement,
    run: Run,
    epoch: u64,
    listeners: Vec<(ListenerId, Box<dyn Listener>)>,
    next_listener: u64,
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

impl<St: Store, L: Locator> Gym<St, L> {
    pub fn new(store: St, locator: L) -> Self {
        Self {
            store,
            locator,
            clock: now_unix,
            program: None,
            challenge: false,
            pace: None,
            measurement: Measurement::default(),
            run: Run::Waiting(None),
            epoch: 0,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Replace the wall clock used for workout start times.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut St {
        &mut self.store
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// The past workout being repeated or challenged.
    pub fn pace(&self) -> Option<&Workout> {
        self.pace.as_ref()
    }

    /// The running workout.
    pub fn workout(&self) -> Option<&Workout> {
        match &self.run {
            Run::Active { workout, .. } => Some(workout),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<&Progress> {
        match &self.run {
            Run::Active { progress, .. } => Some(progress),
            _ => None,
        }
    }

    pub fn completion(&self) -> Option<f32> {
        self.progress().map(|p| p.completion(&self.measurement))
    }

    pub fn in_limit(&self) -> Option<bool> {
        self.progress().map(|p| p.in_limit(&self.measurement))
    }

    pub fn phase(&self) -> Phase {
        match (&self.program, &self.run) {
            (None, _) => Phase::Idle,
            (Some(_), Run::Waiting(_)) => Phase::Selected,
            (Some(_), Run::Active { .. }) => Phase::Active,
            (Some(_), Run::Finished) => Phase::Finished,
        }
    }

    /// Incremented on every selection; a new epoch means a fresh measurement.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn add_listener<Li: Listener + 'static>(&mut self, listener: Li) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    fn fire_changed(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.changed();
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn deselect(&mut self) {
        self.program = None;
        self.challenge = false;
        self.pace = None;
        self.reset();
    }

    pub fn select_program(&mut self, program: Program) {
        log::info!("selected program '{}'", program.name);
        self.program = Some(program);
        self.challenge = false;
        self.pace = None;
        self.reset();
    }

    /// Row the program of a past workout again, with the workout as pace.
    ///
    /// Falls back to [`Gym::challenge`] when the workout followed no program
    /// or its program has been deleted since.
    pub fn repeat_workout(&mut self, pace: Workout) -> Result<(), GymError> {
        let Some(program_id) = pace.program_id.clone() else {
            self.challenge(pace);
            return Ok(());
        };

        match self.store.load_program(&program_id) {
            Ok(program) => {
                log::info!("repeating workout {} of '{}'", pace.id, program.name);
                self.program = Some(program);
                self.challenge = false;
                self.pace = Some(pace);
                self.reset();
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                log::warn!(
                    "program {} of workout {} is gone, challenging its distance instead",
                    program_id,
                    pace.id
                );
                self.challenge(pace);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Row the distance of a past workout, with the workout as pace.
    pub fn challenge(&mut self, pace: Workout) {
        log::info!("challenging {} m of workout {}", pace.distance, pace.id);
        self.program = Some(Program::meters(CHALLENGE_NAME, pace.distance, Difficulty::None));
        self.challenge = true;
        self.pace = Some(pace);
        self.reset();
    }

    fn reset(&mut self) {
        self.measurement = Measurement::default();
        self.run = Run::Waiting(None);
        self.epoch += 1;
        self.fire_changed();
    }

    // ------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------

    /// Take a freshly decoded measurement and advance the session.
    pub fn on_measured(&mut self, measurement: Measurement) -> Result<Event, GymError> {
        self.measurement = measurement;
        let event = self.advance()?;
        self.fire_changed();
        Ok(event)
    }

    /// Changes to the run are committed only after the store took them, so a
    /// frame that failed to persist can be retried.
    fn advance(&mut self) -> Result<Event, GymError> {
        let Some(program) = self.program.as_ref() else {
            return Ok(Event::Acknowledged);
        };
        if !self.measurement.has_progress() {
            return Ok(Event::Acknowledged);
        }

        let (mut workout, mut progress, starting) = match &mut self.run {
            Run::Waiting(pending) => {
                let workout = match pending.take() {
                    Some(workout) => workout,
                    None => {
                        let program_id = (!self.challenge).then(|| program.id.clone());
                        let mut workout = Workout::new(program_id, (self.clock)());
                        workout.location = self.locator.locate();
                        workout
                    }
                };
                let progress = Progress::new(0, program.segments()[0], &Measurement::default());
                (workout, progress, true)
            }
            Run::Active { workout, progress } => (workout.clone(), progress.clone(), false),
            Run::Finished => return Ok(Event::Acknowledged),
        };

        let changed = workout.on_measured(&self.measurement);
        if changed || starting {
            let snapshot = Snapshot::new(workout.id.clone(), (self.clock)(), &self.measurement);
            let stored = self
                .store
                .upsert_workout(workout.clone())
                .and_then(|()| self.store.insert_snapshot(snapshot));
            if let Err(err) = stored {
                if starting {
                    // keep id and start time for the retry
                    self.run = Run::Waiting(Some(workout));
                }
                return Err(err.into());
            }
        }

        let mut event = Event::Acknowledged;
        if starting {
            log::info!("program '{}' started, workout {}", program.name, workout.id);
            event = Event::ProgramStarted;
        }

        if progress.is_complete(&self.measurement) {
            match program.next_segment(progress.segment_index()) {
                Some(next) => {
                    log::info!("segment {} of '{}' started", next + 1, program.name);
                    progress = Progress::new(next, program.segments()[next], &self.measurement);
                    event = Event::SegmentChanged;
                }
                None => {
                    log::info!(
                        "program '{}' finished, workout {}: {} m in {} strokes",
                        program.name,
                        workout.id,
                        workout.distance,
                        workout.strokes
                    );
                    self.run = Run::Finished;
                    return Ok(Event::ProgramFinished);
                }
            }
        }

        self.run = Run::Active { workout, progress };
        Ok(event)
    }

    // ------------------------------------------------------------------
    // Store access
    // ------------------------------------------------------------------

    /// Seed the store with the stock programs unless it already has some.
    pub fn defaults(&mut self) -> Result<(), GymError> {
        if !self.store.list_programs()?.is_empty() {
            return Ok(());
        }
        for program in default_programs() {
            self.store.upsert_program(program)?;
        }
        Ok(())
    }

    pub fn programs(&self) -> Result<Vec<Program>, GymError> {
        Ok(self.store.list_programs()?)
    }

    pub fn load_program(&self, id: &ProgramId) -> Result<Program, GymError> {
        Ok(self.store.load_program(id)?)
    }

    pub fn merge_program(&mut self, program: Program) -> Result<(), GymError> {
        Ok(self.store.upsert_program(program)?)
    }

    pub fn delete_program(&mut self, id: &ProgramId) -> Result<(), GymError> {
        Ok(self.store.delete_program(id)?)
    }

    pub fn workouts(&self) -> Result<Vec<Workout>, GymError> {
        Ok(self.store.list_workouts(&WorkoutQuery::default())?)
    }

    /// Evaluated workouts started in `[from, to)`.
    pub fn workouts_between(&self, from: i64, to: i64) -> Result<Vec<Workout>, GymError> {
        Ok(self
            .store
            .list_workouts(&WorkoutQuery::evaluated_between(from, to))?)
    }

    pub fn snapshots(&self, workout: &WorkoutId) -> Result<Vec<Snapshot>, GymError> {
        Ok(self.store.list_snapshots(workout)?)
    }

    pub fn delete_workout(&mut self, workout: &WorkoutId) -> Result<(), GymError> {
        Ok(self.store.delete_workout(workout)?)
    }

    /// Add a workout recorded elsewhere. Imported workouts are not evaluated.
    pub fn import_workout(
        &mut self,
        program_name: &str,
        mut workout: Workout,
        snapshots: Vec<Snapshot>,
    ) -> Result<(), GymError> {
        workout.evaluate = false;
        workout.program_id = self
            .store
            .find_program_by_name(program_name)?
            .map(|program| program.id);
        Ok(self.store.import_workout(workout, snapshots)?)
    }
}

/// Programs a fresh installation starts with.
pub fn default_programs() -> Vec<Program> {
    let mut intervals = Program::meters("Segments", 1000, Difficulty::Easy);
    for _ in 0..4 {
        intervals.add_segment(
            Segment::new(Difficulty::Hard)
                .with_duration(60)
                .with_stroke_rate(30),
        );
        intervals.add_segment(Segment::new(Difficulty::Easy).with_distance(1000));
    }

    vec![
        Program::meters("500 meters", 500, Difficulty::Easy),
        Program::meters("1000 meters", 1000, Difficulty::Easy),
        Program::meters("2000 meters", 2000, Difficulty::Medium),
        Program::calories("200 calories", 200, Difficulty::Medium),
        Program::minutes("5 minutes", 5, Difficulty::Easy),
        Program::minutes("10 minutes", 10, Difficulty::Medium),
        Program::strokes("500 strokes", 500, Difficulty::Medium),
        intervals,
    ]
}
