use crate::error::StoreError;
use crate::models::{Program, ProgramId, Snapshot, Workout, WorkoutId};
use crate::storage::{Store, WorkoutQuery};

/// Store kept in memory, for tests and for hosts without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub programs: Vec<Program>,
    pub workouts: Vec<Workout>,
    pub snapshots: Vec<Snapshot>,
    /// When set, every call fails with this backend error.
    pub failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl Store for MemoryStore {
    fn upsert_program(&mut self, program: Program) -> Result<(), StoreError> {
        self.check()?;
        match self.programs.iter_mut().find(|p| p.id == program.id) {
            Some(existing) => *existing = program,
            None => self.programs.push(program),
        }
        Ok(())
    }

    fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        self.check()?;
        Ok(self.programs.clone())
    }

    fn find_program_by_name(&self, name: &str) -> Result<Option<Program>, StoreError> {
        self.check()?;
        Ok(self.programs.iter().find(|p| p.name == name).cloned())
    }

    fn load_program(&self, id: &ProgramId) -> Result<Program, StoreError> {
        self.check()?;
        self.programs
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("program", id.0.as_str()))
    }

    fn delete_program(&mut self, id: &ProgramId) -> Result<(), StoreError> {
        self.check()?;
        self.programs.retain(|p| &p.id != id);
        Ok(())
    }

    fn upsert_workout(&mut self, workout: Workout) -> Result<(), StoreError> {
        self.check()?;
        match self.workouts.iter_mut().find(|w| w.id == workout.id) {
            Some(existing) => *existing = workout,
            None => self.workouts.push(workout),
        }
        Ok(())
    }

    fn list_workouts(&self, query: &WorkoutQuery) -> Result<Vec<Workout>, StoreError> {
        self.check()?;
        let mut workouts: Vec<Workout> = self
            .workouts
            .iter()
            .filter(|w| query.matches(w))
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.start_time_unix.cmp(&a.start_time_unix));
        Ok(workouts)
    }

    fn load_workout(&self, id: &WorkoutId) -> Result<Workout, StoreError> {
        self.check()?;
        self.workouts
            .iter()
            .find(|w| &w.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("workout", id.0.as_str()))
    }

    fn delete_workout(&mut self, id: &WorkoutId) -> Result<(), StoreError> {
        self.check()?;
        self.snapshots.retain(|s| &s.workout_id != id);
        self.workouts.retain(|w| &w.id != id);
        Ok(())
    }

    fn insert_snapshot(&mut self, snapshot: Snapshot) -> Result<(), StoreError> {
        self.check()?;
        self.snapshots.push(snapshot);
        Ok(())
    }

    fn list_snapshots(&self, id: &WorkoutId) -> Result<Vec<Snapshot>, StoreError> {
        self.check()?;
        Ok(self
            .snapshots
            .iter()
            .filter(|s| &s.workout_id == id)
            .cloned()
            .collect())
    }

    fn import_workout(
        &mut self,
        workout: Workout,
        snapshots: Vec<Snapshot>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let id = workout.id.clone();
        self.upsert_workout(workout)?;
        self.snapshots.extend(snapshots.into_iter().map(|mut s| {
            s.workout_id = id.clone();
            s
        }));
        Ok(())
    }
}
