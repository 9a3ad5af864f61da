use crate::error::StoreError;
use crate::models::{Program, ProgramId, Snapshot, Workout, WorkoutId};

#[derive(Clone, Debug, Default)]
pub struct WorkoutQuery {
    /// Inclusive lower bound on the start time.
    pub start_time_min: Option<i64>,
    /// Exclusive upper bound on the start time.
    pub start_time_max: Option<i64>,
    pub evaluate: Option<bool>,
    pub program_id: Option<ProgramId>,
}

impl WorkoutQuery {
    /// Evaluated workouts started in `[from, to)`.
    pub fn evaluated_between(from: i64, to: i64) -> Self {
        Self {
            start_time_min: Some(from),
            start_time_max: Some(to),
            evaluate: Some(true),
            program_id: None,
        }
    }

    pub fn matches(&self, workout: &Workout) -> bool {
        self.start_time_min
            .map_or(true, |min| workout.start_time_unix >= min)
            && self
                .start_time_max
                .map_or(true, |max| workout.start_time_unix < max)
            && self.evaluate.map_or(true, |e| workout.evaluate == e)
            && self
                .program_id
                .as_ref()
                .map_or(true, |id| workout.program_id.as_ref() == Some(id))
    }
}

/// Persistence for programs, workouts and their snapshots.
///
/// `load_*` fail with [`StoreError::NotFound`] when the entity does not exist
/// (any more); query failures are [`StoreError::Backend`].
pub trait Store {
    fn upsert_program(&mut self, program: Program) -> Result<(), StoreError>;
    fn list_programs(&self) -> Result<Vec<Program>, StoreError>;
    fn find_program_by_name(&self, name: &str) -> Result<Option<Program>, StoreError>;
    fn load_program(&self, id: &ProgramId) -> Result<Program, StoreError>;
    fn delete_program(&mut self, id: &ProgramId) -> Result<(), StoreError>;

    fn upsert_workout(&mut self, workout: Workout) -> Result<(), StoreError>;
    /// Matching workouts, most recent start first.
    fn list_workouts(&self, query: &WorkoutQuery) -> Result<Vec<Workout>, StoreError>;
    fn load_workout(&self, id: &WorkoutId) -> Result<Workout, StoreError>;
    /// Delete a workout together with all of its snapshots, atomically.
    fn delete_workout(&mut self, id: &WorkoutId) -> Result<(), StoreError>;

    fn insert_snapshot(&mut self, snapshot: Snapshot) -> Result<(), StoreError>;
    /// Snapshots of a workout in insertion order.
    fn list_snapshots(&self, id: &WorkoutId) -> Result<Vec<Snapshot>, StoreError>;

    /// Store a workout and its snapshots as one unit.
    fn import_workout(
        &mut self,
        workout: Workout,
        snapshots: Vec<Snapshot>,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(start: i64, evaluate: bool) -> Workout {
        let mut workout = Workout::new(Some(ProgramId("p".to_string())), start);
        workout.evaluate = evaluate;
        workout
    }

    #[test]
    fn test_query_range_is_half_open() {
        let query = WorkoutQuery::evaluated_between(100, 200);
        assert!(query.matches(&workout(100, true)));
        assert!(query.matches(&workout(199, true)));
        assert!(!query.matches(&workout(200, true)));
        assert!(!query.matches(&workout(99, true)));
        assert!(!query.matches(&workout(150, false)));
    }

    #[test]
    fn test_query_by_program() {
        let query = WorkoutQuery {
            program_id: Some(ProgramId("p".to_string())),
            ..Default::default()
        };
        assert!(query.matches(&workout(1, false)));
        assert!(!query.matches(&Workout::new(None, 1)));
        assert!(WorkoutQuery::default().matches(&Workout::new(None, 1)));
    }
}
