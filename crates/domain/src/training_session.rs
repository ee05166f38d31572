use chrono::{DateTime, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Distance, DurationSeconds, Exercise, ExerciseID, LongNotes, Name,
    Notes, Patch, ReadError, Reps, RestSeconds, TrainingExercise, TrainingID, TrainingOverview,
    UpdateError, UserID, Weight,
};

#[allow(async_fn_in_trait)]
pub trait TrainingSessionService {
    async fn get_training_picker(&self, user_id: UserID)
    -> Result<Vec<TrainingOverview>, ReadError>;
    async fn start_session_from_training(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        notes: Option<LongNotes>,
    ) -> Result<SessionView, CreateError>;
    async fn start_blank_session(
        &self,
        user_id: UserID,
        name: Name,
        notes: Option<LongNotes>,
    ) -> Result<SessionView, CreateError>;
    async fn get_session(
        &self,
        user_id: UserID,
        id: TrainingSessionID,
    ) -> Result<SessionView, ReadError>;
    async fn complete_session(
        &self,
        user_id: UserID,
        id: TrainingSessionID,
    ) -> Result<TrainingSession, UpdateError>;

    async fn add_session_set(
        &self,
        user_id: UserID,
        session_exercise_id: SessionExerciseID,
        new_set: NewSessionSet,
    ) -> Result<SessionSet, CreateError>;
    async fn modify_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
        patch: SessionSetPatch,
    ) -> Result<SessionSet, UpdateError>;
    async fn complete_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
    ) -> Result<SessionSet, UpdateError>;
    async fn delete_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
    ) -> Result<Vec<SessionSet>, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait TrainingSessionRepository {
    async fn read_training_session(
        &self,
        id: TrainingSessionID,
    ) -> Result<TrainingSession, ReadError>;
    /// Insert a session together with its cloned exercises in a single
    /// transaction. Failure leaves no partial session behind.
    async fn create_training_session(
        &self,
        session: TrainingSession,
        session_exercises: Vec<SessionExercise>,
    ) -> Result<TrainingSession, CreateError>;
    async fn replace_training_session(
        &self,
        session: TrainingSession,
    ) -> Result<TrainingSession, UpdateError>;

    async fn read_session_exercises(
        &self,
        session_id: TrainingSessionID,
    ) -> Result<Vec<SessionExercise>, ReadError>;
    async fn read_session_exercise(
        &self,
        id: SessionExerciseID,
    ) -> Result<SessionExercise, ReadError>;

    async fn read_session_sets(
        &self,
        session_exercise_id: SessionExerciseID,
    ) -> Result<Vec<SessionSet>, ReadError>;
    async fn read_session_set(&self, id: SessionSetID) -> Result<SessionSet, ReadError>;
    async fn create_session_set(&self, set: SessionSet) -> Result<SessionSet, CreateError>;
    async fn replace_session_set(&self, set: SessionSet) -> Result<SessionSet, UpdateError>;
    /// Remove a set and close the resulting gap by decrementing the index of
    /// every higher-indexed sibling, in a single transaction. Returns the
    /// refreshed siblings in index order.
    async fn delete_session_set(&self, id: SessionSetID) -> Result<Vec<SessionSet>, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSession {
    pub id: TrainingSessionID,
    pub user_id: UserID,
    pub training_id: Option<TrainingID>,
    pub name: Name,
    pub notes: Option<LongNotes>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrainingSession {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.completed_at.is_none()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|completed_at| (completed_at - self.started_at).num_minutes())
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrainingSessionID(Uuid);

impl TrainingSessionID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for TrainingSessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TrainingSessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionExercise {
    pub id: SessionExerciseID,
    pub session_id: TrainingSessionID,
    pub exercise_id: ExerciseID,
    pub order_index: u32,
    pub notes: Option<Notes>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionExerciseID(Uuid);

impl SessionExerciseID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SessionExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSet {
    pub id: SessionSetID,
    pub session_exercise_id: SessionExerciseID,
    pub set_index: u32,
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub duration_seconds: Option<DurationSeconds>,
    pub distance: Option<Distance>,
    pub rest_seconds_actual: Option<RestSeconds>,
    pub notes: Option<Notes>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionSet {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionSetID(Uuid);

impl SessionSetID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SessionSetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionSetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Measurements supplied when recording a set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewSessionSet {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub duration_seconds: Option<DurationSeconds>,
    pub distance: Option<Distance>,
    pub rest_seconds_actual: Option<RestSeconds>,
    pub notes: Option<Notes>,
}

/// Partial update of a recorded set. Fields left at `Patch::Keep` are not
/// modified; `Patch::Clear` erases the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionSetPatch {
    pub reps: Patch<Reps>,
    pub weight: Patch<Weight>,
    pub duration_seconds: Patch<DurationSeconds>,
    pub distance: Patch<Distance>,
    pub rest_seconds_actual: Patch<RestSeconds>,
    pub notes: Patch<Notes>,
}

impl SessionSetPatch {
    pub fn apply(self, set: &mut SessionSet) {
        set.reps = self.reps.resolve(set.reps.take());
        set.weight = self.weight.resolve(set.weight.take());
        set.duration_seconds = self.duration_seconds.resolve(set.duration_seconds.take());
        set.distance = self.distance.resolve(set.distance.take());
        set.rest_seconds_actual = self
            .rest_seconds_actual
            .resolve(set.rest_seconds_actual.take());
        set.notes = self.notes.resolve(set.notes.take());
    }
}

/// Index for a newly appended set. Sets are numbered from 1.
#[must_use]
pub fn next_set_index(sets: &[SessionSet]) -> u32 {
    sets.iter().map(|s| s.set_index).max().map_or(1, |max| max + 1)
}

/// Clone a training's exercise links into session exercises, preserving order
/// index and notes. Default sets/reps/rest are template metadata and are not
/// carried over.
#[must_use]
pub fn clone_template_exercises(
    session_id: TrainingSessionID,
    training_exercises: &[TrainingExercise],
) -> Vec<SessionExercise> {
    training_exercises
        .iter()
        .map(|e| SessionExercise {
            id: SessionExerciseID::new(),
            session_id,
            exercise_id: e.exercise_id,
            order_index: e.order_index,
            notes: e.notes.clone(),
        })
        .collect()
}

/// The nested view of a session: exercises in order-index order, each with its
/// sets in set-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session: TrainingSession,
    pub training: Option<(TrainingID, Name)>,
    pub exercises: Vec<SessionExerciseView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionExerciseView {
    pub session_exercise: SessionExercise,
    pub exercise: Exercise,
    pub sets: Vec<SessionSet>,
}

impl SessionView {
    #[must_use]
    pub fn assemble(
        session: TrainingSession,
        training: Option<(TrainingID, Name)>,
        exercises: Vec<(SessionExercise, Exercise, Vec<SessionSet>)>,
    ) -> Self {
        let mut exercises = exercises
            .into_iter()
            .map(|(session_exercise, exercise, mut sets)| {
                sets.sort_by_key(|s| s.set_index);
                SessionExerciseView {
                    session_exercise,
                    exercise,
                    sets,
                }
            })
            .collect::<Vec<_>>();
        exercises.sort_by_key(|e| e.session_exercise.order_index);
        SessionView {
            session,
            training,
            exercises,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{DefaultRestSeconds, DefaultSets, ExerciseType, TrainingExerciseID};

    use super::*;

    fn session_set(set_index: u32) -> SessionSet {
        SessionSet {
            id: SessionSetID::new(),
            session_exercise_id: 1.into(),
            set_index,
            reps: None,
            weight: None,
            duration_seconds: None,
            distance: None,
            rest_seconds_actual: None,
            notes: None,
            completed_at: None,
        }
    }

    fn session(completed_at: Option<DateTime<Utc>>) -> TrainingSession {
        TrainingSession {
            id: 1.into(),
            user_id: 1.into(),
            training_id: None,
            name: Name::new("Push Day").unwrap(),
            notes: None,
            started_at: DateTime::<Utc>::MIN_UTC + Duration::days(1),
            completed_at,
        }
    }

    #[rstest]
    #[case(&[], 1)]
    #[case(&[1], 2)]
    #[case(&[1, 2, 3], 4)]
    #[case(&[3, 1, 2], 4)]
    fn test_next_set_index(#[case] indices: &[u32], #[case] expected: u32) {
        let sets = indices.iter().map(|i| session_set(*i)).collect::<Vec<_>>();
        assert_eq!(next_set_index(&sets), expected);
    }

    #[test]
    fn test_clone_template_exercises() {
        let training_exercises = vec![
            TrainingExercise {
                id: TrainingExerciseID::new(),
                training_id: 1.into(),
                exercise_id: 1.into(),
                order_index: 0,
                default_sets: Some(DefaultSets::new(3).unwrap()),
                default_reps: Some(Reps::new(8).unwrap()),
                default_rest_seconds: DefaultRestSeconds::new(180).unwrap(),
                notes: Some(Notes::new("Pause at the bottom").unwrap()),
            },
            TrainingExercise {
                id: TrainingExerciseID::new(),
                training_id: 1.into(),
                exercise_id: 2.into(),
                order_index: 1,
                default_sets: None,
                default_reps: None,
                default_rest_seconds: DefaultRestSeconds::default(),
                notes: None,
            },
        ];

        let session_id = TrainingSessionID::new();
        let session_exercises = clone_template_exercises(session_id, &training_exercises);

        assert_eq!(session_exercises.len(), 2);
        for (cloned, original) in session_exercises.iter().zip(&training_exercises) {
            assert!(!cloned.id.is_nil());
            assert_eq!(cloned.session_id, session_id);
            assert_eq!(cloned.exercise_id, original.exercise_id);
            assert_eq!(cloned.order_index, original.order_index);
            assert_eq!(cloned.notes, original.notes);
        }
    }

    #[test]
    fn test_session_completion_flags() {
        let in_progress = session(None);
        assert!(in_progress.is_in_progress());
        assert!(!in_progress.is_completed());
        assert_eq!(in_progress.duration_minutes(), None);

        let completed = session(Some(in_progress.started_at + Duration::minutes(55)));
        assert!(completed.is_completed());
        assert!(!completed.is_in_progress());
        assert_eq!(completed.duration_minutes(), Some(55));
    }

    #[test]
    fn test_session_set_patch_apply() {
        let mut set = session_set(1);
        set.reps = Some(Reps::new(8).unwrap());
        set.weight = Some(Weight::new(60.0).unwrap());
        set.notes = Some(Notes::new("old").unwrap());

        SessionSetPatch {
            reps: Patch::Set(Reps::new(6).unwrap()),
            weight: Patch::Keep,
            duration_seconds: Patch::Keep,
            distance: Patch::Keep,
            rest_seconds_actual: Patch::Set(RestSeconds::new(90).unwrap()),
            notes: Patch::Clear,
        }
        .apply(&mut set);

        assert_eq!(set.reps, Some(Reps::new(6).unwrap()));
        assert_eq!(set.weight, Some(Weight::new(60.0).unwrap()));
        assert_eq!(set.rest_seconds_actual, Some(RestSeconds::new(90).unwrap()));
        assert_eq!(set.notes, None);
    }

    #[test]
    fn test_session_view_assemble_orders_exercises_and_sets() {
        let exercise = Exercise {
            id: 1.into(),
            user_id: 1.into(),
            name: Name::new("Bench Press").unwrap(),
            description: None,
            exercise_type: ExerciseType::Strength,
            muscle_group: None,
        };
        let second = SessionExercise {
            id: 2.into(),
            session_id: 1.into(),
            exercise_id: 1.into(),
            order_index: 1,
            notes: None,
        };
        let first = SessionExercise {
            id: 1.into(),
            session_id: 1.into(),
            exercise_id: 1.into(),
            order_index: 0,
            notes: None,
        };

        let view = SessionView::assemble(
            session(None),
            None,
            vec![
                (
                    second.clone(),
                    exercise.clone(),
                    vec![session_set(2), session_set(1)],
                ),
                (first.clone(), exercise.clone(), vec![]),
            ],
        );

        assert_eq!(view.exercises[0].session_exercise, first);
        assert_eq!(view.exercises[1].session_exercise, second);
        assert_eq!(
            view.exercises[1]
                .sets
                .iter()
                .map(|s| s.set_index)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
