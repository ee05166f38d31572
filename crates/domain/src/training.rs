use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    CreateError, DefaultRestSeconds, DefaultSets, DeleteError, Description, Exercise, ExerciseID,
    LongNotes, Name, Notes, Patch, ReadError, Reps, UpdateError, UserID, ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait TrainingService {
    async fn get_trainings(
        &self,
        user_id: UserID,
        filter: &TrainingFilter,
    ) -> Result<Vec<TrainingOverview>, ReadError>;
    async fn get_training(&self, user_id: UserID, id: TrainingID)
    -> Result<TrainingDetail, ReadError>;
    async fn create_training(
        &self,
        user_id: UserID,
        name: Name,
        description: Option<Description>,
        notes: Option<LongNotes>,
    ) -> Result<Training, CreateError>;
    async fn modify_training(
        &self,
        user_id: UserID,
        id: TrainingID,
        name: Option<Name>,
        description: Patch<Description>,
        notes: Patch<LongNotes>,
    ) -> Result<Training, UpdateError>;
    async fn delete_training(
        &self,
        user_id: UserID,
        id: TrainingID,
    ) -> Result<TrainingID, DeleteError>;

    async fn add_training_exercise(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        new_exercise: NewTrainingExercise,
    ) -> Result<TrainingExercise, CreateError>;
    async fn modify_training_exercise(
        &self,
        user_id: UserID,
        id: TrainingExerciseID,
        patch: TrainingExercisePatch,
    ) -> Result<TrainingExercise, UpdateError>;
    async fn reorder_training_exercises(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        order: &[(TrainingExerciseID, u32)],
    ) -> Result<Vec<TrainingExercise>, UpdateError>;
    async fn remove_training_exercise(
        &self,
        user_id: UserID,
        id: TrainingExerciseID,
    ) -> Result<TrainingExerciseID, DeleteError>;

    async fn validate_training_name(
        &self,
        user_id: UserID,
        name: &str,
        id: TrainingID,
    ) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_trainings(user_id, &TrainingFilter::default()).await {
                Ok(trainings) => {
                    if trainings
                        .iter()
                        .all(|t| t.training.id == id || t.training.name != name)
                    {
                        Ok(name)
                    } else {
                        Err(ValidationError::Conflict("name".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::field("name", err)),
            },
            Err(err) => Err(ValidationError::field("name", err)),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait TrainingRepository {
    async fn read_trainings(&self, user_id: UserID) -> Result<Vec<Training>, ReadError>;
    async fn read_training(&self, id: TrainingID) -> Result<Training, ReadError>;
    async fn read_training_exercise_counts(
        &self,
        user_id: UserID,
    ) -> Result<BTreeMap<TrainingID, u32>, ReadError>;
    async fn create_training(&self, training: Training) -> Result<Training, CreateError>;
    async fn replace_training(&self, training: Training) -> Result<Training, UpdateError>;
    async fn delete_training(&self, id: TrainingID) -> Result<TrainingID, DeleteError>;

    async fn read_training_exercises(
        &self,
        training_id: TrainingID,
    ) -> Result<Vec<TrainingExercise>, ReadError>;
    async fn read_training_exercise(
        &self,
        id: TrainingExerciseID,
    ) -> Result<TrainingExercise, ReadError>;
    async fn create_training_exercise(
        &self,
        training_exercise: TrainingExercise,
    ) -> Result<TrainingExercise, CreateError>;
    async fn replace_training_exercise(
        &self,
        training_exercise: TrainingExercise,
    ) -> Result<TrainingExercise, UpdateError>;
    async fn delete_training_exercise(
        &self,
        id: TrainingExerciseID,
    ) -> Result<TrainingExerciseID, DeleteError>;
    /// Apply a full order-index mapping to the links of one training within a
    /// single transaction. Fails without effect if any id does not belong to
    /// the training.
    async fn reorder_training_exercises(
        &self,
        training_id: TrainingID,
        order: &[(TrainingExerciseID, u32)],
    ) -> Result<Vec<TrainingExercise>, UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Training {
    pub id: TrainingID,
    pub user_id: UserID,
    pub name: Name,
    pub description: Option<Description>,
    pub notes: Option<LongNotes>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrainingID(Uuid);

impl TrainingID {
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

impl From<Uuid> for TrainingID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TrainingID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExercise {
    pub id: TrainingExerciseID,
    pub training_id: TrainingID,
    pub exercise_id: ExerciseID,
    pub order_index: u32,
    pub default_sets: Option<DefaultSets>,
    pub default_reps: Option<Reps>,
    pub default_rest_seconds: DefaultRestSeconds,
    pub notes: Option<Notes>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrainingExerciseID(Uuid);

impl TrainingExerciseID {
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

impl From<Uuid> for TrainingExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TrainingExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Payload for attaching an exercise to a training.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrainingExercise {
    pub exercise_id: ExerciseID,
    pub default_sets: Option<DefaultSets>,
    pub default_reps: Option<Reps>,
    pub default_rest_seconds: Option<DefaultRestSeconds>,
    pub notes: Option<Notes>,
}

/// Partial update of a training exercise's defaults and notes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrainingExercisePatch {
    pub default_sets: Patch<DefaultSets>,
    pub default_reps: Patch<Reps>,
    pub default_rest_seconds: Option<DefaultRestSeconds>,
    pub notes: Patch<Notes>,
}

impl TrainingExercisePatch {
    pub fn apply(self, training_exercise: &mut TrainingExercise) {
        training_exercise.default_sets = self
            .default_sets
            .resolve(training_exercise.default_sets.take());
        training_exercise.default_reps = self
            .default_reps
            .resolve(training_exercise.default_reps.take());
        if let Some(default_rest_seconds) = self.default_rest_seconds {
            training_exercise.default_rest_seconds = default_rest_seconds;
        }
        training_exercise.notes = self.notes.resolve(training_exercise.notes.take());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOverview {
    pub training: Training,
    pub exercise_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingDetail {
    pub training: Training,
    pub exercises: Vec<(TrainingExercise, Exercise)>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrainingFilter {
    pub search: String,
}

impl TrainingFilter {
    #[must_use]
    pub fn matches(&self, training: &Training) -> bool {
        training
            .name
            .as_ref()
            .to_lowercase()
            .contains(self.search.to_lowercase().trim())
    }
}

/// Order index for a newly attached exercise.
#[must_use]
pub fn next_order_index(training_exercises: &[TrainingExercise]) -> u32 {
    training_exercises
        .iter()
        .map(|e| e.order_index)
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn training_exercise(order_index: u32) -> TrainingExercise {
        TrainingExercise {
            id: TrainingExerciseID::new(),
            training_id: 1.into(),
            exercise_id: 1.into(),
            order_index,
            default_sets: None,
            default_reps: None,
            default_rest_seconds: DefaultRestSeconds::default(),
            notes: None,
        }
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[0], 1)]
    #[case(&[0, 1, 2], 3)]
    #[case(&[2, 0, 5], 6)]
    fn test_next_order_index(#[case] indices: &[u32], #[case] expected: u32) {
        let training_exercises = indices
            .iter()
            .map(|i| training_exercise(*i))
            .collect::<Vec<_>>();
        assert_eq!(next_order_index(&training_exercises), expected);
    }

    #[test]
    fn test_training_exercise_patch_apply() {
        let mut training_exercise = training_exercise(0);
        training_exercise.default_sets = Some(DefaultSets::new(3).unwrap());
        training_exercise.notes = Some(Notes::new("old").unwrap());

        TrainingExercisePatch {
            default_sets: Patch::Keep,
            default_reps: Patch::Set(Reps::new(8).unwrap()),
            default_rest_seconds: Some(DefaultRestSeconds::new(120).unwrap()),
            notes: Patch::Clear,
        }
        .apply(&mut training_exercise);

        assert_eq!(training_exercise.default_sets, Some(DefaultSets::new(3).unwrap()));
        assert_eq!(training_exercise.default_reps, Some(Reps::new(8).unwrap()));
        assert_eq!(
            training_exercise.default_rest_seconds,
            DefaultRestSeconds::new(120).unwrap()
        );
        assert_eq!(training_exercise.notes, None);
    }

    #[rstest]
    #[case("", true)]
    #[case("push", true)]
    #[case("PUSH", true)]
    #[case("pull", false)]
    fn test_training_filter_matches(#[case] search: &str, #[case] expected: bool) {
        let training = Training {
            id: 1.into(),
            user_id: 1.into(),
            name: Name::new("Push Day").unwrap(),
            description: None,
            notes: None,
            updated_at: DateTime::<Utc>::MIN_UTC,
        };
        let filter = TrainingFilter {
            search: search.to_string(),
        };
        assert_eq!(filter.matches(&training), expected);
    }

    #[test]
    fn test_training_id_nil() {
        assert!(TrainingID::nil().is_nil());
        assert_eq!(TrainingID::nil(), TrainingID::default());
    }
}
