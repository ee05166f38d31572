use derive_more::Deref;
use strum::{Display, EnumIter};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Description, Name, Patch, ReadError, UpdateError, UserID,
    ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(
        &self,
        user_id: UserID,
        filter: &ExerciseFilter,
    ) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, user_id: UserID, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        user_id: UserID,
        name: Name,
        description: Option<Description>,
        exercise_type: ExerciseType,
        muscle_group: Option<Name>,
    ) -> Result<Exercise, CreateError>;
    async fn modify_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
        name: Option<Name>,
        description: Patch<Description>,
        exercise_type: Option<ExerciseType>,
        muscle_group: Patch<Name>,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
    ) -> Result<ExerciseID, DeleteError>;

    async fn validate_exercise_name(
        &self,
        user_id: UserID,
        name: &str,
        id: ExerciseID,
    ) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_exercises(user_id, &ExerciseFilter::default()).await {
                Ok(exercises) => {
                    if exercises.iter().all(|e| e.id == id || e.name != name) {
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
pub trait ExerciseRepository {
    async fn read_exercises(&self, user_id: UserID) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub user_id: UserID,
    pub name: Name,
    pub description: Option<Description>,
    pub exercise_type: ExerciseType,
    pub muscle_group: Option<Name>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
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

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Display, EnumIter, Clone, Copy, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
    Other,
}

impl TryFrom<&str> for ExerciseType {
    type Error = ExerciseTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "strength" => Ok(ExerciseType::Strength),
            "cardio" => Ok(ExerciseType::Cardio),
            "flexibility" => Ok(ExerciseType::Flexibility),
            "other" => Ok(ExerciseType::Other),
            _ => Err(ExerciseTypeError::Invalid),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseTypeError {
    #[error("Exercise type must be one of strength, cardio, flexibility, other")]
    Invalid,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseFilter {
    pub search: String,
    pub exercise_type: Option<ExerciseType>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        exercise
            .name
            .as_ref()
            .to_lowercase()
            .contains(self.search.to_lowercase().trim())
            && self
                .exercise_type
                .is_none_or(|t| t == exercise.exercise_type)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.exercise_type.is_none()
    }
}
