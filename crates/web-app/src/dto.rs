//! Data Transfer Objects for the HTTP API.
//!
//! Payloads convert into domain value types at this boundary; every rejected
//! field is collected so the response can carry a per-field message map.

use chrono::{DateTime, NaiveDate, Utc};
use robur_domain as domain;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Deserialize a field that distinguishes "absent" (keep) from "null" (clear).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Collects per-field validation failures while a payload is converted into
/// domain values.
#[derive(Default)]
struct Validator {
    errors: Vec<domain::ValidationError>,
}

impl Validator {
    fn field<T, E: std::fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(domain::ValidationError::field(field, err));
                None
            }
        }
    }

    fn patch<T, E: std::fmt::Display>(
        &mut self,
        field: &str,
        value: Option<Option<String>>,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> domain::Patch<T> {
        match value {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(value)) => self
                .field(field, parse(&value))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        }
    }

    fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

fn reps_from_payload(value: i64) -> Result<domain::Reps, domain::RepsError> {
    u32::try_from(value)
        .map_err(|_| domain::RepsError::OutOfRange)
        .and_then(domain::Reps::new)
}

fn duration_from_payload(
    value: i64,
) -> Result<domain::DurationSeconds, domain::DurationSecondsError> {
    u32::try_from(value)
        .map_err(|_| domain::DurationSecondsError::OutOfRange)
        .and_then(domain::DurationSeconds::new)
}

fn rest_from_payload(value: i64) -> Result<domain::RestSeconds, domain::RestSecondsError> {
    u32::try_from(value)
        .map_err(|_| domain::RestSecondsError::OutOfRange)
        .and_then(domain::RestSeconds::new)
}

fn default_sets_from_payload(value: i64) -> Result<domain::DefaultSets, domain::DefaultSetsError> {
    u32::try_from(value)
        .map_err(|_| domain::DefaultSetsError::OutOfRange)
        .and_then(domain::DefaultSets::new)
}

fn default_rest_from_payload(
    value: i64,
) -> Result<domain::DefaultRestSeconds, domain::DefaultRestSecondsError> {
    u32::try_from(value)
        .map_err(|_| domain::DefaultRestSecondsError::OutOfRange)
        .and_then(domain::DefaultRestSeconds::new)
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "type")]
    pub exercise_type: Option<String>,
}

impl ExerciseListQuery {
    pub fn parse(self) -> Result<domain::ExerciseFilter, AppError> {
        let mut validator = Validator::default();
        let exercise_type = self
            .exercise_type
            .filter(|t| !t.is_empty())
            .and_then(|t| validator.field("type", domain::ExerciseType::try_from(t.as_str())));
        validator.finish()?;
        Ok(domain::ExerciseFilter {
            search: self.search.unwrap_or_default(),
            exercise_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreExercisePayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub exercise_type: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
}

pub struct ExerciseFields {
    pub name: domain::Name,
    pub description: Option<domain::Description>,
    pub exercise_type: domain::ExerciseType,
    pub muscle_group: Option<domain::Name>,
}

impl StoreExercisePayload {
    pub fn parse(self) -> Result<ExerciseFields, AppError> {
        let mut validator = Validator::default();
        let name = validator.field("name", domain::Name::new(&self.name));
        let description = self
            .description
            .and_then(|d| validator.field("description", domain::Description::new(&d)));
        let exercise_type = validator.field(
            "type",
            domain::ExerciseType::try_from(self.exercise_type.as_str()),
        );
        let muscle_group = self
            .muscle_group
            .and_then(|m| validator.field("muscle_group", domain::Name::new(&m)));
        validator.finish()?;
        Ok(ExerciseFields {
            name: name.expect("validated"),
            description,
            exercise_type: exercise_type.expect("validated"),
            muscle_group,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateExercisePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, rename = "type")]
    pub exercise_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub muscle_group: Option<Option<String>>,
}

pub struct ExercisePatch {
    pub name: Option<domain::Name>,
    pub description: domain::Patch<domain::Description>,
    pub exercise_type: Option<domain::ExerciseType>,
    pub muscle_group: domain::Patch<domain::Name>,
}

impl UpdateExercisePayload {
    pub fn parse(self) -> Result<ExercisePatch, AppError> {
        let mut validator = Validator::default();
        let name = self
            .name
            .and_then(|n| validator.field("name", domain::Name::new(&n)));
        let description =
            validator.patch("description", self.description, |d| domain::Description::new(d));
        let exercise_type = self.exercise_type.and_then(|t| {
            validator.field("type", domain::ExerciseType::try_from(t.as_str()))
        });
        let muscle_group =
            validator.patch("muscle_group", self.muscle_group, |m| domain::Name::new(m));
        validator.finish()?;
        Ok(ExercisePatch {
            name,
            description,
            exercise_type,
            muscle_group,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ExerciseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub muscle_group: Option<String>,
}

impl From<domain::Exercise> for ExerciseDto {
    fn from(exercise: domain::Exercise) -> Self {
        ExerciseDto {
            id: *exercise.id,
            name: exercise.name.to_string(),
            description: exercise.description.map(|d| d.to_string()),
            exercise_type: exercise.exercise_type.to_string(),
            muscle_group: exercise.muscle_group.map(|m| m.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Trainings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TrainingListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreTrainingPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct TrainingFields {
    pub name: domain::Name,
    pub description: Option<domain::Description>,
    pub notes: Option<domain::LongNotes>,
}

impl StoreTrainingPayload {
    pub fn parse(self) -> Result<TrainingFields, AppError> {
        let mut validator = Validator::default();
        let name = validator.field("name", domain::Name::new(&self.name));
        let description = self
            .description
            .and_then(|d| validator.field("description", domain::Description::new(&d)));
        let notes = self
            .notes
            .and_then(|n| validator.field("notes", domain::LongNotes::new(&n)));
        validator.finish()?;
        Ok(TrainingFields {
            name: name.expect("validated"),
            description,
            notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrainingPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

pub struct TrainingPatch {
    pub name: Option<domain::Name>,
    pub description: domain::Patch<domain::Description>,
    pub notes: domain::Patch<domain::LongNotes>,
}

impl UpdateTrainingPayload {
    pub fn parse(self) -> Result<TrainingPatch, AppError> {
        let mut validator = Validator::default();
        let name = self
            .name
            .and_then(|n| validator.field("name", domain::Name::new(&n)));
        let description =
            validator.patch("description", self.description, |d| domain::Description::new(d));
        let notes = validator.patch("notes", self.notes, |n| domain::LongNotes::new(n));
        validator.finish()?;
        Ok(TrainingPatch {
            name,
            description,
            notes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TrainingDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::Training> for TrainingDto {
    fn from(training: domain::Training) -> Self {
        TrainingDto {
            id: *training.id,
            name: training.name.to_string(),
            description: training.description.map(|d| d.to_string()),
            notes: training.notes.map(|n| n.to_string()),
            updated_at: training.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainingOverviewDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub exercise_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::TrainingOverview> for TrainingOverviewDto {
    fn from(overview: domain::TrainingOverview) -> Self {
        TrainingOverviewDto {
            id: *overview.training.id,
            name: overview.training.name.to_string(),
            description: overview.training.description.map(|d| d.to_string()),
            exercise_count: overview.exercise_count,
            updated_at: overview.training.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainingDetailDto {
    #[serde(flatten)]
    pub training: TrainingDto,
    pub exercises: Vec<TrainingExerciseDto>,
}

impl From<domain::TrainingDetail> for TrainingDetailDto {
    fn from(detail: domain::TrainingDetail) -> Self {
        TrainingDetailDto {
            training: detail.training.into(),
            exercises: detail.exercises.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainingExerciseDto {
    pub id: Uuid,
    pub training_id: Uuid,
    pub order_index: u32,
    pub default_sets: Option<u32>,
    pub default_reps: Option<u32>,
    pub default_rest_seconds: u32,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<ExerciseDto>,
}

impl From<domain::TrainingExercise> for TrainingExerciseDto {
    fn from(link: domain::TrainingExercise) -> Self {
        TrainingExerciseDto {
            id: *link.id,
            training_id: *link.training_id,
            order_index: link.order_index,
            default_sets: link.default_sets.map(u32::from),
            default_reps: link.default_reps.map(u32::from),
            default_rest_seconds: link.default_rest_seconds.into(),
            notes: link.notes.map(|n| n.to_string()),
            exercise: None,
        }
    }
}

impl From<(domain::TrainingExercise, domain::Exercise)> for TrainingExerciseDto {
    fn from((link, exercise): (domain::TrainingExercise, domain::Exercise)) -> Self {
        let mut dto = TrainingExerciseDto::from(link);
        dto.exercise = Some(exercise.into());
        dto
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreTrainingExercisePayload {
    pub exercise_id: Uuid,
    #[serde(default)]
    pub default_sets: Option<i64>,
    #[serde(default)]
    pub default_reps: Option<i64>,
    #[serde(default)]
    pub default_rest_seconds: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StoreTrainingExercisePayload {
    pub fn parse(self) -> Result<domain::NewTrainingExercise, AppError> {
        let mut validator = Validator::default();
        let default_sets = self
            .default_sets
            .and_then(|v| validator.field("default_sets", default_sets_from_payload(v)));
        let default_reps = self
            .default_reps
            .and_then(|v| validator.field("default_reps", reps_from_payload(v)));
        let default_rest_seconds = self
            .default_rest_seconds
            .and_then(|v| validator.field("default_rest_seconds", default_rest_from_payload(v)));
        let notes = self
            .notes
            .and_then(|n| validator.field("notes", domain::Notes::new(&n)));
        validator.finish()?;
        Ok(domain::NewTrainingExercise {
            exercise_id: self.exercise_id.into(),
            default_sets,
            default_reps,
            default_rest_seconds,
            notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrainingExercisePayload {
    #[serde(default, deserialize_with = "double_option")]
    pub default_sets: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub default_reps: Option<Option<i64>>,
    #[serde(default)]
    pub default_rest_seconds: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateTrainingExercisePayload {
    pub fn parse(self) -> Result<domain::TrainingExercisePatch, AppError> {
        let mut validator = Validator::default();
        let default_sets = match self.default_sets {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("default_sets", default_sets_from_payload(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let default_reps = match self.default_reps {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("default_reps", reps_from_payload(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let default_rest_seconds = self
            .default_rest_seconds
            .and_then(|v| validator.field("default_rest_seconds", default_rest_from_payload(v)));
        let notes = validator.patch("notes", self.notes, |n| domain::Notes::new(n));
        validator.finish()?;
        Ok(domain::TrainingExercisePatch {
            default_sets,
            default_reps,
            default_rest_seconds,
            notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderPayload {
    pub exercises: Vec<ReorderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub order_index: i64,
}

impl ReorderPayload {
    pub fn parse(self) -> Result<Vec<(domain::TrainingExerciseID, u32)>, AppError> {
        let mut validator = Validator::default();
        let order = self
            .exercises
            .into_iter()
            .filter_map(|entry| {
                validator
                    .field(
                        "order_index",
                        u32::try_from(entry.order_index)
                            .map_err(|_| "The order index must be at least 0"),
                    )
                    .map(|order_index| (entry.id.into(), order_index))
            })
            .collect::<Vec<_>>();
        validator.finish()?;
        Ok(order)
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StoreSessionPayload {
    #[serde(default)]
    pub training_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub enum SessionRequest {
    FromTraining {
        training_id: domain::TrainingID,
        notes: Option<domain::LongNotes>,
    },
    Blank {
        name: domain::Name,
        notes: Option<domain::LongNotes>,
    },
}

impl StoreSessionPayload {
    pub fn parse(self) -> Result<SessionRequest, AppError> {
        let mut validator = Validator::default();
        let notes = self
            .notes
            .and_then(|n| validator.field("notes", domain::LongNotes::new(&n)));

        if let Some(training_id) = self.training_id {
            validator.finish()?;
            return Ok(SessionRequest::FromTraining {
                training_id: training_id.into(),
                notes,
            });
        }

        let name = match self.name {
            Some(name) => validator.field("name", domain::Name::new(&name)),
            None => {
                validator.field::<domain::Name, _>(
                    "name",
                    Err("The name field is required when no training is selected"),
                );
                None
            }
        };
        validator.finish()?;
        Ok(SessionRequest::Blank {
            name: name.expect("validated"),
            notes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SessionTrainingDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionViewDto {
    pub id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub is_in_progress: bool,
    pub training: Option<SessionTrainingDto>,
    pub exercises: Vec<SessionExerciseDto>,
}

#[derive(Debug, Serialize)]
pub struct SessionExerciseDto {
    pub id: Uuid,
    pub order_index: u32,
    pub notes: Option<String>,
    pub exercise: ExerciseDto,
    pub sets: Vec<SessionSetDto>,
}

impl From<domain::SessionView> for SessionViewDto {
    fn from(view: domain::SessionView) -> Self {
        SessionViewDto {
            id: *view.session.id,
            name: view.session.name.to_string(),
            notes: view.session.notes.as_ref().map(ToString::to_string),
            started_at: view.session.started_at,
            completed_at: view.session.completed_at,
            is_completed: view.session.is_completed(),
            is_in_progress: view.session.is_in_progress(),
            training: view.training.map(|(id, name)| SessionTrainingDto {
                id: *id,
                name: name.to_string(),
            }),
            exercises: view
                .exercises
                .into_iter()
                .map(|exercise| SessionExerciseDto {
                    id: *exercise.session_exercise.id,
                    order_index: exercise.session_exercise.order_index,
                    notes: exercise
                        .session_exercise
                        .notes
                        .as_ref()
                        .map(ToString::to_string),
                    exercise: exercise.exercise.into(),
                    sets: exercise.sets.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSetDto {
    pub id: Uuid,
    pub set_index: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<u32>,
    pub distance: Option<f64>,
    pub rest_seconds_actual: Option<u32>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

impl From<domain::SessionSet> for SessionSetDto {
    fn from(set: domain::SessionSet) -> Self {
        SessionSetDto {
            id: *set.id,
            set_index: set.set_index,
            reps: set.reps.map(u32::from),
            weight: set.weight.map(f64::from),
            duration_seconds: set.duration_seconds.map(u32::from),
            distance: set.distance.map(f64::from),
            rest_seconds_actual: set.rest_seconds_actual.map(u32::from),
            notes: set.notes.as_ref().map(ToString::to_string),
            completed_at: set.completed_at,
            is_completed: set.is_completed(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreSessionSetPayload {
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub rest_seconds_actual: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StoreSessionSetPayload {
    pub fn parse(self) -> Result<domain::NewSessionSet, AppError> {
        let mut validator = Validator::default();
        let reps = self
            .reps
            .and_then(|v| validator.field("reps", reps_from_payload(v)));
        let weight = self
            .weight
            .and_then(|v| validator.field("weight", domain::Weight::new(v)));
        let duration_seconds = self
            .duration_seconds
            .and_then(|v| validator.field("duration_seconds", duration_from_payload(v)));
        let distance = self
            .distance
            .and_then(|v| validator.field("distance", domain::Distance::new(v)));
        let rest_seconds_actual = self
            .rest_seconds_actual
            .and_then(|v| validator.field("rest_seconds_actual", rest_from_payload(v)));
        let notes = self
            .notes
            .and_then(|n| validator.field("notes", domain::Notes::new(&n)));
        validator.finish()?;
        Ok(domain::NewSessionSet {
            reps,
            weight,
            duration_seconds,
            distance,
            rest_seconds_actual,
            notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionSetPayload {
    #[serde(default, deserialize_with = "double_option")]
    pub reps: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration_seconds: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub distance: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rest_seconds_actual: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateSessionSetPayload {
    pub fn parse(self) -> Result<domain::SessionSetPatch, AppError> {
        let mut validator = Validator::default();
        let reps = match self.reps {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("reps", reps_from_payload(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let weight = match self.weight {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("weight", domain::Weight::new(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let duration_seconds = match self.duration_seconds {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("duration_seconds", duration_from_payload(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let distance = match self.distance {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("distance", domain::Distance::new(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let rest_seconds_actual = match self.rest_seconds_actual {
            None => domain::Patch::Keep,
            Some(None) => domain::Patch::Clear,
            Some(Some(v)) => validator
                .field("rest_seconds_actual", rest_from_payload(v))
                .map_or(domain::Patch::Keep, domain::Patch::Set),
        };
        let notes = validator.patch("notes", self.notes, |n| domain::Notes::new(n));
        validator.finish()?;
        Ok(domain::SessionSetPatch {
            reps,
            weight,
            duration_seconds,
            distance,
            rest_seconds_actual,
            notes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StoreSessionSetResponse {
    pub set: SessionSetDto,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionSetResponse {
    pub sets: Vec<SessionSetDto>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StoreTrainingExerciseResponse {
    pub training_exercise: TrainingExerciseDto,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub exercises: Vec<TrainingExerciseDto>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl StatsQuery {
    pub fn parse(self, today: NaiveDate) -> Result<domain::DateRange, AppError> {
        let mut validator = Validator::default();
        let start = match self.start_date {
            Some(value) => validator.field(
                "start_date",
                NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .map_err(|_| "The start date is not a valid date"),
            ),
            None => Some(domain::DateRange::last_90_days(today).start()),
        };
        let end = match self.end_date {
            Some(value) => validator.field(
                "end_date",
                NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .map_err(|_| "The end date is not a valid date"),
            ),
            None => Some(today),
        };
        validator.finish()?;

        domain::DateRange::new(start.expect("validated"), end.expect("validated"))
            .map_err(|err| domain::ValidationError::field("end_date", err).into())
    }
}

#[derive(Debug, Serialize)]
pub struct ExerciseStatsDto {
    pub exercise: ExerciseDto,
    pub filters: StatsFiltersDto,
    #[serde(rename = "maxWeightData")]
    pub max_weight_data: Vec<MaxWeightPointDto>,
    #[serde(rename = "volumeData")]
    pub volume_data: Vec<SessionVolumeDto>,
    #[serde(rename = "avgRestTime")]
    pub avg_rest_time: Option<f64>,
    #[serde(rename = "personalRecords")]
    pub personal_records: PersonalRecordsDto,
    #[serde(rename = "summaryStats")]
    pub summary_stats: SummaryStatsDto,
}

#[derive(Debug, Serialize)]
pub struct StatsFiltersDto {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct MaxWeightPointDto {
    pub date: NaiveDate,
    pub max_weight: f64,
}

#[derive(Debug, Serialize)]
pub struct SessionVolumeDto {
    pub session_id: Uuid,
    pub session_name: String,
    pub date: NaiveDate,
    pub total_volume: f64,
}

#[derive(Debug, Serialize)]
pub struct PersonalRecordsDto {
    pub max_weight: Option<WeightRecordDto>,
    pub max_reps: Option<RepsRecordDto>,
    pub max_volume: Option<VolumeRecordDto>,
}

#[derive(Debug, Serialize)]
pub struct WeightRecordDto {
    pub weight: f64,
    pub reps: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RepsRecordDto {
    pub reps: u32,
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VolumeRecordDto {
    pub reps: u32,
    pub weight: f64,
    pub volume: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStatsDto {
    pub total_sessions: u64,
    pub total_sets: u64,
    pub total_volume: f64,
}

impl ExerciseStatsDto {
    #[must_use]
    pub fn new(
        exercise: domain::Exercise,
        range: &domain::DateRange,
        stats: domain::ExerciseStats,
    ) -> Self {
        ExerciseStatsDto {
            exercise: exercise.into(),
            filters: StatsFiltersDto {
                start_date: range.start(),
                end_date: range.end(),
            },
            max_weight_data: stats
                .max_weight_by_date
                .into_iter()
                .map(|p| MaxWeightPointDto {
                    date: p.date,
                    max_weight: p.max_weight,
                })
                .collect(),
            volume_data: stats
                .volume_per_session
                .into_iter()
                .map(|v| SessionVolumeDto {
                    session_id: *v.session_id,
                    session_name: v.session_name.to_string(),
                    date: v.date,
                    total_volume: v.total_volume,
                })
                .collect(),
            avg_rest_time: stats.avg_rest_seconds,
            personal_records: PersonalRecordsDto {
                max_weight: stats.personal_records.max_weight.map(|r| WeightRecordDto {
                    weight: r.weight,
                    reps: r.reps,
                }),
                max_reps: stats.personal_records.max_reps.map(|r| RepsRecordDto {
                    reps: r.reps,
                    weight: r.weight,
                }),
                max_volume: stats.personal_records.max_volume.map(|r| VolumeRecordDto {
                    reps: r.reps,
                    weight: r.weight,
                    volume: r.volume,
                }),
            },
            summary_stats: SummaryStatsDto {
                total_sessions: stats.summary.total_sessions as u64,
                total_sets: stats.summary.total_sets as u64,
                total_volume: stats.summary.total_volume,
            },
        }
    }
}
