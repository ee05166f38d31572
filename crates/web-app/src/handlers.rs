//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the domain
//! service for business logic.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use robur_domain::{
    self as domain, ExerciseService, StatisticsService, TrainingService, TrainingSessionService,
};
use uuid::Uuid;

use crate::dto::{
    DeleteSessionSetResponse, ExerciseDto, ExerciseListQuery, ExerciseStatsDto, HealthResponse,
    ReorderPayload, ReorderResponse, SessionRequest, SessionViewDto, StatsQuery,
    StoreExercisePayload, StoreSessionPayload, StoreSessionSetPayload, StoreSessionSetResponse,
    StoreTrainingExercisePayload, StoreTrainingExerciseResponse, StoreTrainingPayload,
    TrainingDetailDto, TrainingDto, TrainingExerciseDto, TrainingListQuery, TrainingOverviewDto,
    UpdateExercisePayload, UpdateSessionSetPayload, UpdateTrainingExercisePayload,
    UpdateTrainingPayload,
};
use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
    })
}

// ===========================================================================
// Exercises
// ===========================================================================

/// GET /api/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ExerciseListQuery>,
) -> HandlerResult<Vec<ExerciseDto>> {
    let filter = query.parse()?;
    let exercises = state.service.get_exercises(user_id, &filter).await?;
    Ok(Json(exercises.into_iter().map(Into::into).collect()))
}

/// POST /api/exercises
pub async fn create_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<StoreExercisePayload>,
) -> Result<(StatusCode, Json<ExerciseDto>), AppError> {
    let fields = payload.parse()?;
    let name = state
        .service
        .validate_exercise_name(user_id, fields.name.as_ref(), domain::ExerciseID::nil())
        .await?;
    let exercise = state
        .service
        .create_exercise(
            user_id,
            name,
            fields.description,
            fields.exercise_type,
            fields.muscle_group,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(exercise.into())))
}

/// GET /api/exercises/{id}
pub async fn get_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<ExerciseDto> {
    let exercise = state.service.get_exercise(user_id, id.into()).await?;
    Ok(Json(exercise.into()))
}

/// PATCH /api/exercises/{id}
pub async fn update_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExercisePayload>,
) -> HandlerResult<ExerciseDto> {
    state.service.get_exercise(user_id, id.into()).await?;

    let patch = payload.parse()?;
    let name = match patch.name {
        Some(name) => Some(
            state
                .service
                .validate_exercise_name(user_id, name.as_ref(), id.into())
                .await?,
        ),
        None => None,
    };
    let exercise = state
        .service
        .modify_exercise(
            user_id,
            id.into(),
            name,
            patch.description,
            patch.exercise_type,
            patch.muscle_group,
        )
        .await?;
    Ok(Json(exercise.into()))
}

/// DELETE /api/exercises/{id}
pub async fn delete_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.service.delete_exercise(user_id, id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/exercises/{id}/stats
pub async fn exercise_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> HandlerResult<ExerciseStatsDto> {
    let range = query.parse(Utc::now().date_naive())?;
    let exercise = state.service.get_exercise(user_id, id.into()).await?;
    let stats = state
        .service
        .get_exercise_stats(user_id, id.into(), Some(range))
        .await?;
    Ok(Json(ExerciseStatsDto::new(exercise, &range, stats)))
}

// ===========================================================================
// Trainings
// ===========================================================================

/// GET /api/trainings
pub async fn list_trainings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<TrainingListQuery>,
) -> HandlerResult<Vec<TrainingOverviewDto>> {
    let filter = domain::TrainingFilter {
        search: query.search.unwrap_or_default(),
    };
    let trainings = state.service.get_trainings(user_id, &filter).await?;
    Ok(Json(trainings.into_iter().map(Into::into).collect()))
}

/// POST /api/trainings
pub async fn create_training(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<StoreTrainingPayload>,
) -> Result<(StatusCode, Json<TrainingDto>), AppError> {
    let fields = payload.parse()?;
    let name = state
        .service
        .validate_training_name(user_id, fields.name.as_ref(), domain::TrainingID::nil())
        .await?;
    let training = state
        .service
        .create_training(user_id, name, fields.description, fields.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(training.into())))
}

/// GET /api/trainings/{id}
pub async fn get_training(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<TrainingDetailDto> {
    let detail = state.service.get_training(user_id, id.into()).await?;
    Ok(Json(detail.into()))
}

/// PATCH /api/trainings/{id}
pub async fn update_training(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrainingPayload>,
) -> HandlerResult<TrainingDto> {
    state.service.get_training(user_id, id.into()).await?;

    let patch = payload.parse()?;
    let name = match patch.name {
        Some(name) => Some(
            state
                .service
                .validate_training_name(user_id, name.as_ref(), id.into())
                .await?,
        ),
        None => None,
    };
    let training = state
        .service
        .modify_training(user_id, id.into(), name, patch.description, patch.notes)
        .await?;
    Ok(Json(training.into()))
}

/// DELETE /api/trainings/{id}
pub async fn delete_training(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.service.delete_training(user_id, id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Training exercises
// ===========================================================================

/// POST /api/trainings/{id}/exercises
pub async fn add_training_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(training_id): Path<Uuid>,
    Json(payload): Json<StoreTrainingExercisePayload>,
) -> Result<(StatusCode, Json<StoreTrainingExerciseResponse>), AppError> {
    let new_exercise = payload.parse()?;
    let link = state
        .service
        .add_training_exercise(user_id, training_id.into(), new_exercise)
        .await?;
    let exercise = state.service.get_exercise(user_id, link.exercise_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(StoreTrainingExerciseResponse {
            training_exercise: (link, exercise).into(),
            message: "Exercise added successfully.".to_string(),
        }),
    ))
}

/// PATCH /api/training-exercises/{id}
pub async fn update_training_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrainingExercisePayload>,
) -> HandlerResult<TrainingExerciseDto> {
    let patch = payload.parse()?;
    let link = state
        .service
        .modify_training_exercise(user_id, id.into(), patch)
        .await?;
    let exercise = state.service.get_exercise(user_id, link.exercise_id).await?;
    Ok(Json((link, exercise).into()))
}

/// PATCH /api/trainings/{id}/exercises/reorder
pub async fn reorder_training_exercises(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(training_id): Path<Uuid>,
    Json(payload): Json<ReorderPayload>,
) -> HandlerResult<ReorderResponse> {
    let order = payload.parse()?;
    let links = state
        .service
        .reorder_training_exercises(user_id, training_id.into(), &order)
        .await?;
    Ok(Json(ReorderResponse {
        exercises: links.into_iter().map(Into::into).collect(),
        message: "Exercises reordered successfully.".to_string(),
    }))
}

/// DELETE /api/training-exercises/{id}
pub async fn remove_training_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .remove_training_exercise(user_id, id.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Training sessions
// ===========================================================================

/// GET /api/sessions/start
pub async fn session_start_options(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> HandlerResult<Vec<TrainingOverviewDto>> {
    let trainings = state.service.get_training_picker(user_id).await?;
    Ok(Json(trainings.into_iter().map(Into::into).collect()))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<StoreSessionPayload>,
) -> Result<(StatusCode, Json<SessionViewDto>), AppError> {
    let view = match payload.parse()? {
        SessionRequest::FromTraining { training_id, notes } => {
            state
                .service
                .start_session_from_training(user_id, training_id, notes)
                .await?
        }
        SessionRequest::Blank { name, notes } => {
            state
                .service
                .start_blank_session(user_id, name, notes)
                .await?
        }
    };
    Ok((StatusCode::CREATED, Json(view.into())))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<SessionViewDto> {
    let view = state.service.get_session(user_id, id.into()).await?;
    Ok(Json(view.into()))
}

/// PATCH /api/sessions/{id}/complete
pub async fn complete_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<SessionViewDto> {
    state.service.complete_session(user_id, id.into()).await?;
    let view = state.service.get_session(user_id, id.into()).await?;
    Ok(Json(view.into()))
}

// ===========================================================================
// Session sets
// ===========================================================================

/// POST /api/session-exercises/{id}/sets
pub async fn add_session_set(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(session_exercise_id): Path<Uuid>,
    Json(payload): Json<StoreSessionSetPayload>,
) -> Result<(StatusCode, Json<StoreSessionSetResponse>), AppError> {
    let new_set = payload.parse()?;
    let set = state
        .service
        .add_session_set(user_id, session_exercise_id.into(), new_set)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(StoreSessionSetResponse {
            set: set.into(),
            message: "Set added successfully!".to_string(),
        }),
    ))
}

/// PATCH /api/session-sets/{id}
pub async fn update_session_set(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSessionSetPayload>,
) -> HandlerResult<StoreSessionSetResponse> {
    let patch = payload.parse()?;
    let set = state
        .service
        .modify_session_set(user_id, id.into(), patch)
        .await?;
    Ok(Json(StoreSessionSetResponse {
        set: set.into(),
        message: "Set updated successfully!".to_string(),
    }))
}

/// POST /api/session-sets/{id}/complete
pub async fn complete_session_set(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<StoreSessionSetResponse> {
    let set = state
        .service
        .complete_session_set(user_id, id.into())
        .await?;
    Ok(Json(StoreSessionSetResponse {
        set: set.into(),
        message: "Set completed!".to_string(),
    }))
}

/// DELETE /api/session-sets/{id}
pub async fn delete_session_set(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> HandlerResult<DeleteSessionSetResponse> {
    let sets = state
        .service
        .delete_session_set(user_id, id.into())
        .await?;
    Ok(Json(DeleteSessionSetResponse {
        sets: sets.into_iter().map(Into::into).collect(),
        message: "Set deleted successfully!".to_string(),
    }))
}
