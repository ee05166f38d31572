use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use robur_domain::{
    self as domain, ExerciseRepository, StatisticsRepository, TrainingRepository,
    TrainingSessionRepository, UserRepository,
};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!();

/// SQLite-backed implementation of the domain repositories.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(url: &str) -> Result<Self, domain::StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(corrupt)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|_| domain::StorageError::NoConnection)?;
        MIGRATOR.run(&pool).await.map_err(corrupt)?;
        log::debug!("database opened and migrated: {url}");
        Ok(Self { pool })
    }

    /// An in-memory database for tests and local experimentation. The pool is
    /// limited to a single connection, as every connection would otherwise
    /// get its own empty database.
    pub async fn in_memory() -> Result<Self, domain::StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(corrupt)?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|_| domain::StorageError::NoConnection)?;
        MIGRATOR.run(&pool).await.map_err(corrupt)?;
        Ok(Self { pool })
    }
}

fn storage(err: sqlx::Error) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

fn corrupt(err: impl std::error::Error + 'static) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

fn create_error(err: sqlx::Error) -> domain::CreateError {
    if is_unique_violation(&err) {
        domain::CreateError::Conflict
    } else {
        domain::CreateError::Storage(storage(err))
    }
}

fn update_error(err: sqlx::Error) -> domain::UpdateError {
    if is_unique_violation(&err) {
        domain::UpdateError::Conflict
    } else {
        domain::UpdateError::Storage(storage(err))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn parse_uuid(value: &str) -> Result<Uuid, domain::StorageError> {
    Uuid::parse_str(value).map_err(corrupt)
}

fn index_from_row(value: i64) -> Result<u32, domain::StorageError> {
    u32::try_from(value).map_err(corrupt)
}

fn reps_from_row(value: Option<i64>) -> Result<Option<domain::Reps>, domain::StorageError> {
    value
        .map(|v| {
            u32::try_from(v)
                .map_err(corrupt)
                .and_then(|v| domain::Reps::new(v).map_err(corrupt))
        })
        .transpose()
}

fn weight_from_row(value: Option<f64>) -> Result<Option<domain::Weight>, domain::StorageError> {
    value
        .map(|v| domain::Weight::new(v).map_err(corrupt))
        .transpose()
}

fn notes_from_row(value: Option<String>) -> Result<Option<domain::Notes>, domain::StorageError> {
    value
        .map(|v| domain::Notes::new(&v).map_err(corrupt))
        .transpose()
}

#[derive(FromRow)]
struct ExerciseRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    exercise_type: String,
    muscle_group: Option<String>,
}

impl TryFrom<ExerciseRow> for domain::Exercise {
    type Error = domain::StorageError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(domain::Exercise {
            id: parse_uuid(&row.id)?.into(),
            user_id: parse_uuid(&row.user_id)?.into(),
            name: domain::Name::new(&row.name).map_err(corrupt)?,
            description: row
                .description
                .map(|v| domain::Description::new(&v).map_err(corrupt))
                .transpose()?,
            exercise_type: domain::ExerciseType::try_from(row.exercise_type.as_str())
                .map_err(corrupt)?,
            muscle_group: row
                .muscle_group
                .map(|v| domain::Name::new(&v).map_err(corrupt))
                .transpose()?,
        })
    }
}

#[derive(FromRow)]
struct TrainingRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    notes: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TrainingRow> for domain::Training {
    type Error = domain::StorageError;

    fn try_from(row: TrainingRow) -> Result<Self, Self::Error> {
        Ok(domain::Training {
            id: parse_uuid(&row.id)?.into(),
            user_id: parse_uuid(&row.user_id)?.into(),
            name: domain::Name::new(&row.name).map_err(corrupt)?,
            description: row
                .description
                .map(|v| domain::Description::new(&v).map_err(corrupt))
                .transpose()?,
            notes: row
                .notes
                .map(|v| domain::LongNotes::new(&v).map_err(corrupt))
                .transpose()?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TrainingExerciseRow {
    id: String,
    training_id: String,
    exercise_id: String,
    order_index: i64,
    default_sets: Option<i64>,
    default_reps: Option<i64>,
    default_rest_seconds: i64,
    notes: Option<String>,
}

impl TryFrom<TrainingExerciseRow> for domain::TrainingExercise {
    type Error = domain::StorageError;

    fn try_from(row: TrainingExerciseRow) -> Result<Self, Self::Error> {
        Ok(domain::TrainingExercise {
            id: parse_uuid(&row.id)?.into(),
            training_id: parse_uuid(&row.training_id)?.into(),
            exercise_id: parse_uuid(&row.exercise_id)?.into(),
            order_index: index_from_row(row.order_index)?,
            default_sets: row
                .default_sets
                .map(|v| {
                    u32::try_from(v)
                        .map_err(corrupt)
                        .and_then(|v| domain::DefaultSets::new(v).map_err(corrupt))
                })
                .transpose()?,
            default_reps: reps_from_row(row.default_reps)?,
            default_rest_seconds: u32::try_from(row.default_rest_seconds)
                .map_err(corrupt)
                .and_then(|v| domain::DefaultRestSeconds::new(v).map_err(corrupt))?,
            notes: notes_from_row(row.notes)?,
        })
    }
}

#[derive(FromRow)]
struct TrainingSessionRow {
    id: String,
    user_id: String,
    training_id: Option<String>,
    name: String,
    notes: Option<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TrainingSessionRow> for domain::TrainingSession {
    type Error = domain::StorageError;

    fn try_from(row: TrainingSessionRow) -> Result<Self, Self::Error> {
        Ok(domain::TrainingSession {
            id: parse_uuid(&row.id)?.into(),
            user_id: parse_uuid(&row.user_id)?.into(),
            training_id: row
                .training_id
                .map(|v| parse_uuid(&v).map(Into::into))
                .transpose()?,
            name: domain::Name::new(&row.name).map_err(corrupt)?,
            notes: row
                .notes
                .map(|v| domain::LongNotes::new(&v).map_err(corrupt))
                .transpose()?,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(FromRow)]
struct SessionExerciseRow {
    id: String,
    session_id: String,
    exercise_id: String,
    order_index: i64,
    notes: Option<String>,
}

impl TryFrom<SessionExerciseRow> for domain::SessionExercise {
    type Error = domain::StorageError;

    fn try_from(row: SessionExerciseRow) -> Result<Self, Self::Error> {
        Ok(domain::SessionExercise {
            id: parse_uuid(&row.id)?.into(),
            session_id: parse_uuid(&row.session_id)?.into(),
            exercise_id: parse_uuid(&row.exercise_id)?.into(),
            order_index: index_from_row(row.order_index)?,
            notes: notes_from_row(row.notes)?,
        })
    }
}

#[derive(FromRow)]
struct SessionSetRow {
    id: String,
    session_exercise_id: String,
    set_index: i64,
    reps: Option<i64>,
    weight: Option<f64>,
    duration_seconds: Option<i64>,
    distance: Option<f64>,
    rest_seconds_actual: Option<i64>,
    notes: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionSetRow> for domain::SessionSet {
    type Error = domain::StorageError;

    fn try_from(row: SessionSetRow) -> Result<Self, Self::Error> {
        Ok(domain::SessionSet {
            id: parse_uuid(&row.id)?.into(),
            session_exercise_id: parse_uuid(&row.session_exercise_id)?.into(),
            set_index: index_from_row(row.set_index)?,
            reps: reps_from_row(row.reps)?,
            weight: weight_from_row(row.weight)?,
            duration_seconds: row
                .duration_seconds
                .map(|v| {
                    u32::try_from(v)
                        .map_err(corrupt)
                        .and_then(|v| domain::DurationSeconds::new(v).map_err(corrupt))
                })
                .transpose()?,
            distance: row
                .distance
                .map(|v| domain::Distance::new(v).map_err(corrupt))
                .transpose()?,
            rest_seconds_actual: row
                .rest_seconds_actual
                .map(|v| {
                    u32::try_from(v)
                        .map_err(corrupt)
                        .and_then(|v| domain::RestSeconds::new(v).map_err(corrupt))
                })
                .transpose()?,
            notes: notes_from_row(row.notes)?,
            completed_at: row.completed_at,
        })
    }
}

#[derive(FromRow)]
struct HistoryRow {
    session_id: String,
    session_name: String,
    started_at: DateTime<Utc>,
    session_completed_at: Option<DateTime<Utc>>,
    set_id: Option<String>,
    reps: Option<i64>,
    weight: Option<f64>,
    rest_seconds_actual: Option<i64>,
    set_completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<HistoryRow> for domain::ExerciseHistoryRow {
    type Error = domain::StorageError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let set = if row.set_id.is_some() {
            Some(domain::HistorySet {
                reps: reps_from_row(row.reps)?,
                weight: weight_from_row(row.weight)?,
                rest_seconds_actual: row
                    .rest_seconds_actual
                    .map(|v| {
                        u32::try_from(v)
                            .map_err(corrupt)
                            .and_then(|v| domain::RestSeconds::new(v).map_err(corrupt))
                    })
                    .transpose()?,
                completed_at: row.set_completed_at,
            })
        } else {
            None
        };
        Ok(domain::ExerciseHistoryRow {
            session_id: parse_uuid(&row.session_id)?.into(),
            session_name: domain::Name::new(&row.session_name).map_err(corrupt)?,
            started_at: row.started_at,
            session_completed_at: row.session_completed_at,
            set,
        })
    }
}

impl UserRepository for SqliteStorage {
    async fn read_user(&self, id: domain::UserID) -> Result<domain::User, domain::ReadError> {
        let row = sqlx::query_as::<_, (String, String)>("SELECT id, name FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or(domain::ReadError::NotFound)?;
        Ok(domain::User {
            id: parse_uuid(&row.0)?.into(),
            name: domain::Name::new(&row.1).map_err(corrupt)?,
        })
    }

    async fn create_user(&self, user: domain::User) -> Result<domain::User, domain::CreateError> {
        sqlx::query("INSERT INTO users (id, name) VALUES (?, ?)")
            .bind(user.id.to_string())
            .bind(user.name.to_string())
            .execute(&self.pool)
            .await
            .map_err(create_error)?;
        Ok(user)
    }
}

impl ExerciseRepository for SqliteStorage {
    async fn read_exercises(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let rows = sqlx::query_as::<_, ExerciseRow>(
            "SELECT id, user_id, name, description, exercise_type, muscle_group \
             FROM exercises WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        let row = sqlx::query_as::<_, ExerciseRow>(
            "SELECT id, user_id, name, description, exercise_type, muscle_group \
             FROM exercises WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        sqlx::query(
            "INSERT INTO exercises (id, user_id, name, description, exercise_type, muscle_group) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(exercise.id.to_string())
        .bind(exercise.user_id.to_string())
        .bind(exercise.name.to_string())
        .bind(exercise.description.as_ref().map(ToString::to_string))
        .bind(exercise.exercise_type.to_string())
        .bind(exercise.muscle_group.as_ref().map(ToString::to_string))
        .execute(&self.pool)
        .await
        .map_err(create_error)?;
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let result = sqlx::query(
            "UPDATE exercises SET name = ?, description = ?, exercise_type = ?, muscle_group = ? \
             WHERE id = ?",
        )
        .bind(exercise.name.to_string())
        .bind(exercise.description.as_ref().map(ToString::to_string))
        .bind(exercise.exercise_type.to_string())
        .bind(exercise.muscle_group.as_ref().map(ToString::to_string))
        .bind(exercise.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(update_error)?;
        if result.rows_affected() == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(exercise)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(domain::DeleteError::NotFound);
        }
        Ok(id)
    }
}

impl TrainingRepository for SqliteStorage {
    async fn read_trainings(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::Training>, domain::ReadError> {
        let rows = sqlx::query_as::<_, TrainingRow>(
            "SELECT id, user_id, name, description, notes, updated_at \
             FROM trainings WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_training(
        &self,
        id: domain::TrainingID,
    ) -> Result<domain::Training, domain::ReadError> {
        let row = sqlx::query_as::<_, TrainingRow>(
            "SELECT id, user_id, name, description, notes, updated_at \
             FROM trainings WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn read_training_exercise_counts(
        &self,
        user_id: domain::UserID,
    ) -> Result<BTreeMap<domain::TrainingID, u32>, domain::ReadError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT te.training_id, COUNT(*) \
             FROM training_exercises te \
             JOIN trainings t ON te.training_id = t.id \
             WHERE t.user_id = ? \
             GROUP BY te.training_id",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        let mut counts = BTreeMap::new();
        for (training_id, count) in rows {
            counts.insert(
                parse_uuid(&training_id)?.into(),
                index_from_row(count)?,
            );
        }
        Ok(counts)
    }

    async fn create_training(
        &self,
        training: domain::Training,
    ) -> Result<domain::Training, domain::CreateError> {
        sqlx::query(
            "INSERT INTO trainings (id, user_id, name, description, notes, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(training.id.to_string())
        .bind(training.user_id.to_string())
        .bind(training.name.to_string())
        .bind(training.description.as_ref().map(ToString::to_string))
        .bind(training.notes.as_ref().map(ToString::to_string))
        .bind(training.updated_at)
        .execute(&self.pool)
        .await
        .map_err(create_error)?;
        Ok(training)
    }

    async fn replace_training(
        &self,
        training: domain::Training,
    ) -> Result<domain::Training, domain::UpdateError> {
        let result = sqlx::query(
            "UPDATE trainings SET name = ?, description = ?, notes = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(training.name.to_string())
        .bind(training.description.as_ref().map(ToString::to_string))
        .bind(training.notes.as_ref().map(ToString::to_string))
        .bind(training.updated_at)
        .bind(training.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(update_error)?;
        if result.rows_affected() == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(training)
    }

    async fn delete_training(
        &self,
        id: domain::TrainingID,
    ) -> Result<domain::TrainingID, domain::DeleteError> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(domain::DeleteError::NotFound);
        }
        Ok(id)
    }

    async fn read_training_exercises(
        &self,
        training_id: domain::TrainingID,
    ) -> Result<Vec<domain::TrainingExercise>, domain::ReadError> {
        let rows = sqlx::query_as::<_, TrainingExerciseRow>(
            "SELECT id, training_id, exercise_id, order_index, default_sets, default_reps, \
             default_rest_seconds, notes \
             FROM training_exercises WHERE training_id = ? ORDER BY order_index",
        )
        .bind(training_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_training_exercise(
        &self,
        id: domain::TrainingExerciseID,
    ) -> Result<domain::TrainingExercise, domain::ReadError> {
        let row = sqlx::query_as::<_, TrainingExerciseRow>(
            "SELECT id, training_id, exercise_id, order_index, default_sets, default_reps, \
             default_rest_seconds, notes \
             FROM training_exercises WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn create_training_exercise(
        &self,
        training_exercise: domain::TrainingExercise,
    ) -> Result<domain::TrainingExercise, domain::CreateError> {
        sqlx::query(
            "INSERT INTO training_exercises \
             (id, training_id, exercise_id, order_index, default_sets, default_reps, \
              default_rest_seconds, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(training_exercise.id.to_string())
        .bind(training_exercise.training_id.to_string())
        .bind(training_exercise.exercise_id.to_string())
        .bind(i64::from(training_exercise.order_index))
        .bind(
            training_exercise
                .default_sets
                .map(|v| i64::from(u32::from(v))),
        )
        .bind(
            training_exercise
                .default_reps
                .map(|v| i64::from(u32::from(v))),
        )
        .bind(i64::from(u32::from(training_exercise.default_rest_seconds)))
        .bind(training_exercise.notes.as_ref().map(ToString::to_string))
        .execute(&self.pool)
        .await
        .map_err(create_error)?;
        Ok(training_exercise)
    }

    async fn replace_training_exercise(
        &self,
        training_exercise: domain::TrainingExercise,
    ) -> Result<domain::TrainingExercise, domain::UpdateError> {
        let result = sqlx::query(
            "UPDATE training_exercises SET order_index = ?, default_sets = ?, default_reps = ?, \
             default_rest_seconds = ?, notes = ? \
             WHERE id = ?",
        )
        .bind(i64::from(training_exercise.order_index))
        .bind(
            training_exercise
                .default_sets
                .map(|v| i64::from(u32::from(v))),
        )
        .bind(
            training_exercise
                .default_reps
                .map(|v| i64::from(u32::from(v))),
        )
        .bind(i64::from(u32::from(training_exercise.default_rest_seconds)))
        .bind(training_exercise.notes.as_ref().map(ToString::to_string))
        .bind(training_exercise.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(update_error)?;
        if result.rows_affected() == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(training_exercise)
    }

    async fn delete_training_exercise(
        &self,
        id: domain::TrainingExerciseID,
    ) -> Result<domain::TrainingExerciseID, domain::DeleteError> {
        let result = sqlx::query("DELETE FROM training_exercises WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(domain::DeleteError::NotFound);
        }
        Ok(id)
    }

    async fn reorder_training_exercises(
        &self,
        training_id: domain::TrainingID,
        order: &[(domain::TrainingExerciseID, u32)],
    ) -> Result<Vec<domain::TrainingExercise>, domain::UpdateError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        for (id, order_index) in order {
            let result = sqlx::query(
                "UPDATE training_exercises SET order_index = ? WHERE id = ? AND training_id = ?",
            )
            .bind(i64::from(*order_index))
            .bind(id.to_string())
            .bind(training_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(update_error)?;
            if result.rows_affected() == 0 {
                return Err(domain::UpdateError::NotFound);
            }
        }
        tx.commit().await.map_err(storage)?;

        Ok(self.read_training_exercises(training_id).await?)
    }
}

impl TrainingSessionRepository for SqliteStorage {
    async fn read_training_session(
        &self,
        id: domain::TrainingSessionID,
    ) -> Result<domain::TrainingSession, domain::ReadError> {
        let row = sqlx::query_as::<_, TrainingSessionRow>(
            "SELECT id, user_id, training_id, name, notes, started_at, completed_at \
             FROM training_sessions WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn create_training_session(
        &self,
        session: domain::TrainingSession,
        session_exercises: Vec<domain::SessionExercise>,
    ) -> Result<domain::TrainingSession, domain::CreateError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        sqlx::query(
            "INSERT INTO training_sessions \
             (id, user_id, training_id, name, notes, started_at, completed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.training_id.map(|v| v.to_string()))
        .bind(session.name.to_string())
        .bind(session.notes.as_ref().map(ToString::to_string))
        .bind(session.started_at)
        .bind(session.completed_at)
        .execute(&mut *tx)
        .await
        .map_err(create_error)?;

        for session_exercise in &session_exercises {
            sqlx::query(
                "INSERT INTO session_exercises (id, session_id, exercise_id, order_index, notes) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(session_exercise.id.to_string())
            .bind(session_exercise.session_id.to_string())
            .bind(session_exercise.exercise_id.to_string())
            .bind(i64::from(session_exercise.order_index))
            .bind(session_exercise.notes.as_ref().map(ToString::to_string))
            .execute(&mut *tx)
            .await
            .map_err(create_error)?;
        }
        tx.commit().await.map_err(storage)?;
        Ok(session)
    }

    async fn replace_training_session(
        &self,
        session: domain::TrainingSession,
    ) -> Result<domain::TrainingSession, domain::UpdateError> {
        let result = sqlx::query(
            "UPDATE training_sessions SET name = ?, notes = ?, completed_at = ? WHERE id = ?",
        )
        .bind(session.name.to_string())
        .bind(session.notes.as_ref().map(ToString::to_string))
        .bind(session.completed_at)
        .bind(session.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(update_error)?;
        if result.rows_affected() == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(session)
    }

    async fn read_session_exercises(
        &self,
        session_id: domain::TrainingSessionID,
    ) -> Result<Vec<domain::SessionExercise>, domain::ReadError> {
        let rows = sqlx::query_as::<_, SessionExerciseRow>(
            "SELECT id, session_id, exercise_id, order_index, notes \
             FROM session_exercises WHERE session_id = ? ORDER BY order_index",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_session_exercise(
        &self,
        id: domain::SessionExerciseID,
    ) -> Result<domain::SessionExercise, domain::ReadError> {
        let row = sqlx::query_as::<_, SessionExerciseRow>(
            "SELECT id, session_id, exercise_id, order_index, notes \
             FROM session_exercises WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn read_session_sets(
        &self,
        session_exercise_id: domain::SessionExerciseID,
    ) -> Result<Vec<domain::SessionSet>, domain::ReadError> {
        let rows = sqlx::query_as::<_, SessionSetRow>(
            "SELECT id, session_exercise_id, set_index, reps, weight, duration_seconds, \
             distance, rest_seconds_actual, notes, completed_at \
             FROM session_sets WHERE session_exercise_id = ? ORDER BY set_index",
        )
        .bind(session_exercise_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_session_set(
        &self,
        id: domain::SessionSetID,
    ) -> Result<domain::SessionSet, domain::ReadError> {
        let row = sqlx::query_as::<_, SessionSetRow>(
            "SELECT id, session_exercise_id, set_index, reps, weight, duration_seconds, \
             distance, rest_seconds_actual, notes, completed_at \
             FROM session_sets WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(domain::ReadError::NotFound)?;
        Ok(row.try_into()?)
    }

    async fn create_session_set(
        &self,
        set: domain::SessionSet,
    ) -> Result<domain::SessionSet, domain::CreateError> {
        sqlx::query(
            "INSERT INTO session_sets \
             (id, session_exercise_id, set_index, reps, weight, duration_seconds, distance, \
              rest_seconds_actual, notes, completed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(set.id.to_string())
        .bind(set.session_exercise_id.to_string())
        .bind(i64::from(set.set_index))
        .bind(set.reps.map(|v| i64::from(u32::from(v))))
        .bind(set.weight.map(f64::from))
        .bind(set.duration_seconds.map(|v| i64::from(u32::from(v))))
        .bind(set.distance.map(f64::from))
        .bind(set.rest_seconds_actual.map(|v| i64::from(u32::from(v))))
        .bind(set.notes.as_ref().map(ToString::to_string))
        .bind(set.completed_at)
        .execute(&self.pool)
        .await
        .map_err(create_error)?;
        Ok(set)
    }

    async fn replace_session_set(
        &self,
        set: domain::SessionSet,
    ) -> Result<domain::SessionSet, domain::UpdateError> {
        let result = sqlx::query(
            "UPDATE session_sets SET reps = ?, weight = ?, duration_seconds = ?, distance = ?, \
             rest_seconds_actual = ?, notes = ?, completed_at = ? \
             WHERE id = ?",
        )
        .bind(set.reps.map(|v| i64::from(u32::from(v))))
        .bind(set.weight.map(f64::from))
        .bind(set.duration_seconds.map(|v| i64::from(u32::from(v))))
        .bind(set.distance.map(f64::from))
        .bind(set.rest_seconds_actual.map(|v| i64::from(u32::from(v))))
        .bind(set.notes.as_ref().map(ToString::to_string))
        .bind(set.completed_at)
        .bind(set.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(update_error)?;
        if result.rows_affected() == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(set)
    }

    async fn delete_session_set(
        &self,
        id: domain::SessionSetID,
    ) -> Result<Vec<domain::SessionSet>, domain::DeleteError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let target = sqlx::query_as::<_, (String, i64)>(
            "SELECT session_exercise_id, set_index FROM session_sets WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or(domain::DeleteError::NotFound)?;
        let (session_exercise_id, set_index) = target;

        sqlx::query("DELETE FROM session_sets WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        sqlx::query(
            "UPDATE session_sets SET set_index = set_index - 1 \
             WHERE session_exercise_id = ? AND set_index > ?",
        )
        .bind(&session_exercise_id)
        .bind(set_index)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        let session_exercise_id = parse_uuid(&session_exercise_id)?;
        Ok(self.read_session_sets(session_exercise_id.into()).await?)
    }
}

impl StatisticsRepository for SqliteStorage {
    async fn read_exercise_history(
        &self,
        user_id: domain::UserID,
        exercise_id: domain::ExerciseID,
    ) -> Result<Vec<domain::ExerciseHistoryRow>, domain::ReadError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT s.id AS session_id, s.name AS session_name, s.started_at, \
             s.completed_at AS session_completed_at, \
             ss.id AS set_id, ss.reps, ss.weight, ss.rest_seconds_actual, \
             ss.completed_at AS set_completed_at \
             FROM session_exercises se \
             JOIN training_sessions s ON se.session_id = s.id \
             LEFT JOIN session_sets ss ON ss.session_exercise_id = se.id \
             WHERE se.exercise_id = ? AND s.user_id = ? \
             ORDER BY s.started_at",
        )
        .bind(exercise_id.to_string())
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
