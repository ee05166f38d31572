use chrono::Utc;
use log::{debug, error};

use crate::{
    CreateError, DateRange, DeleteError, Description, Exercise, ExerciseFilter, ExerciseID,
    ExerciseRepository, ExerciseService, ExerciseStats, ExerciseType, LongNotes, Name,
    NewSessionSet, NewTrainingExercise, Patch, ReadError, SessionExerciseID, SessionSet,
    SessionSetID, SessionSetPatch, SessionView, StatisticsRepository, StatisticsService, Training,
    TrainingDetail, TrainingExercise, TrainingExerciseID, TrainingExercisePatch, TrainingFilter,
    TrainingID, TrainingOverview, TrainingRepository, TrainingService, TrainingSession,
    TrainingSessionID, TrainingSessionRepository, TrainingSessionService, UpdateError, User,
    UserID, UserRepository, UserService, authorize, clone_template_exercises, exercise_stats,
    next_order_index, next_set_index,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: UserRepository> UserService for Service<R> {
    async fn get_user(&self, id: UserID) -> Result<User, ReadError> {
        log_on_error!(self.repository.read_user(id), ReadError, "get", "user")
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(
        &self,
        user_id: UserID,
        filter: &ExerciseFilter,
    ) -> Result<Vec<Exercise>, ReadError> {
        let exercises = log_on_error!(
            self.repository.read_exercises(user_id),
            ReadError,
            "get",
            "exercises"
        )?;
        let mut exercises = exercises
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect::<Vec<_>>();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn get_exercise(&self, user_id: UserID, id: ExerciseID) -> Result<Exercise, ReadError> {
        let exercise = log_on_error!(
            self.repository.read_exercise(id),
            ReadError,
            "get",
            "exercise"
        )?;
        authorize(user_id, exercise.user_id)?;
        Ok(exercise)
    }

    async fn create_exercise(
        &self,
        user_id: UserID,
        name: Name,
        description: Option<Description>,
        exercise_type: ExerciseType,
        muscle_group: Option<Name>,
    ) -> Result<Exercise, CreateError> {
        let exercises = self.repository.read_exercises(user_id).await?;
        if exercises.iter().any(|e| e.name == name) {
            return Err(CreateError::Conflict);
        }

        let exercise = Exercise {
            id: ExerciseID::new(),
            user_id,
            name,
            description,
            exercise_type,
            muscle_group,
        };
        log_on_error!(
            self.repository.create_exercise(exercise),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn modify_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
        name: Option<Name>,
        description: Patch<Description>,
        exercise_type: Option<ExerciseType>,
        muscle_group: Patch<Name>,
    ) -> Result<Exercise, UpdateError> {
        let mut exercise = self.repository.read_exercise(id).await?;
        authorize(user_id, exercise.user_id)?;

        if let Some(name) = name {
            let exercises = self.repository.read_exercises(user_id).await?;
            if exercises.iter().any(|e| e.id != id && e.name == name) {
                return Err(UpdateError::Conflict);
            }
            exercise.name = name;
        }
        exercise.description = description.resolve(exercise.description.take());
        if let Some(exercise_type) = exercise_type {
            exercise.exercise_type = exercise_type;
        }
        exercise.muscle_group = muscle_group.resolve(exercise.muscle_group.take());

        log_on_error!(
            self.repository.replace_exercise(exercise),
            UpdateError,
            "modify",
            "exercise"
        )
    }

    async fn delete_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
    ) -> Result<ExerciseID, DeleteError> {
        let exercise = self.repository.read_exercise(id).await?;
        authorize(user_id, exercise.user_id)?;
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: TrainingRepository + ExerciseRepository> TrainingService for Service<R> {
    async fn get_trainings(
        &self,
        user_id: UserID,
        filter: &TrainingFilter,
    ) -> Result<Vec<TrainingOverview>, ReadError> {
        let trainings = log_on_error!(
            self.repository.read_trainings(user_id),
            ReadError,
            "get",
            "trainings"
        )?;
        let counts = self.repository.read_training_exercise_counts(user_id).await?;
        let mut trainings = trainings
            .into_iter()
            .filter(|t| filter.matches(t))
            .map(|training| {
                let exercise_count = counts.get(&training.id).copied().unwrap_or(0);
                TrainingOverview {
                    training,
                    exercise_count,
                }
            })
            .collect::<Vec<_>>();
        trainings.sort_by(|a, b| a.training.name.cmp(&b.training.name));
        Ok(trainings)
    }

    async fn get_training(
        &self,
        user_id: UserID,
        id: TrainingID,
    ) -> Result<TrainingDetail, ReadError> {
        let training = log_on_error!(
            self.repository.read_training(id),
            ReadError,
            "get",
            "training"
        )?;
        authorize(user_id, training.user_id)?;

        let mut links = self.repository.read_training_exercises(id).await?;
        links.sort_by_key(|e| e.order_index);
        let mut exercises = Vec::with_capacity(links.len());
        for link in links {
            let exercise = self.repository.read_exercise(link.exercise_id).await?;
            exercises.push((link, exercise));
        }

        Ok(TrainingDetail {
            training,
            exercises,
        })
    }

    async fn create_training(
        &self,
        user_id: UserID,
        name: Name,
        description: Option<Description>,
        notes: Option<LongNotes>,
    ) -> Result<Training, CreateError> {
        let trainings = self.repository.read_trainings(user_id).await?;
        if trainings.iter().any(|t| t.name == name) {
            return Err(CreateError::Conflict);
        }

        let training = Training {
            id: TrainingID::new(),
            user_id,
            name,
            description,
            notes,
            updated_at: Utc::now(),
        };
        log_on_error!(
            self.repository.create_training(training),
            CreateError,
            "create",
            "training"
        )
    }

    async fn modify_training(
        &self,
        user_id: UserID,
        id: TrainingID,
        name: Option<Name>,
        description: Patch<Description>,
        notes: Patch<LongNotes>,
    ) -> Result<Training, UpdateError> {
        let mut training = self.repository.read_training(id).await?;
        authorize(user_id, training.user_id)?;

        if let Some(name) = name {
            let trainings = self.repository.read_trainings(user_id).await?;
            if trainings.iter().any(|t| t.id != id && t.name == name) {
                return Err(UpdateError::Conflict);
            }
            training.name = name;
        }
        training.description = description.resolve(training.description.take());
        training.notes = notes.resolve(training.notes.take());
        training.updated_at = Utc::now();

        log_on_error!(
            self.repository.replace_training(training),
            UpdateError,
            "modify",
            "training"
        )
    }

    async fn delete_training(
        &self,
        user_id: UserID,
        id: TrainingID,
    ) -> Result<TrainingID, DeleteError> {
        let training = self.repository.read_training(id).await?;
        authorize(user_id, training.user_id)?;
        log_on_error!(
            self.repository.delete_training(id),
            DeleteError,
            "delete",
            "training"
        )
    }

    async fn add_training_exercise(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        new_exercise: NewTrainingExercise,
    ) -> Result<TrainingExercise, CreateError> {
        let training = self.repository.read_training(training_id).await?;
        authorize(user_id, training.user_id)?;

        let exercise = self.repository.read_exercise(new_exercise.exercise_id).await?;
        authorize(user_id, exercise.user_id)?;

        let links = self.repository.read_training_exercises(training_id).await?;
        let training_exercise = TrainingExercise {
            id: TrainingExerciseID::new(),
            training_id,
            exercise_id: new_exercise.exercise_id,
            order_index: next_order_index(&links),
            default_sets: new_exercise.default_sets,
            default_reps: new_exercise.default_reps,
            default_rest_seconds: new_exercise.default_rest_seconds.unwrap_or_default(),
            notes: new_exercise.notes,
        };
        log_on_error!(
            self.repository.create_training_exercise(training_exercise),
            CreateError,
            "create",
            "training exercise"
        )
    }

    async fn modify_training_exercise(
        &self,
        user_id: UserID,
        id: TrainingExerciseID,
        patch: TrainingExercisePatch,
    ) -> Result<TrainingExercise, UpdateError> {
        let mut training_exercise = self.repository.read_training_exercise(id).await?;
        let training = self
            .repository
            .read_training(training_exercise.training_id)
            .await?;
        authorize(user_id, training.user_id)?;

        patch.apply(&mut training_exercise);
        log_on_error!(
            self.repository.replace_training_exercise(training_exercise),
            UpdateError,
            "modify",
            "training exercise"
        )
    }

    async fn reorder_training_exercises(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        order: &[(TrainingExerciseID, u32)],
    ) -> Result<Vec<TrainingExercise>, UpdateError> {
        let training = self.repository.read_training(training_id).await?;
        authorize(user_id, training.user_id)?;

        let mut indices = order.iter().map(|(_, index)| *index).collect::<Vec<_>>();
        indices.sort_unstable();
        indices.dedup();
        if indices.len() != order.len() {
            return Err(UpdateError::Conflict);
        }

        log_on_error!(
            self.repository.reorder_training_exercises(training_id, order),
            UpdateError,
            "reorder",
            "training exercises"
        )
    }

    async fn remove_training_exercise(
        &self,
        user_id: UserID,
        id: TrainingExerciseID,
    ) -> Result<TrainingExerciseID, DeleteError> {
        let training_exercise = self.repository.read_training_exercise(id).await?;
        let training = self
            .repository
            .read_training(training_exercise.training_id)
            .await?;
        authorize(user_id, training.user_id)?;

        log_on_error!(
            self.repository.delete_training_exercise(id),
            DeleteError,
            "delete",
            "training exercise"
        )
    }
}

impl<R: TrainingRepository + TrainingSessionRepository + ExerciseRepository> TrainingSessionService
    for Service<R>
{
    async fn get_training_picker(
        &self,
        user_id: UserID,
    ) -> Result<Vec<TrainingOverview>, ReadError> {
        let mut trainings = self.get_trainings(user_id, &TrainingFilter::default()).await?;
        trainings.sort_by(|a, b| b.training.updated_at.cmp(&a.training.updated_at));
        Ok(trainings)
    }

    async fn start_session_from_training(
        &self,
        user_id: UserID,
        training_id: TrainingID,
        notes: Option<LongNotes>,
    ) -> Result<SessionView, CreateError> {
        let training = self.repository.read_training(training_id).await?;
        authorize(user_id, training.user_id)?;

        let mut links = self.repository.read_training_exercises(training_id).await?;
        links.sort_by_key(|e| e.order_index);

        let session = TrainingSession {
            id: TrainingSessionID::new(),
            user_id,
            training_id: Some(training_id),
            name: training.name.clone(),
            notes,
            started_at: Utc::now(),
            completed_at: None,
        };
        let session_exercises = clone_template_exercises(session.id, &links);
        let session = log_on_error!(
            self.repository
                .create_training_session(session, session_exercises),
            CreateError,
            "create",
            "training session"
        )?;

        self.get_session(user_id, session.id)
            .await
            .map_err(CreateError::from)
    }

    async fn start_blank_session(
        &self,
        user_id: UserID,
        name: Name,
        notes: Option<LongNotes>,
    ) -> Result<SessionView, CreateError> {
        let session = TrainingSession {
            id: TrainingSessionID::new(),
            user_id,
            training_id: None,
            name,
            notes,
            started_at: Utc::now(),
            completed_at: None,
        };
        let session = log_on_error!(
            self.repository.create_training_session(session, vec![]),
            CreateError,
            "create",
            "training session"
        )?;

        self.get_session(user_id, session.id)
            .await
            .map_err(CreateError::from)
    }

    async fn get_session(
        &self,
        user_id: UserID,
        id: TrainingSessionID,
    ) -> Result<SessionView, ReadError> {
        let session = log_on_error!(
            self.repository.read_training_session(id),
            ReadError,
            "get",
            "training session"
        )?;
        authorize(user_id, session.user_id)?;

        let training = match session.training_id {
            Some(training_id) => match self.repository.read_training(training_id).await {
                Ok(training) => Some((training.id, training.name)),
                Err(ReadError::NotFound) => None,
                Err(err) => return Err(err),
            },
            None => None,
        };

        let session_exercises = self.repository.read_session_exercises(id).await?;
        let mut exercises = Vec::with_capacity(session_exercises.len());
        for session_exercise in session_exercises {
            let exercise = self
                .repository
                .read_exercise(session_exercise.exercise_id)
                .await?;
            let sets = self.repository.read_session_sets(session_exercise.id).await?;
            exercises.push((session_exercise, exercise, sets));
        }

        Ok(SessionView::assemble(session, training, exercises))
    }

    async fn complete_session(
        &self,
        user_id: UserID,
        id: TrainingSessionID,
    ) -> Result<TrainingSession, UpdateError> {
        let mut session = self.repository.read_training_session(id).await?;
        authorize(user_id, session.user_id)?;

        if session.is_completed() {
            return Ok(session);
        }

        session.completed_at = Some(Utc::now());
        log_on_error!(
            self.repository.replace_training_session(session),
            UpdateError,
            "complete",
            "training session"
        )
    }

    async fn add_session_set(
        &self,
        user_id: UserID,
        session_exercise_id: SessionExerciseID,
        new_set: NewSessionSet,
    ) -> Result<SessionSet, CreateError> {
        let session_exercise = self
            .repository
            .read_session_exercise(session_exercise_id)
            .await?;
        let session = self
            .repository
            .read_training_session(session_exercise.session_id)
            .await?;
        authorize(user_id, session.user_id)?;

        let sets = self.repository.read_session_sets(session_exercise_id).await?;
        let set_index = next_set_index(&sets);

        let set = SessionSet {
            id: SessionSetID::new(),
            session_exercise_id,
            set_index,
            reps: new_set.reps,
            weight: new_set.weight,
            duration_seconds: new_set.duration_seconds,
            distance: new_set.distance,
            // Rest belongs to the gap before this set and is recorded on the
            // previous set, never on the new one.
            rest_seconds_actual: None,
            notes: new_set.notes,
            completed_at: Some(Utc::now()),
        };
        let set = log_on_error!(
            self.repository.create_session_set(set),
            CreateError,
            "create",
            "session set"
        )?;

        if let Some(rest_seconds_actual) = new_set.rest_seconds_actual {
            if set_index > 1 {
                if let Some(previous) = sets.iter().find(|s| s.set_index == set_index - 1) {
                    let mut previous = previous.clone();
                    previous.rest_seconds_actual = Some(rest_seconds_actual);
                    log_on_error!(
                        self.repository.replace_session_set(previous),
                        UpdateError,
                        "modify",
                        "session set"
                    )?;
                }
            }
        }

        Ok(set)
    }

    async fn modify_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
        patch: SessionSetPatch,
    ) -> Result<SessionSet, UpdateError> {
        let mut set = self.read_owned_session_set(user_id, id).await?;
        patch.apply(&mut set);
        log_on_error!(
            self.repository.replace_session_set(set),
            UpdateError,
            "modify",
            "session set"
        )
    }

    async fn complete_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
    ) -> Result<SessionSet, UpdateError> {
        let mut set = self.read_owned_session_set(user_id, id).await?;
        set.completed_at = Some(Utc::now());
        log_on_error!(
            self.repository.replace_session_set(set),
            UpdateError,
            "complete",
            "session set"
        )
    }

    async fn delete_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
    ) -> Result<Vec<SessionSet>, DeleteError> {
        self.read_owned_session_set(user_id, id).await?;
        log_on_error!(
            self.repository.delete_session_set(id),
            DeleteError,
            "delete",
            "session set"
        )
    }
}

impl<R: TrainingSessionRepository> Service<R> {
    /// Resolve a set's owner through its parent chain and verify it against
    /// the requesting user.
    async fn read_owned_session_set(
        &self,
        user_id: UserID,
        id: SessionSetID,
    ) -> Result<SessionSet, ReadError> {
        let set = self.repository.read_session_set(id).await?;
        let session_exercise = self
            .repository
            .read_session_exercise(set.session_exercise_id)
            .await?;
        let session = self
            .repository
            .read_training_session(session_exercise.session_id)
            .await?;
        authorize(user_id, session.user_id)?;
        Ok(set)
    }
}

impl<R: ExerciseRepository + StatisticsRepository> StatisticsService for Service<R> {
    async fn get_exercise_stats(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        range: Option<DateRange>,
    ) -> Result<ExerciseStats, ReadError> {
        let exercise = self.repository.read_exercise(exercise_id).await?;
        authorize(user_id, exercise.user_id)?;

        let rows = log_on_error!(
            self.repository.read_exercise_history(user_id, exercise_id),
            ReadError,
            "get",
            "exercise history"
        )?;
        let range = range.unwrap_or_else(|| DateRange::last_90_days(Utc::now().date_naive()));
        Ok(exercise_stats(&rows, &range))
    }
}
