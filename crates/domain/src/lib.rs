#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod exercise;
pub mod measurement;
pub mod name;
pub mod notes;
pub mod ownership;
pub mod patch;
pub mod service;
pub mod statistics;
pub mod training;
pub mod training_session;
pub mod user;

pub use error::{
    AccessError, CreateError, DeleteError, ReadError, StorageError, UpdateError, ValidationError,
};
pub use exercise::{
    Exercise, ExerciseFilter, ExerciseID, ExerciseRepository, ExerciseService, ExerciseType,
    ExerciseTypeError,
};
pub use measurement::{
    DefaultRestSeconds, DefaultRestSecondsError, DefaultSets, DefaultSetsError, Distance,
    DistanceError, DurationSeconds, DurationSecondsError, Reps, RepsError, RestSeconds,
    RestSecondsError, Weight, WeightError, volume,
};
pub use name::{Name, NameError};
pub use notes::{Description, DescriptionError, LongNotes, LongNotesError, Notes, NotesError};
pub use ownership::authorize;
pub use patch::Patch;
pub use service::Service;
pub use statistics::{
    DateRange, DateRangeError, ExerciseHistoryRow, ExerciseStats, HistorySet, MaxWeightPoint,
    PersonalRecords, RepsRecord, SessionVolume, StatisticsRepository, StatisticsService,
    SummaryStats, VolumeRecord, WeightRecord, exercise_stats,
};
pub use training::{
    NewTrainingExercise, Training, TrainingDetail, TrainingExercise, TrainingExerciseID,
    TrainingExercisePatch, TrainingFilter, TrainingID, TrainingOverview, TrainingRepository,
    TrainingService, next_order_index,
};
pub use training_session::{
    NewSessionSet, SessionExercise, SessionExerciseID, SessionExerciseView, SessionSet,
    SessionSetID, SessionSetPatch, SessionView, TrainingSession, TrainingSessionID,
    TrainingSessionRepository, TrainingSessionService, clone_template_exercises, next_set_index,
};
pub use user::{User, UserID, UserRepository, UserService};
