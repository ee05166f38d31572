use pretty_assertions::assert_eq;

use robur_domain::{
    self as domain, ExerciseService, StatisticsService, TrainingService, TrainingSessionService,
    UserRepository,
};
use robur_storage::SqliteStorage;

async fn service() -> (domain::Service<SqliteStorage>, domain::UserID, domain::UserID) {
    let storage = SqliteStorage::in_memory().await.unwrap();
    let alice = domain::User {
        id: domain::UserID::new(),
        name: domain::Name::new("Alice").unwrap(),
    };
    let bob = domain::User {
        id: domain::UserID::new(),
        name: domain::Name::new("Bob").unwrap(),
    };
    storage.create_user(alice.clone()).await.unwrap();
    storage.create_user(bob.clone()).await.unwrap();
    (domain::Service::new(storage), alice.id, bob.id)
}

fn name(value: &str) -> domain::Name {
    domain::Name::new(value).unwrap()
}

fn reps(value: u32) -> domain::Reps {
    domain::Reps::new(value).unwrap()
}

fn weight(value: f64) -> domain::Weight {
    domain::Weight::new(value).unwrap()
}

async fn create_exercise(
    service: &domain::Service<SqliteStorage>,
    user_id: domain::UserID,
    exercise_name: &str,
) -> domain::Exercise {
    service
        .create_exercise(
            user_id,
            name(exercise_name),
            None,
            domain::ExerciseType::Strength,
            None,
        )
        .await
        .unwrap()
}

async fn create_training_with_exercise(
    service: &domain::Service<SqliteStorage>,
    user_id: domain::UserID,
) -> (domain::Training, domain::Exercise) {
    let exercise = create_exercise(service, user_id, "Bench Press").await;
    let training = service
        .create_training(user_id, name("Push Day"), None, None)
        .await
        .unwrap();
    service
        .add_training_exercise(
            user_id,
            training.id,
            domain::NewTrainingExercise {
                exercise_id: exercise.id,
                default_sets: Some(domain::DefaultSets::new(3).unwrap()),
                default_reps: Some(reps(8)),
                default_rest_seconds: Some(domain::DefaultRestSeconds::new(180).unwrap()),
                notes: None,
            },
        )
        .await
        .unwrap();
    (training, exercise)
}

#[tokio::test]
async fn exercise_crud_and_owner_scoping() {
    let (service, alice, bob) = service().await;

    let exercise = create_exercise(&service, alice, "Bench Press").await;
    assert_eq!(exercise.name, name("Bench Press"));

    // The owner sees the exercise, other users do not.
    let listed = service
        .get_exercises(alice, &domain::ExerciseFilter::default())
        .await
        .unwrap();
    assert_eq!(listed, vec![exercise.clone()]);
    assert_eq!(
        service
            .get_exercises(bob, &domain::ExerciseFilter::default())
            .await
            .unwrap(),
        vec![]
    );

    // A foreign id is indistinguishable from a missing one.
    assert!(matches!(
        service.get_exercise(bob, exercise.id).await,
        Err(domain::ReadError::NotFound)
    ));
    assert!(matches!(
        service.get_exercise(alice, domain::ExerciseID::new()).await,
        Err(domain::ReadError::NotFound)
    ));
    assert!(matches!(
        service
            .delete_exercise(bob, exercise.id)
            .await,
        Err(domain::DeleteError::NotFound)
    ));

    // Names are unique per owner, not globally.
    assert!(matches!(
        service
            .create_exercise(
                alice,
                name("Bench Press"),
                None,
                domain::ExerciseType::Strength,
                None,
            )
            .await,
        Err(domain::CreateError::Conflict)
    ));
    create_exercise(&service, bob, "Bench Press").await;

    let modified = service
        .modify_exercise(
            alice,
            exercise.id,
            Some(name("Incline Bench Press")),
            domain::Patch::Set(domain::Description::new("Barbell on incline bench").unwrap()),
            Some(domain::ExerciseType::Strength),
            domain::Patch::Keep,
        )
        .await
        .unwrap();
    assert_eq!(modified.name, name("Incline Bench Press"));
    assert_eq!(
        modified.description,
        Some(domain::Description::new("Barbell on incline bench").unwrap())
    );

    assert_eq!(
        service.delete_exercise(alice, exercise.id).await.unwrap(),
        exercise.id
    );
    assert!(matches!(
        service.get_exercise(alice, exercise.id).await,
        Err(domain::ReadError::NotFound)
    ));
}

#[tokio::test]
async fn exercise_filter_by_name_and_type() {
    let (service, alice, _) = service().await;

    create_exercise(&service, alice, "Bench Press").await;
    service
        .create_exercise(
            alice,
            name("Running"),
            None,
            domain::ExerciseType::Cardio,
            None,
        )
        .await
        .unwrap();

    let by_name = service
        .get_exercises(
            alice,
            &domain::ExerciseFilter {
                search: "bench".to_string(),
                exercise_type: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, name("Bench Press"));

    let by_type = service
        .get_exercises(
            alice,
            &domain::ExerciseFilter {
                search: String::new(),
                exercise_type: Some(domain::ExerciseType::Cardio),
            },
        )
        .await
        .unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].name, name("Running"));
}

#[tokio::test]
async fn training_exercise_ordering() {
    let (service, alice, _) = service().await;

    let training = service
        .create_training(alice, name("Full Body"), None, None)
        .await
        .unwrap();
    let mut links = vec![];
    for exercise_name in ["Squat", "Bench Press", "Barbell Row"] {
        let exercise = create_exercise(&service, alice, exercise_name).await;
        links.push(
            service
                .add_training_exercise(
                    alice,
                    training.id,
                    domain::NewTrainingExercise {
                        exercise_id: exercise.id,
                        default_sets: None,
                        default_reps: None,
                        default_rest_seconds: None,
                        notes: None,
                    },
                )
                .await
                .unwrap(),
        );
    }

    // Appending assigns max + 1.
    assert_eq!(
        links.iter().map(|l| l.order_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    // The unset default rest falls back to 90 seconds.
    assert_eq!(
        links[0].default_rest_seconds,
        domain::DefaultRestSeconds::default()
    );

    // Removal leaves a gap, no reindexing.
    service
        .remove_training_exercise(alice, links[1].id)
        .await
        .unwrap();
    let detail = service.get_training(alice, training.id).await.unwrap();
    assert_eq!(
        detail
            .exercises
            .iter()
            .map(|(l, _)| l.order_index)
            .collect::<Vec<_>>(),
        vec![0, 2]
    );

    // The next append continues from the highest index.
    let exercise = create_exercise(&service, alice, "Overhead Press").await;
    let appended = service
        .add_training_exercise(
            alice,
            training.id,
            domain::NewTrainingExercise {
                exercise_id: exercise.id,
                default_sets: None,
                default_reps: None,
                default_rest_seconds: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(appended.order_index, 3);

    // A full replacement mapping is applied atomically.
    let reordered = service
        .reorder_training_exercises(
            alice,
            training.id,
            &[(links[0].id, 2), (links[2].id, 0), (appended.id, 1)],
        )
        .await
        .unwrap();
    assert_eq!(
        reordered.iter().map(|l| (l.id, l.order_index)).collect::<Vec<_>>(),
        vec![(links[2].id, 0), (appended.id, 1), (links[0].id, 2)]
    );

    // Duplicate target indices are rejected without effect.
    assert!(matches!(
        service
            .reorder_training_exercises(
                alice,
                training.id,
                &[(links[0].id, 0), (links[2].id, 0), (appended.id, 1)],
            )
            .await,
        Err(domain::UpdateError::Conflict)
    ));
    let detail = service.get_training(alice, training.id).await.unwrap();
    assert_eq!(
        detail
            .exercises
            .iter()
            .map(|(l, _)| l.order_index)
            .collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    // A link of another training aborts the whole reorder.
    let other = service
        .create_training(alice, name("Other"), None, None)
        .await
        .unwrap();
    let other_exercise = create_exercise(&service, alice, "Curl").await;
    let other_link = service
        .add_training_exercise(
            alice,
            other.id,
            domain::NewTrainingExercise {
                exercise_id: other_exercise.id,
                default_sets: None,
                default_reps: None,
                default_rest_seconds: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        service
            .reorder_training_exercises(
                alice,
                training.id,
                &[(links[0].id, 0), (other_link.id, 1), (appended.id, 2)],
            )
            .await,
        Err(domain::UpdateError::NotFound)
    ));
}

#[tokio::test]
async fn session_from_template_records_and_reindexes_sets() {
    let (service, alice, _) = service().await;
    let (training, _) = create_training_with_exercise(&service, alice).await;

    // Cloning preserves name and exercise order; defaults stay on the template.
    let view = service
        .start_session_from_training(alice, training.id, None)
        .await
        .unwrap();
    assert_eq!(view.session.name, name("Push Day"));
    assert!(view.session.is_in_progress());
    assert_eq!(view.training.as_ref().map(|(id, _)| *id), Some(training.id));
    assert_eq!(view.exercises.len(), 1);
    assert_eq!(view.exercises[0].session_exercise.order_index, 0);
    assert_eq!(view.exercises[0].sets, vec![]);

    let session_exercise_id = view.exercises[0].session_exercise.id;

    // The first recorded set gets index 1 and is completed at creation.
    let first = service
        .add_session_set(
            alice,
            session_exercise_id,
            domain::NewSessionSet {
                reps: Some(reps(8)),
                weight: Some(weight(60.0)),
                ..domain::NewSessionSet::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.set_index, 1);
    assert!(first.is_completed());
    assert_eq!(first.rest_seconds_actual, None);

    // Observed rest arrives with the next set and lands on the previous one.
    let second = service
        .add_session_set(
            alice,
            session_exercise_id,
            domain::NewSessionSet {
                reps: Some(reps(6)),
                weight: Some(weight(62.5)),
                rest_seconds_actual: Some(domain::RestSeconds::new(90).unwrap()),
                ..domain::NewSessionSet::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second.set_index, 2);
    assert_eq!(second.rest_seconds_actual, None);

    let view = service.get_session(alice, view.session.id).await.unwrap();
    let sets = &view.exercises[0].sets;
    assert_eq!(sets.len(), 2);
    assert_eq!(
        sets[0].rest_seconds_actual,
        Some(domain::RestSeconds::new(90).unwrap())
    );

    // Deleting the first set shifts the remaining one down.
    let remaining = service.delete_session_set(alice, first.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
    assert_eq!(remaining[0].set_index, 1);
    assert_eq!(remaining[0].weight, Some(weight(62.5)));

    // Statistics over the default range see today's remaining set.
    let exercise_id = view.exercises[0].exercise.id;
    let stats = service
        .get_exercise_stats(alice, exercise_id, None)
        .await
        .unwrap();
    assert_eq!(stats.max_weight_by_date.len(), 1);
    assert_eq!(stats.max_weight_by_date[0].max_weight, 62.5);
    assert_eq!(stats.summary.total_sets, 1);
    // The session is still in progress and does not count yet.
    assert_eq!(stats.summary.total_sessions, 0);

    service.complete_session(alice, view.session.id).await.unwrap();
    let stats = service
        .get_exercise_stats(alice, exercise_id, None)
        .await
        .unwrap();
    assert_eq!(stats.summary.total_sessions, 1);
    assert_eq!(stats.summary.total_volume, 375.0);
    assert_eq!(
        stats.personal_records.max_weight,
        Some(domain::WeightRecord {
            weight: 62.5,
            reps: Some(6),
        })
    );
}

#[tokio::test]
async fn set_indices_stay_contiguous() {
    let (service, alice, _) = service().await;
    let (training, _) = create_training_with_exercise(&service, alice).await;
    let view = service
        .start_session_from_training(alice, training.id, None)
        .await
        .unwrap();
    let session_exercise_id = view.exercises[0].session_exercise.id;

    let mut sets = vec![];
    for _ in 0..4 {
        sets.push(
            service
                .add_session_set(alice, session_exercise_id, domain::NewSessionSet::default())
                .await
                .unwrap(),
        );
    }
    assert_eq!(
        sets.iter().map(|s| s.set_index).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );

    // Deleting in the middle shifts only the higher-indexed sets.
    let remaining = service.delete_session_set(alice, sets[1].id).await.unwrap();
    assert_eq!(
        remaining.iter().map(|s| (s.id, s.set_index)).collect::<Vec<_>>(),
        vec![(sets[0].id, 1), (sets[2].id, 2), (sets[3].id, 3)]
    );

    let remaining = service.delete_session_set(alice, sets[0].id).await.unwrap();
    assert_eq!(
        remaining.iter().map(|s| (s.id, s.set_index)).collect::<Vec<_>>(),
        vec![(sets[2].id, 1), (sets[3].id, 2)]
    );

    // Appending continues after the shifted run.
    let appended = service
        .add_session_set(alice, session_exercise_id, domain::NewSessionSet::default())
        .await
        .unwrap();
    assert_eq!(appended.set_index, 3);
}

#[tokio::test]
async fn partial_update_distinguishes_absent_and_null() {
    let (service, alice, _) = service().await;
    let (training, _) = create_training_with_exercise(&service, alice).await;
    let view = service
        .start_session_from_training(alice, training.id, None)
        .await
        .unwrap();
    let session_exercise_id = view.exercises[0].session_exercise.id;

    let set = service
        .add_session_set(
            alice,
            session_exercise_id,
            domain::NewSessionSet {
                reps: Some(reps(8)),
                weight: Some(weight(60.0)),
                notes: Some(domain::Notes::new("solid").unwrap()),
                ..domain::NewSessionSet::default()
            },
        )
        .await
        .unwrap();

    let updated = service
        .modify_session_set(
            alice,
            set.id,
            domain::SessionSetPatch {
                reps: domain::Patch::Set(reps(9)),
                notes: domain::Patch::Clear,
                ..domain::SessionSetPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.reps, Some(reps(9)));
    // Omitted fields keep their stored values.
    assert_eq!(updated.weight, Some(weight(60.0)));
    // Explicit null clears.
    assert_eq!(updated.notes, None);

    let stored = service.get_session(alice, view.session.id).await.unwrap();
    assert_eq!(stored.exercises[0].sets[0], updated);
}

#[tokio::test]
async fn session_and_set_completion() {
    let (service, alice, bob) = service().await;

    let view = service
        .start_blank_session(alice, name("Evening Run"), None)
        .await
        .unwrap();
    assert!(view.session.is_in_progress());
    assert_eq!(view.session.training_id, None);
    assert_eq!(view.exercises, vec![]);

    // Completion is one-way and idempotent.
    let completed = service.complete_session(alice, view.session.id).await.unwrap();
    assert!(completed.is_completed());
    let again = service.complete_session(alice, view.session.id).await.unwrap();
    assert_eq!(again.completed_at, completed.completed_at);

    // Foreign sessions stay invisible.
    assert!(matches!(
        service.get_session(bob, view.session.id).await,
        Err(domain::ReadError::NotFound)
    ));
    assert!(matches!(
        service.complete_session(bob, view.session.id).await,
        Err(domain::UpdateError::NotFound)
    ));
}

#[tokio::test]
async fn stats_without_history_are_empty() {
    let (service, alice, bob) = service().await;
    let exercise = create_exercise(&service, alice, "Bench Press").await;

    let stats = service
        .get_exercise_stats(alice, exercise.id, None)
        .await
        .unwrap();
    assert_eq!(stats.max_weight_by_date, vec![]);
    assert_eq!(stats.volume_per_session, vec![]);
    assert_eq!(stats.avg_rest_seconds, None);
    assert_eq!(stats.personal_records.max_weight, None);
    assert_eq!(stats.personal_records.max_reps, None);
    assert_eq!(stats.personal_records.max_volume, None);
    assert_eq!(stats.summary.total_sessions, 0);
    assert_eq!(stats.summary.total_sets, 0);
    assert_eq!(stats.summary.total_volume, 0.0);

    assert!(matches!(
        service.get_exercise_stats(bob, exercise.id, None).await,
        Err(domain::ReadError::NotFound)
    ));
}

#[tokio::test]
async fn training_picker_prefers_recently_updated() {
    let (service, alice, _) = service().await;

    let first = service
        .create_training(alice, name("Leg Day"), None, None)
        .await
        .unwrap();
    service
        .create_training(alice, name("Pull Day"), None, None)
        .await
        .unwrap();
    service
        .modify_training(
            alice,
            first.id,
            None,
            domain::Patch::Keep,
            domain::Patch::Set(domain::LongNotes::new("heavier squats").unwrap()),
        )
        .await
        .unwrap();

    let picker = service.get_training_picker(alice).await.unwrap();
    assert_eq!(picker.len(), 2);
    assert_eq!(picker[0].training.id, first.id);

    // Duplicate training names are rejected per owner.
    assert!(matches!(
        service.create_training(alice, name("Leg Day"), None, None).await,
        Err(domain::CreateError::Conflict)
    ));
}
