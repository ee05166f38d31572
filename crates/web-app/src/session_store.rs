//! Client-side mirror of a training session.
//!
//! The browser keeps a local copy of the nested session view and updates it
//! after each server call. Reconciliation is explicit rather than ad-hoc: a
//! snapshot is taken before a mutation, the server's response replaces the
//! affected state on success, and the snapshot is restored on failure.

use robur_domain::{SessionExerciseID, SessionSet, SessionSetID, SessionView};

pub struct SessionStore {
    view: SessionView,
    snapshot: Option<SessionView>,
}

impl SessionStore {
    #[must_use]
    pub fn new(view: SessionView) -> Self {
        Self {
            view,
            snapshot: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Snapshot the current view before a mutation.
    pub fn begin(&mut self) {
        self.snapshot = Some(self.view.clone());
    }

    /// Drop the snapshot after the server confirmed the mutation.
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Restore the last snapshot after a failed mutation.
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.view = snapshot;
        }
    }

    /// Replace the whole view with a fresh server copy.
    pub fn replace_view(&mut self, view: SessionView) {
        self.view = view;
        self.snapshot = None;
    }

    /// Insert a newly recorded set into its exercise, keeping index order.
    pub fn apply_set_added(&mut self, set: SessionSet) {
        if let Some(exercise) = self
            .view
            .exercises
            .iter_mut()
            .find(|e| e.session_exercise.id == set.session_exercise_id)
        {
            exercise.sets.push(set);
            exercise.sets.sort_by_key(|s| s.set_index);
        }
    }

    /// Replace a single set with the server's copy.
    pub fn apply_set_replaced(&mut self, set: SessionSet) {
        for exercise in &mut self.view.exercises {
            if let Some(stored) = exercise.sets.iter_mut().find(|s| s.id == set.id) {
                *stored = set;
                return;
            }
        }
    }

    /// Replace an exercise's whole set list, as returned after a deletion.
    pub fn apply_sets_replaced(
        &mut self,
        session_exercise_id: SessionExerciseID,
        sets: Vec<SessionSet>,
    ) {
        if let Some(exercise) = self
            .view
            .exercises
            .iter_mut()
            .find(|e| e.session_exercise.id == session_exercise_id)
        {
            exercise.sets = sets;
        }
    }

    #[must_use]
    pub fn find_set(&self, id: SessionSetID) -> Option<&SessionSet> {
        self.view
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use robur_domain::{
        Exercise, ExerciseType, Name, Reps, SessionExercise, TrainingSession, Weight,
    };

    use super::*;

    fn set(id: u128, set_index: u32) -> SessionSet {
        SessionSet {
            id: id.into(),
            session_exercise_id: 1.into(),
            set_index,
            reps: Some(Reps::new(8).unwrap()),
            weight: Some(Weight::new(60.0).unwrap()),
            duration_seconds: None,
            distance: None,
            rest_seconds_actual: None,
            notes: None,
            completed_at: None,
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(SessionView {
            session: TrainingSession {
                id: 1.into(),
                user_id: 1.into(),
                training_id: None,
                name: Name::new("Push Day").unwrap(),
                notes: None,
                started_at: DateTime::<Utc>::MIN_UTC,
                completed_at: None,
            },
            training: None,
            exercises: vec![robur_domain::SessionExerciseView {
                session_exercise: SessionExercise {
                    id: 1.into(),
                    session_id: 1.into(),
                    exercise_id: 1.into(),
                    order_index: 0,
                    notes: None,
                },
                exercise: Exercise {
                    id: 1.into(),
                    user_id: 1.into(),
                    name: Name::new("Bench Press").unwrap(),
                    description: None,
                    exercise_type: ExerciseType::Strength,
                    muscle_group: None,
                },
                sets: vec![set(1, 1), set(2, 2)],
            }],
        })
    }

    #[test]
    fn test_apply_set_added_keeps_index_order() {
        let mut store = store();
        store.apply_set_added(set(3, 3));
        assert_eq!(
            store.view().exercises[0]
                .sets
                .iter()
                .map(|s| s.set_index)
                .collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_apply_set_replaced() {
        let mut store = store();
        let mut updated = set(2, 2);
        updated.reps = Some(Reps::new(6).unwrap());
        store.apply_set_replaced(updated.clone());
        assert_eq!(store.find_set(2.into()), Some(&updated));
    }

    #[test]
    fn test_apply_sets_replaced_after_deletion() {
        let mut store = store();
        let mut shifted = set(2, 1);
        shifted.set_index = 1;
        store.apply_sets_replaced(1.into(), vec![shifted]);
        assert_eq!(store.view().exercises[0].sets.len(), 1);
        assert_eq!(store.view().exercises[0].sets[0].id, 2.into());
        assert_eq!(store.view().exercises[0].sets[0].set_index, 1);
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut store = store();
        store.begin();
        store.apply_set_added(set(3, 3));
        assert_eq!(store.view().exercises[0].sets.len(), 3);

        store.rollback();
        assert_eq!(store.view().exercises[0].sets.len(), 2);
    }

    #[test]
    fn test_commit_drops_snapshot() {
        let mut store = store();
        store.begin();
        store.apply_set_added(set(3, 3));
        store.commit();

        // Nothing to roll back to once committed.
        store.rollback();
        assert_eq!(store.view().exercises[0].sets.len(), 3);
    }
}
