use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{
    ExerciseID, Name, ReadError, Reps, RestSeconds, TrainingSessionID, UserID, Weight,
    measurement::volume,
};

#[allow(async_fn_in_trait)]
pub trait StatisticsService {
    async fn get_exercise_stats(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        range: Option<DateRange>,
    ) -> Result<ExerciseStats, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait StatisticsRepository {
    /// One row per recorded set of the exercise for the user, joined with its
    /// session; sessions containing the exercise without any recorded sets
    /// yield a single row with `set: None`.
    async fn read_exercise_history(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<ExerciseHistoryRow>, ReadError>;
}

/// Inclusive date range over session start dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::EndBeforeStart);
        }

        Ok(DateRange { start, end })
    }

    #[must_use]
    pub fn last_90_days(today: NaiveDate) -> Self {
        DateRange {
            start: today
                .checked_sub_days(Days::new(90))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        self.start <= date && date <= self.end
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DateRangeError {
    #[error("The end date must be after or equal to the start date")]
    EndBeforeStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseHistoryRow {
    pub session_id: TrainingSessionID,
    pub session_name: Name,
    pub started_at: DateTime<Utc>,
    pub session_completed_at: Option<DateTime<Utc>>,
    pub set: Option<HistorySet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySet {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub rest_seconds_actual: Option<RestSeconds>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaxWeightPoint {
    pub date: NaiveDate,
    pub max_weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionVolume {
    pub session_id: TrainingSessionID,
    pub session_name: Name,
    pub date: NaiveDate,
    pub total_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecord {
    pub weight: f64,
    pub reps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepsRecord {
    pub reps: u32,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRecord {
    pub reps: u32,
    pub weight: f64,
    pub volume: f64,
}

/// Best-ever values, each ranked independently of the others and of the date
/// range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalRecords {
    pub max_weight: Option<WeightRecord>,
    pub max_reps: Option<RepsRecord>,
    pub max_volume: Option<VolumeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_sessions: usize,
    pub total_sets: usize,
    pub total_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStats {
    pub max_weight_by_date: Vec<MaxWeightPoint>,
    pub volume_per_session: Vec<SessionVolume>,
    pub avg_rest_seconds: Option<f64>,
    pub personal_records: PersonalRecords,
    pub summary: SummaryStats,
}

/// Aggregate an exercise's history. Series and summary values are scoped to
/// sessions started within `range`; personal records consider the entire
/// history.
#[must_use]
pub fn exercise_stats(rows: &[ExerciseHistoryRow], range: &DateRange) -> ExerciseStats {
    let in_range = rows
        .iter()
        .filter(|r| range.contains(r.started_at))
        .collect::<Vec<_>>();

    ExerciseStats {
        max_weight_by_date: max_weight_by_date(&in_range),
        volume_per_session: volume_per_session(&in_range),
        avg_rest_seconds: avg_rest_seconds(&in_range),
        personal_records: personal_records(rows),
        summary: summary(&in_range),
    }
}

fn completed_set(row: &ExerciseHistoryRow) -> Option<&HistorySet> {
    row.set.as_ref().filter(|s| s.completed_at.is_some())
}

fn max_weight_by_date(rows: &[&ExerciseHistoryRow]) -> Vec<MaxWeightPoint> {
    let mut result: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for row in rows {
        let Some(weight) = completed_set(row).and_then(|s| s.weight) else {
            continue;
        };
        let date = row.started_at.date_naive();
        let weight = f64::from(weight);
        result
            .entry(date)
            .and_modify(|max| *max = max.max(weight))
            .or_insert(weight);
    }

    result
        .into_iter()
        .map(|(date, max_weight)| MaxWeightPoint { date, max_weight })
        .collect()
}

fn volume_per_session(rows: &[&ExerciseHistoryRow]) -> Vec<SessionVolume> {
    let mut result: Vec<SessionVolume> = vec![];

    for row in rows {
        let Some(set) = completed_set(row) else {
            continue;
        };
        let (Some(reps), Some(weight)) = (set.reps, set.weight) else {
            continue;
        };
        let set_volume = volume(reps, weight);
        match result.iter_mut().find(|v| v.session_id == row.session_id) {
            Some(session_volume) => session_volume.total_volume += set_volume,
            None => result.push(SessionVolume {
                session_id: row.session_id,
                session_name: row.session_name.clone(),
                date: row.started_at.date_naive(),
                total_volume: set_volume,
            }),
        }
    }

    for session_volume in &mut result {
        session_volume.total_volume = round2(session_volume.total_volume);
    }
    result.sort_by(|a, b| (a.date, a.session_id).cmp(&(b.date, b.session_id)));
    result
}

fn avg_rest_seconds(rows: &[&ExerciseHistoryRow]) -> Option<f64> {
    let rests = rows
        .iter()
        .filter_map(|r| r.set.as_ref().and_then(|s| s.rest_seconds_actual))
        .collect::<Vec<_>>();
    if rests.is_empty() {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        Some(
            (rests.iter().map(|r| f64::from(u32::from(*r))).sum::<f64>() / rests.len() as f64)
                .round(),
        )
    }
}

fn personal_records(rows: &[ExerciseHistoryRow]) -> PersonalRecords {
    let completed_sets = rows.iter().filter_map(completed_set).collect::<Vec<_>>();

    let max_weight = completed_sets
        .iter()
        .filter(|s| s.weight.is_some())
        .max_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal))
        .map(|s| WeightRecord {
            weight: s.weight.map(f64::from).unwrap_or_default(),
            reps: s.reps.map(u32::from),
        });

    let max_reps = completed_sets
        .iter()
        .filter(|s| s.reps.is_some())
        .max_by_key(|s| s.reps)
        .map(|s| RepsRecord {
            reps: s.reps.map(u32::from).unwrap_or_default(),
            weight: s.weight.map(f64::from),
        });

    let max_volume = completed_sets
        .iter()
        .filter_map(|s| match (s.reps, s.weight) {
            (Some(reps), Some(weight)) => Some((reps, weight, volume(reps, weight))),
            _ => None,
        })
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(reps, weight, set_volume)| VolumeRecord {
            reps: reps.into(),
            weight: weight.into(),
            volume: round2(set_volume),
        });

    PersonalRecords {
        max_weight,
        max_reps,
        max_volume,
    }
}

fn summary(rows: &[&ExerciseHistoryRow]) -> SummaryStats {
    let total_sessions = rows
        .iter()
        .filter(|r| r.session_completed_at.is_some())
        .map(|r| r.session_id)
        .collect::<BTreeSet<_>>()
        .len();

    let total_sets = rows.iter().filter(|r| completed_set(r).is_some()).count();

    let total_volume = round2(
        rows.iter()
            .filter_map(|r| completed_set(r))
            .filter_map(|s| match (s.reps, s.weight) {
                (Some(reps), Some(weight)) => Some(volume(reps, weight)),
                _ => None,
            })
            .sum::<f64>(),
    );

    SummaryStats {
        total_sessions,
        total_sets,
        total_volume,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 17, 30, 0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn row(
        session_id: u128,
        started_at: DateTime<Utc>,
        session_completed: bool,
        set: Option<HistorySet>,
    ) -> ExerciseHistoryRow {
        ExerciseHistoryRow {
            session_id: session_id.into(),
            session_name: Name::new("Push Day").unwrap(),
            started_at,
            session_completed_at: session_completed.then_some(started_at),
            set,
        }
    }

    fn set(reps: Option<u32>, weight: Option<f64>, rest: Option<u32>, completed: bool) -> HistorySet {
        HistorySet {
            reps: reps.map(|r| Reps::new(r).unwrap()),
            weight: weight.map(|w| Weight::new(w).unwrap()),
            rest_seconds_actual: rest.map(|r| RestSeconds::new(r).unwrap()),
            completed_at: completed.then(|| at(2026, 1, 1)),
        }
    }

    #[rstest]
    #[case(date(2026, 1, 1), date(2026, 1, 31), Ok(()))]
    #[case(date(2026, 1, 1), date(2026, 1, 1), Ok(()))]
    #[case(date(2026, 1, 2), date(2026, 1, 1), Err(DateRangeError::EndBeforeStart))]
    fn test_date_range_new(
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] expected: Result<(), DateRangeError>,
    ) {
        assert_eq!(DateRange::new(start, end).map(|_| ()), expected);
    }

    #[test]
    fn test_date_range_last_90_days() {
        let range = DateRange::last_90_days(date(2026, 4, 1));
        assert_eq!(range.start(), date(2026, 1, 1));
        assert_eq!(range.end(), date(2026, 4, 1));
    }

    #[rstest]
    #[case(at(2026, 1, 1), true)]
    #[case(at(2026, 1, 31), true)]
    #[case(at(2025, 12, 31), false)]
    #[case(at(2026, 2, 1), false)]
    fn test_date_range_contains(#[case] started_at: DateTime<Utc>, #[case] expected: bool) {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        assert_eq!(range.contains(started_at), expected);
    }

    #[test]
    fn test_exercise_stats_empty_history() {
        let range = DateRange::last_90_days(date(2026, 4, 1));
        let stats = exercise_stats(&[], &range);

        assert_eq!(stats.max_weight_by_date, vec![]);
        assert_eq!(stats.volume_per_session, vec![]);
        assert_eq!(stats.avg_rest_seconds, None);
        assert_eq!(stats.personal_records.max_weight, None);
        assert_eq!(stats.personal_records.max_reps, None);
        assert_eq!(stats.personal_records.max_volume, None);
        assert_eq!(
            stats.summary,
            SummaryStats {
                total_sessions: 0,
                total_sets: 0,
                total_volume: 0.0,
            }
        );
    }

    #[test]
    fn test_max_weight_by_date_groups_and_orders() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            row(2, at(2026, 1, 10), true, Some(set(Some(8), Some(60.0), None, true))),
            row(2, at(2026, 1, 10), true, Some(set(Some(6), Some(62.5), None, true))),
            row(1, at(2026, 1, 3), true, Some(set(Some(8), Some(57.5), None, true))),
            // Weightless and uncompleted sets do not contribute.
            row(1, at(2026, 1, 3), true, Some(set(Some(12), None, None, true))),
            row(2, at(2026, 1, 10), true, Some(set(Some(6), Some(70.0), None, false))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(
            stats.max_weight_by_date,
            vec![
                MaxWeightPoint {
                    date: date(2026, 1, 3),
                    max_weight: 57.5,
                },
                MaxWeightPoint {
                    date: date(2026, 1, 10),
                    max_weight: 62.5,
                },
            ]
        );
    }

    #[test]
    fn test_volume_per_session_requires_reps_and_weight() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            row(2, at(2026, 1, 10), true, Some(set(Some(8), Some(60.0), None, true))),
            row(2, at(2026, 1, 10), true, Some(set(Some(6), Some(62.5), None, true))),
            row(2, at(2026, 1, 10), true, Some(set(None, Some(62.5), None, true))),
            row(1, at(2026, 1, 3), true, Some(set(Some(10), Some(50.0), None, true))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(stats.volume_per_session.len(), 2);
        assert_eq!(stats.volume_per_session[0].session_id, 1.into());
        assert_approx_eq!(stats.volume_per_session[0].total_volume, 500.0);
        assert_eq!(stats.volume_per_session[1].session_id, 2.into());
        assert_approx_eq!(stats.volume_per_session[1].total_volume, 855.0);
    }

    #[test]
    fn test_avg_rest_ignores_completion_state() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            row(1, at(2026, 1, 3), true, Some(set(Some(8), None, Some(90), true))),
            row(1, at(2026, 1, 3), true, Some(set(Some(8), None, Some(121), false))),
            row(1, at(2026, 1, 3), true, Some(set(Some(8), None, None, true))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(stats.avg_rest_seconds, Some(106.0));
    }

    #[test]
    fn test_personal_records_rank_independently() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            // Heaviest set.
            row(1, at(2026, 1, 3), true, Some(set(Some(3), Some(100.0), None, true))),
            // Highest reps, no weight recorded.
            row(1, at(2026, 1, 3), true, Some(set(Some(20), None, None, true))),
            // Highest volume.
            row(2, at(2026, 1, 10), true, Some(set(Some(10), Some(80.0), None, true))),
            // Not completed, ignored everywhere.
            row(2, at(2026, 1, 10), true, Some(set(Some(30), Some(200.0), None, false))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(
            stats.personal_records,
            PersonalRecords {
                max_weight: Some(WeightRecord {
                    weight: 100.0,
                    reps: Some(3),
                }),
                max_reps: Some(RepsRecord {
                    reps: 20,
                    weight: None,
                }),
                max_volume: Some(VolumeRecord {
                    reps: 10,
                    weight: 80.0,
                    volume: 800.0,
                }),
            }
        );
    }

    #[test]
    fn test_personal_records_ignore_date_range() {
        let range = DateRange::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();
        let rows = vec![row(
            1,
            at(2026, 1, 3),
            true,
            Some(set(Some(5), Some(120.0), None, true)),
        )];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(stats.max_weight_by_date, vec![]);
        assert_eq!(stats.summary.total_sets, 0);
        assert_eq!(
            stats.personal_records.max_weight,
            Some(WeightRecord {
                weight: 120.0,
                reps: Some(5),
            })
        );
    }

    #[test]
    fn test_summary_counts_completed_sessions_without_sets() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            // Completed session containing the exercise but no recorded sets.
            row(1, at(2026, 1, 3), true, None),
            // In-progress session with a completed set.
            row(2, at(2026, 1, 10), false, Some(set(Some(6), Some(62.5), None, true))),
            // Completed session outside the range.
            row(3, at(2025, 11, 1), true, Some(set(Some(8), Some(60.0), None, true))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_eq!(
            stats.summary,
            SummaryStats {
                total_sessions: 1,
                total_sets: 1,
                total_volume: 375.0,
            }
        );
    }

    #[test]
    fn test_total_volume_rounding() {
        let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let rows = vec![
            row(1, at(2026, 1, 3), true, Some(set(Some(3), Some(33.33), None, true))),
            row(1, at(2026, 1, 3), true, Some(set(Some(7), Some(0.07), None, true))),
        ];

        let stats = exercise_stats(&rows, &range);
        assert_approx_eq!(stats.summary.total_volume, 100.48);
    }
}
