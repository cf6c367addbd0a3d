mod buckets;
mod range;
mod summary;

pub use buckets::{aggregate, GroupBy, NamedBucket};
pub use range::{StatsQuery, TimeRange};
pub use summary::{CriterionAverage, RecordStatistics, StatusCount};

use super::records::{RecordStatus, ScoredRecord};
use std::collections::{BTreeMap, HashSet};

/// Mean score of completed records; zero when nothing has been completed.
pub fn average_score(records: &[ScoredRecord]) -> f64 {
    let (sum, count) = records
        .iter()
        .filter(|record| record.is_completed())
        .fold((0.0, 0usize), |(sum, count), record| {
            (sum + record.score, count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Completed over scheduled-plus-completed, as a percentage. Missed records
/// sit outside the denominator.
pub fn completion_rate(records: &[ScoredRecord]) -> f64 {
    let completed = records
        .iter()
        .filter(|record| record.status == RecordStatus::Completed)
        .count();
    let scheduled = records
        .iter()
        .filter(|record| record.status == RecordStatus::Scheduled)
        .count();

    let denominator = completed + scheduled;
    if denominator == 0 {
        0.0
    } else {
        completed as f64 / denominator as f64 * 100.0
    }
}

/// Average indicator score per criterion across every record supplied.
pub fn criteria_averages(records: &[ScoredRecord]) -> Vec<CriterionAverage> {
    let mut totals: BTreeMap<&str, (&str, f64, usize)> = BTreeMap::new();
    for indicator in records.iter().flat_map(|record| &record.indicator_scores) {
        let entry = totals
            .entry(indicator.criterion_id.as_str())
            .or_insert((indicator.criterion_name.as_str(), 0.0, 0));
        if entry.0.is_empty() {
            entry.0 = indicator.criterion_name.as_str();
        }
        entry.1 += indicator.score;
        entry.2 += 1;
    }

    let mut averages: Vec<CriterionAverage> = totals
        .into_iter()
        .map(|(criterion_id, (name, total, samples))| CriterionAverage {
            criterion_id: criterion_id.to_string(),
            criterion_name: if name.is_empty() {
                criterion_id.to_string()
            } else {
                name.to_string()
            },
            average_score: round_to(total / samples as f64, 2),
            samples,
        })
        .collect();

    averages.sort_by(|a, b| {
        a.criterion_name
            .cmp(&b.criterion_name)
            .then_with(|| a.criterion_id.cmp(&b.criterion_id))
    });
    averages
}

/// Share of active patients with at least one record, capped at 100.
pub fn patient_coverage(records: &[ScoredRecord], active_patients: usize) -> f64 {
    if active_patients == 0 {
        return 0.0;
    }

    let covered: HashSet<&str> = records
        .iter()
        .filter_map(|record| record.patient.as_deref())
        .filter(|patient| !patient.trim().is_empty())
        .collect();

    (covered.len() as f64 / active_patients as f64 * 100.0).min(100.0)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::records::RecordKind;
    use chrono::NaiveDate;

    fn record(id: &str, status: RecordStatus, score: f64) -> ScoredRecord {
        ScoredRecord::new(
            id,
            RecordKind::Assessment,
            "1",
            NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date"),
            status,
        )
        .with_score(score)
    }

    #[test]
    fn average_ignores_records_that_are_not_completed() {
        let records = vec![
            record("1", RecordStatus::Completed, 80.0),
            record("2", RecordStatus::Completed, 60.0),
            record("3", RecordStatus::Scheduled, 0.0),
            record("4", RecordStatus::Missed, 10.0),
        ];
        assert_eq!(average_score(&records), 70.0);
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn completion_rate_excludes_missed_from_denominator() {
        let records = vec![
            record("1", RecordStatus::Completed, 80.0),
            record("2", RecordStatus::Completed, 60.0),
            record("3", RecordStatus::Completed, 60.0),
            record("4", RecordStatus::Scheduled, 0.0),
            record("5", RecordStatus::Missed, 0.0),
        ];
        assert_eq!(completion_rate(&records), 75.0);
        assert_eq!(completion_rate(&[record("x", RecordStatus::Missed, 0.0)]), 0.0);
    }

    #[test]
    fn criteria_averages_group_by_id_and_sort_by_name() {
        let records = vec![
            record("1", RecordStatus::Completed, 80.0)
                .with_indicator("7", "Safety", 90.0)
                .with_indicator("3", "Hygiene", 50.0),
            record("2", RecordStatus::Completed, 60.0)
                .with_indicator("7", "Safety", 70.0)
                .with_indicator("3", "Hygiene", 55.5),
        ];

        let averages = criteria_averages(&records);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].criterion_name, "Hygiene");
        assert_eq!(averages[0].average_score, 52.75);
        assert_eq!(averages[1].criterion_name, "Safety");
        assert_eq!(averages[1].average_score, 80.0);
        assert_eq!(averages[1].samples, 2);
    }

    #[test]
    fn coverage_counts_distinct_patients() {
        let records = vec![
            record("1", RecordStatus::Completed, 80.0).with_patient("p-1"),
            record("2", RecordStatus::Scheduled, 0.0).with_patient("p-1"),
            record("3", RecordStatus::Completed, 70.0).with_patient("p-2"),
            record("4", RecordStatus::Completed, 70.0),
        ];
        assert_eq!(patient_coverage(&records, 4), 50.0);
        assert_eq!(patient_coverage(&records, 1), 100.0);
        assert_eq!(patient_coverage(&records, 0), 0.0);
    }
}
