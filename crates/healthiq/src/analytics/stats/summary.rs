use super::super::records::{RecordStatus, ScoredRecord};
use super::buckets::{aggregate, GroupBy, NamedBucket};
use super::range::{StatsQuery, TimeRange};
use super::{average_score, completion_rate, criteria_averages, patient_coverage, round_to};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionAverage {
    pub criterion_id: String,
    pub criterion_name: String,
    pub average_score: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: RecordStatus,
    pub label: &'static str,
    pub count: usize,
}

/// Everything the reporting screen shows for one filtered record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end: Option<NaiveDate>,
    pub total_count: usize,
    pub average_score: f64,
    pub completion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_coverage: Option<f64>,
    pub status_counts: Vec<StatusCount>,
    pub count_by_period: Vec<NamedBucket>,
    pub count_by_facility: Vec<NamedBucket>,
    pub count_by_type: Vec<NamedBucket>,
    pub score_by_criteria: Vec<CriterionAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_active_facility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_type: Option<String>,
}

impl RecordStatistics {
    pub fn compute(records: &[ScoredRecord], query: &StatsQuery) -> Self {
        let window = query.window(records);
        let selected: Vec<ScoredRecord> = records
            .iter()
            .filter(|record| query.matches(record, window))
            .cloned()
            .collect();

        let status_counts = RecordStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                label: status.label(),
                count: selected.iter().filter(|record| record.status == status).count(),
            })
            .collect();

        let count_by_period = aggregate(&selected, GroupBy::Period);
        let count_by_facility = aggregate(&selected, GroupBy::Facility);
        let count_by_type = aggregate(&selected, GroupBy::Type);

        Self {
            time_range: query.time_range,
            window_start: window.map(|(start, _)| start),
            window_end: window.map(|(_, end)| end),
            total_count: selected.len(),
            average_score: round_to(average_score(&selected), 2),
            completion_rate: round_to(completion_rate(&selected), 1),
            patient_coverage: query
                .active_patients
                .map(|active| round_to(patient_coverage(&selected, active), 1)),
            status_counts,
            most_active_facility: leader(&count_by_facility),
            most_common_type: leader(&count_by_type),
            count_by_period,
            count_by_facility,
            count_by_type,
            score_by_criteria: criteria_averages(&selected),
        }
    }
}

/// First bucket with the highest count, so ties keep bucket order.
fn leader(buckets: &[NamedBucket]) -> Option<String> {
    let mut best: Option<&NamedBucket> = None;
    for bucket in buckets {
        if best.map_or(true, |current| bucket.count > current.count) {
            best = Some(bucket);
        }
    }
    best.map(|bucket| bucket.label.clone())
}
