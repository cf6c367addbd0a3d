use super::super::records::{AssessmentType, RecordKind, ScoredRecord};
use super::round_to;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Period,
    Facility,
    Type,
}

impl GroupBy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "period" | "month" => Some(Self::Period),
            "facility" => Some(Self::Facility),
            "type" => Some(Self::Type),
            _ => None,
        }
    }
}

/// One chart-ready slice of a record collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedBucket {
    pub key: String,
    pub label: String,
    pub count: usize,
    /// Percent of all input records that landed in this bucket.
    pub share: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    label: String,
    count: usize,
    completed: usize,
    score_total: f64,
}

impl Accumulator {
    fn push(&mut self, record: &ScoredRecord) {
        self.count += 1;
        if record.is_completed() {
            self.completed += 1;
            self.score_total += record.score;
        }
    }

    fn into_bucket(self, key: String, total: usize) -> NamedBucket {
        let share = if total == 0 {
            0.0
        } else {
            round_to(self.count as f64 / total as f64 * 100.0, 1)
        };
        let average_score =
            (self.completed > 0).then(|| round_to(self.score_total / self.completed as f64, 2));

        NamedBucket {
            key,
            label: self.label,
            count: self.count,
            share,
            average_score,
        }
    }
}

/// Splits records into buckets; counts always add up to `records.len()`.
pub fn aggregate(records: &[ScoredRecord], group_by: GroupBy) -> Vec<NamedBucket> {
    match group_by {
        GroupBy::Period => by_period(records),
        GroupBy::Facility => by_facility(records),
        GroupBy::Type => by_type(records),
    }
}

fn by_period(records: &[ScoredRecord]) -> Vec<NamedBucket> {
    let mut months: BTreeMap<(i32, u32), Accumulator> = BTreeMap::new();
    for record in records {
        let month = (record.date.year(), record.date.month());
        let slot = months.entry(month).or_default();
        if slot.label.is_empty() {
            slot.label = month_label(record.date);
        }
        slot.push(record);
    }

    months
        .into_iter()
        .map(|((year, month), acc)| acc.into_bucket(format!("{year:04}-{month:02}"), records.len()))
        .collect()
}

fn by_facility(records: &[ScoredRecord]) -> Vec<NamedBucket> {
    let mut facilities: HashMap<&str, Accumulator> = HashMap::new();
    for record in records {
        let slot = facilities.entry(record.facility_id.as_str()).or_default();
        if slot.label.is_empty() || slot.label == record.facility_id {
            slot.label = record.facility_label().to_string();
        }
        slot.push(record);
    }

    let mut buckets: Vec<NamedBucket> = facilities
        .into_iter()
        .map(|(facility_id, acc)| acc.into_bucket(facility_id.to_string(), records.len()))
        .collect();
    buckets.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.key.cmp(&b.key))
    });
    buckets
}

fn by_type(records: &[ScoredRecord]) -> Vec<NamedBucket> {
    let mut types: BTreeMap<u8, (&'static str, Accumulator)> = BTreeMap::new();
    for record in records {
        let (rank, key, label) = type_slot(record);
        let (_, slot) = types.entry(rank).or_insert_with(|| {
            (
                key,
                Accumulator {
                    label: label.to_string(),
                    ..Accumulator::default()
                },
            )
        });
        slot.push(record);
    }

    types
        .into_values()
        .map(|(key, acc)| acc.into_bucket(key.to_string(), records.len()))
        .collect()
}

/// Fixed display order: assessment types first, then untyped records by kind.
fn type_slot(record: &ScoredRecord) -> (u8, &'static str, &'static str) {
    match (record.assessment_type, record.kind) {
        (Some(AssessmentType::Initial), _) => (0, "initial", AssessmentType::Initial.label()),
        (Some(AssessmentType::FollowUp), _) => (1, "follow_up", AssessmentType::FollowUp.label()),
        (Some(AssessmentType::Discharge), _) => {
            (2, "discharge", AssessmentType::Discharge.label())
        }
        (None, RecordKind::Audit) => (3, "audit", RecordKind::Audit.label()),
        (None, RecordKind::Assessment) => (4, "assessment", RecordKind::Assessment.label()),
    }
}

fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}
