use super::super::records::{RecordKind, ScoredRecord};
use super::super::stats::round_to;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

const AUDIT_WINDOW_DAYS: i64 = 90;
const ASSESSMENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityMetrics {
    pub facility_id: String,
    pub facility_name: String,
    pub as_of: NaiveDate,
    pub audit_average: f64,
    pub audit_count: usize,
    pub audit_window_days: i64,
    pub recent_assessment_count: usize,
    pub recent_assessment_average: f64,
    pub assessment_window_days: i64,
}

/// First day of a trailing window; clamps at the earliest representable date.
fn window_start(as_of: NaiveDate, days: i64) -> NaiveDate {
    as_of
        .checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

impl FacilityMetrics {
    /// Completed audits from the last 90 days and completed assessments
    /// from the last 30, both ending on `as_of`.
    pub fn from_records(records: &[ScoredRecord], facility_id: &str, as_of: NaiveDate) -> Self {
        let audit_start = window_start(as_of, AUDIT_WINDOW_DAYS);
        let assessment_start = window_start(as_of, ASSESSMENT_WINDOW_DAYS);

        let facility_records: Vec<&ScoredRecord> = records
            .iter()
            .filter(|record| record.facility_id == facility_id)
            .collect();

        let facility_name = facility_records
            .iter()
            .find_map(|record| {
                record
                    .facility_name
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
            })
            .unwrap_or(facility_id)
            .to_string();

        let (audit_average, audit_count) = completed_mean(
            &facility_records,
            RecordKind::Audit,
            audit_start,
            as_of,
        );
        let (recent_assessment_average, recent_assessment_count) = completed_mean(
            &facility_records,
            RecordKind::Assessment,
            assessment_start,
            as_of,
        );

        Self {
            facility_id: facility_id.to_string(),
            facility_name,
            as_of,
            audit_average,
            audit_count,
            audit_window_days: AUDIT_WINDOW_DAYS,
            recent_assessment_count,
            recent_assessment_average,
            assessment_window_days: ASSESSMENT_WINDOW_DAYS,
        }
    }

    /// Metrics for every facility that appears in `records`.
    pub fn for_all(records: &[ScoredRecord], as_of: NaiveDate) -> Vec<Self> {
        let mut facility_ids: Vec<&str> = records
            .iter()
            .map(|record| record.facility_id.as_str())
            .collect();
        facility_ids.sort_unstable();
        facility_ids.dedup();

        facility_ids
            .into_iter()
            .map(|facility_id| Self::from_records(records, facility_id, as_of))
            .collect()
    }
}

fn completed_mean(
    records: &[&ScoredRecord],
    kind: RecordKind,
    start: NaiveDate,
    end: NaiveDate,
) -> (f64, usize) {
    let (sum, count) = records
        .iter()
        .filter(|record| record.kind == kind && record.is_completed())
        .filter(|record| record.date >= start && record.date <= end)
        .fold((0.0, 0usize), |(sum, count), record| {
            (sum + record.score, count + 1)
        });

    if count == 0 {
        (0.0, 0)
    } else {
        (round_to(sum / count as f64, 2), count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityRanking {
    pub facility_id: String,
    pub facility_name: String,
    pub rank: u32,
    pub total_facilities: u32,
    pub audit_score: f64,
    pub previous_rank: Option<u32>,
    /// Places gained since the previous ranking; negative when dropping.
    pub movement: Option<i64>,
}

/// Ranks by 90 day audit average, best first; ties go to the name that
/// sorts first.
pub fn rank_facilities(
    metrics: &[FacilityMetrics],
    previous_ranks: &HashMap<String, u32>,
) -> Vec<FacilityRanking> {
    let mut ordered: Vec<&FacilityMetrics> = metrics.iter().collect();
    ordered.sort_by(|a, b| {
        b.audit_average
            .total_cmp(&a.audit_average)
            .then_with(|| a.facility_name.cmp(&b.facility_name))
            .then_with(|| a.facility_id.cmp(&b.facility_id))
    });

    let total_facilities = u32::try_from(ordered.len()).unwrap_or(u32::MAX);
    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(facility, rank)| {
            let previous_rank = previous_ranks.get(&facility.facility_id).copied();
            FacilityRanking {
                facility_id: facility.facility_id.clone(),
                facility_name: facility.facility_name.clone(),
                rank,
                total_facilities,
                audit_score: facility.audit_average,
                previous_rank,
                movement: previous_rank.map(|previous| i64::from(previous) - i64::from(rank)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityComparison {
    pub facility_a: FacilityMetrics,
    pub facility_b: FacilityMetrics,
    /// `facility_a` audit average minus `facility_b`.
    pub score_delta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
}

pub fn compare_facilities(a: FacilityMetrics, b: FacilityMetrics) -> FacilityComparison {
    let score_delta = round_to(a.audit_average - b.audit_average, 2);
    let leader = if score_delta > 0.0 {
        Some(a.facility_id.clone())
    } else if score_delta < 0.0 {
        Some(b.facility_id.clone())
    } else {
        None
    };

    FacilityComparison {
        facility_a: a,
        facility_b: b,
        score_delta,
        leader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::records::RecordStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn audit(id: &str, facility: &str, day: NaiveDate, score: f64) -> ScoredRecord {
        ScoredRecord::new(id, RecordKind::Audit, facility, day, RecordStatus::Completed)
            .with_score(score)
    }

    fn sample() -> Vec<ScoredRecord> {
        vec![
            audit("a1", "1", date(2025, 5, 1), 80.0).with_facility_name("Aspen"),
            audit("a2", "1", date(2025, 3, 20), 90.0),
            audit("a3", "1", date(2024, 12, 1), 10.0),
            audit("b1", "2", date(2025, 5, 10), 85.0).with_facility_name("Birch"),
            audit("c1", "3", date(2025, 5, 11), 85.0).with_facility_name("Alder"),
            ScoredRecord::new(
                "s1",
                RecordKind::Assessment,
                "1",
                date(2025, 5, 20),
                RecordStatus::Completed,
            )
            .with_score(70.0),
            ScoredRecord::new(
                "s2",
                RecordKind::Assessment,
                "1",
                date(2025, 5, 25),
                RecordStatus::Scheduled,
            ),
        ]
    }

    #[test]
    fn metrics_use_rolling_windows() {
        let metrics = FacilityMetrics::from_records(&sample(), "1", date(2025, 6, 1));
        assert_eq!(metrics.facility_name, "Aspen");
        assert_eq!(metrics.audit_count, 2);
        assert_eq!(metrics.audit_average, 85.0);
        assert_eq!(metrics.recent_assessment_count, 1);
        assert_eq!(metrics.recent_assessment_average, 70.0);
    }

    #[test]
    fn rankings_break_ties_by_name_and_track_movement() {
        let metrics = FacilityMetrics::for_all(&sample(), date(2025, 6, 1));
        let previous = HashMap::from([("1".to_string(), 1u32), ("3".to_string(), 3u32)]);

        let rankings = rank_facilities(&metrics, &previous);
        let names: Vec<&str> = rankings.iter().map(|r| r.facility_name.as_str()).collect();
        assert_eq!(names, vec!["Alder", "Aspen", "Birch"]);
        assert_eq!(rankings[0].movement, Some(2));
        assert_eq!(rankings[1].movement, Some(-1));
        assert_eq!(rankings[2].previous_rank, None);
        assert!(rankings.iter().all(|r| r.total_facilities == 3));
    }

    #[test]
    fn comparison_names_the_leader() {
        let records = sample();
        let as_of = date(2025, 6, 1);
        let comparison = compare_facilities(
            FacilityMetrics::from_records(&records, "2", as_of),
            FacilityMetrics::from_records(&records, "3", as_of),
        );
        assert_eq!(comparison.score_delta, 0.0);
        assert_eq!(comparison.leader, None);

        let comparison = compare_facilities(
            FacilityMetrics::from_records(&records, "1", as_of),
            FacilityMetrics::from_records(&records, "9", as_of),
        );
        assert_eq!(comparison.leader.as_deref(), Some("1"));
        assert_eq!(comparison.facility_b.facility_name, "9");
    }

    #[test]
    fn windows_clamp_at_the_earliest_date() {
        let records = vec![audit("m1", "1", NaiveDate::MIN, 75.0)];

        let metrics = FacilityMetrics::from_records(&records, "1", NaiveDate::MIN);
        assert_eq!(metrics.audit_count, 1);
        assert_eq!(metrics.audit_average, 75.0);

        let near_min = NaiveDate::MIN + Duration::days(10);
        let metrics = FacilityMetrics::for_all(&records, near_min);
        let rankings = rank_facilities(&metrics, &HashMap::new());
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].audit_score, 75.0);
    }
}
