use chrono::NaiveDate;
use healthiq::analytics::records::{RecordKind, RecordStatus, ScoredRecord};
use healthiq::analytics::stats::{
    aggregate, average_score, completion_rate, GroupBy, RecordStatistics, StatsQuery, TimeRange,
};
use healthiq::imports::{RecordExporter, RecordImporter};

fn sample_records() -> Vec<ScoredRecord> {
    let data = include_bytes!("../sample_assessments.csv");
    let import = RecordImporter::from_reader(&data[..], RecordKind::Assessment)
        .expect("sample export imports");
    assert!(import.skipped.is_empty());
    import.records
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn summary_covers_the_whole_export() {
    let records = sample_records();
    let stats = RecordStatistics::compute(&records, &StatsQuery::new().with_active_patients(10));

    assert_eq!(stats.total_count, 8);
    assert_eq!(stats.average_score, 76.2);
    assert_eq!(stats.completion_rate, 71.4);
    assert_eq!(stats.patient_coverage, Some(70.0));
    assert_eq!(stats.most_active_facility.as_deref(), Some("Maple House"));
    assert_eq!(stats.most_common_type.as_deref(), Some("Initial"));

    let missed = stats
        .status_counts
        .iter()
        .find(|count| count.status == RecordStatus::Missed)
        .expect("missed bucket present");
    assert_eq!(missed.count, 1);
}

#[test]
fn bucket_counts_always_sum_to_the_total() {
    let records = sample_records();
    for group_by in [GroupBy::Period, GroupBy::Facility, GroupBy::Type] {
        let buckets = aggregate(&records, group_by);
        let total: usize = buckets.iter().map(|bucket| bucket.count).sum();
        assert_eq!(total, records.len(), "{group_by:?}");
    }

    let periods = aggregate(&records, GroupBy::Period);
    let keys: Vec<&str> = periods.iter().map(|bucket| bucket.key.as_str()).collect();
    assert_eq!(keys, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);
}

#[test]
fn time_range_and_facility_narrow_the_selection() {
    let records = sample_records();

    let last_quarter = StatsQuery::new().with_time_range(TimeRange::ThreeMonths, date(2025, 4, 30));
    let stats = RecordStatistics::compute(&records, &last_quarter);
    assert_eq!(stats.total_count, 6);
    assert_eq!(stats.window_start, Some(date(2025, 1, 30)));

    let maple = StatsQuery::new().with_facility("12");
    let stats = RecordStatistics::compute(&records, &maple);
    assert_eq!(stats.total_count, 4);
    assert_eq!(stats.count_by_facility.len(), 1);
}

#[test]
fn exported_records_import_unchanged() {
    let records = sample_records();
    let csv = RecordExporter::to_csv_string(&records).expect("export succeeds");
    let reimported = RecordImporter::from_reader(csv.as_bytes(), RecordKind::Assessment)
        .expect("reimport succeeds");

    assert!(reimported.skipped.is_empty());
    assert_eq!(average_score(&reimported.records), average_score(&records));
    assert_eq!(completion_rate(&reimported.records), completion_rate(&records));
    assert_eq!(reimported.records[4].notes.as_deref(), Some("second visit"));
}
