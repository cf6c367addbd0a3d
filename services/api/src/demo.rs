use crate::infra::InMemoryAuditRepository;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use healthiq::analytics::benchmark::{
    analyze_gaps, improvement_plan, rank_facilities, BenchmarkComparator, BenchmarkMetric,
    FacilityMetrics, ImprovementProjection, MetricTarget,
};
use healthiq::analytics::rating::Rating;
use healthiq::analytics::records::{AssessmentType, RecordKind, RecordStatus, ScoredRecord};
use healthiq::analytics::scoring::{
    CategoryProgress, Criterion, CriterionId, CriterionRating, RatingSheet, ScoreBreakdown,
    ScoreCalculator,
};
use healthiq::analytics::stats::{
    aggregate, GroupBy, NamedBucket, RecordStatistics, StatsQuery, TimeRange,
};
use healthiq::audits::{AuditService, AuditStart, RatingUpdate};
use healthiq::config::{AnalyticsConfig, AppConfig};
use healthiq::error::AppError;
use healthiq::imports::RecordImporter;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with the weighted criterion set
    #[arg(long)]
    pub(crate) criteria: PathBuf,
    /// JSON file with the ratings recorded against the criteria
    #[arg(long)]
    pub(crate) ratings: PathBuf,
    /// Print the full breakdown as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// CSV export of assessments or audits
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Record kind contained in the export
    #[arg(long, value_parser = crate::infra::parse_kind, default_value = "assessment")]
    pub(crate) kind: RecordKind,
    /// Print a single grouping instead of every breakdown
    #[arg(long, value_parser = crate::infra::parse_group_by)]
    pub(crate) group_by: Option<GroupBy>,
    /// Reporting window (3months, 6months, ytd, 12months)
    #[arg(long, value_parser = crate::infra::parse_time_range)]
    pub(crate) time_range: Option<TimeRange>,
    /// Window end date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Restrict the summary to one facility id
    #[arg(long)]
    pub(crate) facility: Option<String>,
    /// Active patient count used for coverage
    #[arg(long)]
    pub(crate) active_patients: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[arg(long)]
    pub(crate) actual: f64,
    #[arg(long)]
    pub(crate) target: f64,
    /// Treat smaller values as better (e.g. incident rates)
    #[arg(long)]
    pub(crate) lower_is_better: bool,
    /// Override the configured tolerance band, in percent
    #[arg(long)]
    pub(crate) tolerance: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ProjectArgs {
    #[arg(long)]
    pub(crate) current: f64,
    #[arg(long)]
    pub(crate) target: f64,
    /// Days available to reach the target
    #[arg(long)]
    pub(crate) days: u32,
    /// Override the configured milestone spacing, in days
    #[arg(long)]
    pub(crate) interval: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let criteria: Vec<Criterion> = read_json(&args.criteria)?;
    let ratings: Vec<CriterionRating> = read_json(&args.ratings)?;

    let calculator = ScoreCalculator::new(criteria)?;
    let sheet = RatingSheet::from_ratings(ratings)?;
    let breakdown = calculator.score(&sheet);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    render_breakdown(&breakdown, &calculator.category_progress(&sheet));
    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let import = RecordImporter::from_path(&args.records, args.kind)?;
    println!(
        "Loaded {} {} record(s) from {}",
        import.records.len(),
        args.kind.label().to_lowercase(),
        args.records.display()
    );
    for skipped in &import.skipped {
        println!("  - skipped line {}: {}", skipped.line, skipped.reason);
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let mut query = StatsQuery::new();
    if let Some(range) = args.time_range {
        query = query.with_time_range(range, today);
    }
    if let Some(facility) = args.facility {
        query = query.with_facility(facility);
    }
    if let Some(active) = args.active_patients {
        query = query.with_active_patients(active);
    }

    match args.group_by {
        Some(group_by) => {
            let selected: Vec<ScoredRecord> =
                query.filter(&import.records).into_iter().cloned().collect();
            render_buckets(group_by, &aggregate(&selected, group_by));
        }
        None => render_statistics(&RecordStatistics::compute(&import.records, &query)),
    }
    Ok(())
}

pub(crate) fn run_benchmark_compare(args: CompareArgs) -> Result<(), AppError> {
    let analytics = AppConfig::load()?.analytics;
    let comparator = match args.tolerance {
        Some(tolerance) => BenchmarkComparator::new(tolerance, analytics.milestone_interval_days),
        None => BenchmarkComparator::from_config(&analytics),
    };

    let comparison = comparator.compare(args.actual, args.target, args.lower_is_better);
    println!(
        "{} vs target {} -> {} ({:+.1}% | tolerance ±{}%)",
        args.actual,
        args.target,
        comparison.status.label(),
        comparison.percent_difference,
        comparator.tolerance_pct()
    );
    Ok(())
}

pub(crate) fn run_benchmark_project(args: ProjectArgs) -> Result<(), AppError> {
    let days = crate::infra::projection_days(args.days)?;
    let analytics = AppConfig::load()?.analytics;
    let comparator = BenchmarkComparator::new(
        analytics.benchmark_tolerance_pct,
        args.interval.unwrap_or(analytics.milestone_interval_days),
    );
    render_projection(&comparator.project(args.current, args.target, days));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let analytics = AnalyticsConfig::default();
    let comparator = BenchmarkComparator::from_config(&analytics);

    println!("HealthIQ analytics demo ({today})");

    println!("\nAudit wizard");
    let service = AuditService::new(Arc::new(InMemoryAuditRepository::default()));
    let draft = service.start(AuditStart {
        facility_id: "12".to_string(),
        facility_name: Some("Maple House".to_string()),
        audit_date: today,
        criteria: demo_criteria(),
        notes: None,
    })?;
    println!(
        "- Opened {} for {} with {} criteria",
        draft.id,
        draft.facility_name.as_deref().unwrap_or(&draft.facility_id),
        draft.criteria().len()
    );

    let answers = [
        ("env-1", Rating::Pass),
        ("env-2", Rating::Good),
        ("doc-1", Rating::Partial),
        ("doc-2", Rating::NotApplicable),
        ("staff-1", Rating::Limited),
    ];
    for (criterion, rating) in answers {
        let progress = service.rate(
            &draft.id,
            CriterionId::from(criterion),
            RatingUpdate {
                rating,
                notes: String::new(),
            },
        )?;
        println!(
            "  - {criterion}: {} -> running score {} ({}/{} answered)",
            rating.label(),
            progress.score,
            progress.answered,
            progress.total
        );
    }
    let audit = service.submit(&draft.id)?;
    println!(
        "- Submitted {} with score {:.0} ({} indicators)",
        audit.id,
        audit.score,
        audit.indicator_scores.len()
    );

    let mut records = demo_records(today);
    records.push(audit);

    println!("\nLast 6 months");
    let query = StatsQuery::new()
        .with_time_range(TimeRange::SixMonths, today)
        .with_active_patients(8);
    render_statistics(&RecordStatistics::compute(&records, &query));

    println!("\nBenchmarks");
    let metrics: Vec<BenchmarkMetric> = vec![
        MetricTarget::new("auditCompletion", 72.0, 90.0),
        MetricTarget::new("documentationQuality", 84.0, 85.0),
        MetricTarget::new("staffPerformance", 61.0, 80.0),
        MetricTarget::new("patientSatisfaction", 93.0, 88.0),
    ]
    .into_iter()
    .map(|metric| comparator.evaluate(metric))
    .collect();
    for metric in &metrics {
        println!(
            "- {}: {} vs {} -> {} ({:+.1}%)",
            metric.label,
            metric.actual_value,
            metric.target_value,
            metric.status.label(),
            metric.percent_difference
        );
    }
    for gap in analyze_gaps(&metrics).iter().filter(|gap| gap.behind_target) {
        println!(
            "  - {:?} priority gap of {:.1} on {}: {}",
            gap.priority, gap.gap, gap.label, gap.recommendation
        );
    }
    for plan in improvement_plan(&metrics) {
        let steps: Vec<String> = plan
            .milestones
            .iter()
            .map(|(months, value)| format!("{months}m: {value:.1}"))
            .collect();
        println!("  - plan for {}: {}", plan.label, steps.join(", "));
    }

    println!("\nFacility rankings");
    let facility_metrics = FacilityMetrics::for_all(&records, today);
    let previous = HashMap::from([("12".to_string(), 3), ("7".to_string(), 1)]);
    for ranking in rank_facilities(&facility_metrics, &previous) {
        let movement = match ranking.movement {
            Some(delta) if delta > 0 => format!("up {delta}"),
            Some(delta) if delta < 0 => format!("down {}", -delta),
            Some(_) => "unchanged".to_string(),
            None => "new".to_string(),
        };
        println!(
            "- #{} of {} {} ({:.1}) {}",
            ranking.rank,
            ranking.total_facilities,
            ranking.facility_name,
            ranking.audit_score,
            movement
        );
    }

    println!("\nProjection");
    render_projection(&comparator.project(72.0, 90.0, 90));

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn render_breakdown(breakdown: &ScoreBreakdown, categories: &[CategoryProgress]) {
    println!(
        "Score {} ({}) | {} rated | {} not applicable | {} unrated",
        breakdown.score,
        breakdown.band.label(),
        breakdown.rated,
        breakdown.excluded,
        breakdown.unrated
    );
    for category in categories {
        println!(
            "  - {}: {}% complete | score {}",
            category.category, category.completion_pct, category.score
        );
    }
    if !breakdown.unknown_criteria.is_empty() {
        let ignored: Vec<&str> = breakdown
            .unknown_criteria
            .iter()
            .map(CriterionId::as_str)
            .collect();
        println!("  Ignored ratings for unknown criteria: {}", ignored.join(", "));
    }
}

fn render_statistics(stats: &RecordStatistics) {
    if let (Some(start), Some(end)) = (stats.window_start, stats.window_end) {
        println!("Window {start} to {end}");
    }
    println!(
        "- {} records | average score {:.2} | completion {:.1}%",
        stats.total_count, stats.average_score, stats.completion_rate
    );
    if let Some(coverage) = stats.patient_coverage {
        println!("- patient coverage {coverage:.1}%");
    }
    let statuses: Vec<String> = stats
        .status_counts
        .iter()
        .map(|status| format!("{} {}", status.count, status.label.to_lowercase()))
        .collect();
    println!("- {}", statuses.join(" | "));
    if let Some(facility) = &stats.most_active_facility {
        println!("- most active facility: {facility}");
    }
    if let Some(kind) = &stats.most_common_type {
        println!("- most common type: {kind}");
    }

    render_buckets(GroupBy::Period, &stats.count_by_period);
    render_buckets(GroupBy::Facility, &stats.count_by_facility);
    render_buckets(GroupBy::Type, &stats.count_by_type);

    if !stats.score_by_criteria.is_empty() {
        println!("By criterion:");
        for criterion in &stats.score_by_criteria {
            println!(
                "  - {}: {:.2} ({} samples)",
                criterion.criterion_name, criterion.average_score, criterion.samples
            );
        }
    }
}

fn render_buckets(group_by: GroupBy, buckets: &[NamedBucket]) {
    if buckets.is_empty() {
        return;
    }
    let heading = match group_by {
        GroupBy::Period => "By month",
        GroupBy::Facility => "By facility",
        GroupBy::Type => "By type",
    };
    println!("{heading}:");
    for bucket in buckets {
        let average = bucket
            .average_score
            .map(|score| format!(" | avg {score:.1}"))
            .unwrap_or_default();
        println!(
            "  - {}: {} ({:.1}%){}",
            bucket.label, bucket.count, bucket.share, average
        );
    }
}

fn render_projection(projection: &ImprovementProjection) {
    println!(
        "{} -> {} over {} days ({:+.3}/day)",
        projection.current,
        projection.target,
        projection.days_to_target,
        projection.daily_improvement
    );
    for milestone in &projection.milestones {
        println!(
            "  - day {}: {:.1} ({}% of the way)",
            milestone.day, milestone.value, milestone.percent_complete
        );
    }
}

fn demo_criteria() -> Vec<Criterion> {
    vec![
        Criterion::new("env-1", "Environment", 3.0).with_description("Common areas are clean"),
        Criterion::new("env-2", "Environment", 1.0).with_description("Exits are unobstructed"),
        Criterion::new("doc-1", "Documentation", 2.0)
            .with_description("Care plans reviewed this quarter"),
        Criterion::new("doc-2", "Documentation", 1.0)
            .with_description("Wound charts signed off"),
        Criterion::new("staff-1", "Staff", 2.0).with_description("Handover notes complete"),
    ]
}

fn demo_records(today: NaiveDate) -> Vec<ScoredRecord> {
    let days_ago = |days: i64| {
        today
            .checked_sub_signed(Duration::days(days))
            .unwrap_or(NaiveDate::MIN)
    };
    vec![
        ScoredRecord::new("a-101", RecordKind::Assessment, "12", days_ago(12), RecordStatus::Completed)
            .with_facility_name("Maple House")
            .with_patient("p-1")
            .with_assessment_type(AssessmentType::Initial)
            .with_score(78.0),
        ScoredRecord::new("a-102", RecordKind::Assessment, "12", days_ago(40), RecordStatus::Completed)
            .with_facility_name("Maple House")
            .with_patient("p-2")
            .with_assessment_type(AssessmentType::FollowUp)
            .with_score(84.0),
        ScoredRecord::new("a-103", RecordKind::Assessment, "7", days_ago(75), RecordStatus::Completed)
            .with_facility_name("Cedar Court")
            .with_patient("p-3")
            .with_assessment_type(AssessmentType::Initial)
            .with_score(66.0),
        ScoredRecord::new("a-104", RecordKind::Assessment, "7", days_ago(3), RecordStatus::Scheduled)
            .with_facility_name("Cedar Court")
            .with_patient("p-4")
            .with_assessment_type(AssessmentType::Discharge),
        ScoredRecord::new("a-105", RecordKind::Assessment, "7", days_ago(100), RecordStatus::Missed)
            .with_facility_name("Cedar Court")
            .with_assessment_type(AssessmentType::FollowUp),
        ScoredRecord::new("au-201", RecordKind::Audit, "7", days_ago(30), RecordStatus::Completed)
            .with_facility_name("Cedar Court")
            .with_score(88.0),
        ScoredRecord::new("au-202", RecordKind::Audit, "3", days_ago(20), RecordStatus::Completed)
            .with_facility_name("Birch Lodge")
            .with_score(71.0),
    ]
}
