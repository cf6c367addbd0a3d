//! Facility performance against benchmark targets: status comparisons,
//! straight-line improvement projections, gap analysis, and facility
//! rankings built from completed records.

mod facility;
mod gaps;
mod projection;

pub use facility::{compare_facilities, rank_facilities, FacilityComparison, FacilityMetrics, FacilityRanking};
pub use gaps::{
    analyze_gaps, improvement_plan, improvement_target, BenchmarkCategory, BenchmarkMetric,
    GapPriority, ImprovementPlan, MetricTarget, PerformanceGap,
};
pub use projection::{
    project_improvement, project_improvement_with_interval, ImprovementProjection, Milestone,
    MAX_PROJECTION_DAYS,
};

use crate::config::AnalyticsConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Above,
    At,
    Below,
}

impl BenchmarkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Above => "Above Benchmark",
            Self::At => "At Benchmark",
            Self::Below => "Below Benchmark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub status: BenchmarkStatus,
    /// Positive means better than target in the metric's own direction.
    pub percent_difference: f64,
}

/// Comparator bound to the configured tolerance and milestone interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkComparator {
    tolerance_pct: f64,
    milestone_interval_days: u32,
}

impl BenchmarkComparator {
    pub fn new(tolerance_pct: f64, milestone_interval_days: u32) -> Self {
        Self {
            tolerance_pct: finite_or_zero(tolerance_pct).abs(),
            milestone_interval_days: milestone_interval_days.max(1),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.benchmark_tolerance_pct, config.milestone_interval_days)
    }

    pub fn tolerance_pct(&self) -> f64 {
        self.tolerance_pct
    }

    pub fn milestone_interval_days(&self) -> u32 {
        self.milestone_interval_days
    }

    pub fn compare(&self, actual: f64, target: f64, lower_is_better: bool) -> Comparison {
        compare_with_tolerance(actual, target, lower_is_better, self.tolerance_pct)
    }

    pub fn project(&self, current: f64, target: f64, days_to_target: u32) -> ImprovementProjection {
        project_improvement_with_interval(current, target, days_to_target, self.milestone_interval_days)
    }

    pub fn evaluate(&self, metric: MetricTarget) -> BenchmarkMetric {
        BenchmarkMetric::evaluate(metric, self.tolerance_pct)
    }
}

impl Default for BenchmarkComparator {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

/// Compares with the default 10 percent tolerance band.
pub fn compare(actual: f64, target: f64, lower_is_better: bool) -> Comparison {
    compare_with_tolerance(
        actual,
        target,
        lower_is_better,
        AnalyticsConfig::DEFAULT_TOLERANCE_PCT,
    )
}

pub fn compare_with_tolerance(
    actual: f64,
    target: f64,
    lower_is_better: bool,
    tolerance_pct: f64,
) -> Comparison {
    let percent_difference = percent_difference(actual, target, lower_is_better);
    let tolerance = finite_or_zero(tolerance_pct).abs();

    let status = if percent_difference > tolerance {
        BenchmarkStatus::Above
    } else if percent_difference >= -tolerance {
        BenchmarkStatus::At
    } else {
        BenchmarkStatus::Below
    };

    Comparison {
        status,
        percent_difference,
    }
}

/// Directional difference relative to the target, in percent.
pub(crate) fn percent_difference(actual: f64, target: f64, lower_is_better: bool) -> f64 {
    let actual = finite_or_zero(actual);
    let target = finite_or_zero(target);

    let delta = if lower_is_better {
        target - actual
    } else {
        actual - target
    };

    if target == 0.0 {
        if delta == 0.0 {
            0.0
        } else {
            100.0_f64.copysign(delta)
        }
    } else {
        delta / target * 100.0
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
