use super::super::stats::round_to;
use super::{compare_with_tolerance, finite_or_zero, percent_difference, BenchmarkStatus};
use serde::{Deserialize, Serialize};

/// Share of the remaining gap closed each month by an improvement plan.
const MONTHLY_GAP_CLOSURE: f64 = 0.2;
const PLAN_HORIZONS_MONTHS: [u32; 3] = [3, 6, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkCategory {
    AuditCompletion,
    DocumentationQuality,
    StaffPerformance,
    PatientSatisfaction,
    Other,
}

impl BenchmarkCategory {
    /// Accepts `auditCompletion`, `audit_completion`, and similar spellings.
    pub fn from_key(key: &str) -> Self {
        let normalized: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "auditcompletion" => Self::AuditCompletion,
            "documentationquality" => Self::DocumentationQuality,
            "staffperformance" => Self::StaffPerformance,
            "patientsatisfaction" => Self::PatientSatisfaction,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AuditCompletion => "Audit Completion",
            Self::DocumentationQuality => "Documentation Quality",
            Self::StaffPerformance => "Staff Performance",
            Self::PatientSatisfaction => "Patient Satisfaction",
            Self::Other => "Other",
        }
    }

    fn recommendation(self, behind: bool) -> &'static str {
        match (self, behind) {
            (Self::AuditCompletion, true) => {
                "Increase audit completion rate by implementing automated reminders and scheduling tools."
            }
            (Self::AuditCompletion, false) => {
                "Maintain current audit completion processes while monitoring for quality."
            }
            (Self::DocumentationQuality, true) => {
                "Improve documentation completeness through staff training and standardized templates."
            }
            (Self::DocumentationQuality, false) => {
                "Sustain documentation quality while seeking opportunities for process efficiency."
            }
            (Self::StaffPerformance, true) => {
                "Address staff performance gaps through targeted training and improved supervision."
            }
            (Self::StaffPerformance, false) => {
                "Continue staff development activities while celebrating performance achievements."
            }
            (Self::PatientSatisfaction, true) => {
                "Enhance patient experience through service improvements based on feedback analysis."
            }
            (Self::PatientSatisfaction, false) => {
                "Maintain high patient satisfaction while collecting more granular feedback data."
            }
            (Self::Other, _) => {
                "Analyze underlying factors and develop targeted improvement strategies."
            }
        }
    }
}

/// Raw metric as submitted for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTarget {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    pub target_value: f64,
    pub actual_value: f64,
    #[serde(default)]
    pub lower_is_better: bool,
}

impl MetricTarget {
    pub fn new(key: impl Into<String>, actual_value: f64, target_value: f64) -> Self {
        Self {
            key: key.into(),
            label: None,
            target_value,
            actual_value,
            lower_is_better: false,
        }
    }

    pub fn lower_is_better(mut self) -> Self {
        self.lower_is_better = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkMetric {
    pub key: String,
    pub category: BenchmarkCategory,
    pub label: String,
    pub target_value: f64,
    pub actual_value: f64,
    pub lower_is_better: bool,
    pub status: BenchmarkStatus,
    pub percent_difference: f64,
}

impl BenchmarkMetric {
    pub fn evaluate(metric: MetricTarget, tolerance_pct: f64) -> Self {
        let category = BenchmarkCategory::from_key(&metric.key);
        let target_value = finite_or_zero(metric.target_value);
        let actual_value = finite_or_zero(metric.actual_value);
        let comparison =
            compare_with_tolerance(actual_value, target_value, metric.lower_is_better, tolerance_pct);

        let label = metric
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| match category {
                BenchmarkCategory::Other => metric.key.clone(),
                known => known.label().to_string(),
            });

        Self {
            key: metric.key,
            category,
            label,
            target_value,
            actual_value,
            lower_is_better: metric.lower_is_better,
            status: comparison.status,
            percent_difference: round_to(comparison.percent_difference, 1),
        }
    }

    /// Percent behind target in the metric's direction; negative when ahead.
    pub fn shortfall(&self) -> f64 {
        -percent_difference(self.actual_value, self.target_value, self.lower_is_better)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    Low,
    Medium,
    High,
}

impl GapPriority {
    pub fn for_shortfall(shortfall: f64) -> Self {
        if shortfall > 15.0 {
            Self::High
        } else if shortfall > 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceGap {
    pub key: String,
    pub label: String,
    pub category: BenchmarkCategory,
    /// Absolute distance from target, in percent.
    pub gap: f64,
    pub behind_target: bool,
    pub priority: GapPriority,
    pub recommendation: &'static str,
}

/// One gap entry per metric, in input order.
pub fn analyze_gaps(metrics: &[BenchmarkMetric]) -> Vec<PerformanceGap> {
    metrics
        .iter()
        .map(|metric| {
            let shortfall = metric.shortfall();
            let behind = shortfall > 0.0;
            PerformanceGap {
                key: metric.key.clone(),
                label: metric.label.clone(),
                category: metric.category,
                gap: round_to(shortfall.abs(), 1),
                behind_target: behind,
                priority: GapPriority::for_shortfall(shortfall),
                recommendation: metric.category.recommendation(behind),
            }
        })
        .collect()
}

/// Value reached after `months` of closing a fifth of the starting gap per
/// month, never past the target. Metrics already on target keep their value.
pub fn improvement_target(current: f64, target: f64, months: u32, lower_is_better: bool) -> f64 {
    let current = finite_or_zero(current);
    let target = finite_or_zero(target);

    let gap = if lower_is_better {
        current - target
    } else {
        target - current
    };
    if gap <= 0.0 {
        return current;
    }

    let step = gap * MONTHLY_GAP_CLOSURE * f64::from(months);
    if lower_is_better {
        (current - step).max(target)
    } else {
        (current + step).min(target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementPlan {
    pub key: String,
    pub label: String,
    pub current: f64,
    pub target: f64,
    pub gap: f64,
    pub priority: GapPriority,
    /// `(months, projected value)` for each plan horizon.
    pub milestones: Vec<(u32, f64)>,
}

/// Plans for metrics behind target, largest shortfall first.
pub fn improvement_plan(metrics: &[BenchmarkMetric]) -> Vec<ImprovementPlan> {
    let mut behind: Vec<(f64, &BenchmarkMetric)> = metrics
        .iter()
        .map(|metric| (metric.shortfall(), metric))
        .filter(|(shortfall, _)| *shortfall > 0.0)
        .collect();
    behind.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.key.cmp(&b.1.key)));

    behind
        .into_iter()
        .map(|(shortfall, metric)| ImprovementPlan {
            key: metric.key.clone(),
            label: metric.label.clone(),
            current: metric.actual_value,
            target: metric.target_value,
            gap: round_to(shortfall, 1),
            priority: GapPriority::for_shortfall(shortfall),
            milestones: PLAN_HORIZONS_MONTHS
                .iter()
                .map(|&months| {
                    let value = improvement_target(
                        metric.actual_value,
                        metric.target_value,
                        months,
                        metric.lower_is_better,
                    );
                    (months, round_to(value, 1))
                })
                .collect(),
        })
        .collect()
}
