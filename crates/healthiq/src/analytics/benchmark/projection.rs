use super::super::stats::round_to;
use super::finite_or_zero;
use crate::config::AnalyticsConfig;
use serde::Serialize;

/// Longest horizon accepted from callers; ten years of daily milestones at most.
pub const MAX_PROJECTION_DAYS: u32 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub day: u32,
    pub value: f64,
    pub percent_complete: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementProjection {
    pub current: f64,
    pub target: f64,
    pub days_to_target: u32,
    pub daily_improvement: f64,
    pub milestones: Vec<Milestone>,
}

pub fn project_improvement(current: f64, target: f64, days_to_target: u32) -> ImprovementProjection {
    project_improvement_with_interval(
        current,
        target,
        days_to_target,
        AnalyticsConfig::DEFAULT_MILESTONE_INTERVAL_DAYS,
    )
}

/// Straight-line path from `current` to `target`, with a milestone every
/// `interval_days` and a closing one on `days_to_target`.
pub fn project_improvement_with_interval(
    current: f64,
    target: f64,
    days_to_target: u32,
    interval_days: u32,
) -> ImprovementProjection {
    let current = finite_or_zero(current);
    let target = finite_or_zero(target);

    if days_to_target == 0 {
        return ImprovementProjection {
            current,
            target,
            days_to_target,
            daily_improvement: 0.0,
            milestones: Vec::new(),
        };
    }

    let interval = interval_days.max(1);
    let daily_improvement = (target - current) / f64::from(days_to_target);
    let intervals = days_to_target.div_ceil(interval);

    let milestones = (1..=intervals)
        .map(|step| {
            let day = step.saturating_mul(interval).min(days_to_target);
            let progress = f64::from(day) / f64::from(days_to_target) * 100.0;
            Milestone {
                day,
                value: round_to(current + daily_improvement * f64::from(day), 1),
                percent_complete: progress.round().min(100.0) as u8,
            }
        })
        .collect();

    ImprovementProjection {
        current,
        target,
        days_to_target,
        daily_improvement,
        milestones,
    }
}
