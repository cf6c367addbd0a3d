use super::domain::{Criterion, RatingSheet};
use super::rules::score_criteria;
use serde::Serialize;

/// Completion and score of one wizard step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub category: String,
    pub answered: usize,
    pub total: usize,
    pub completion_pct: u8,
    pub score: u8,
}

pub(crate) fn ordered_categories(criteria: &[Criterion]) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for criterion in criteria {
        if !categories.contains(&criterion.category.as_str()) {
            categories.push(criterion.category.as_str());
        }
    }
    categories
}

pub(crate) fn category_progress(criteria: &[Criterion], sheet: &RatingSheet) -> Vec<CategoryProgress> {
    ordered_categories(criteria)
        .into_iter()
        .map(|category| {
            let members = criteria
                .iter()
                .filter(|criterion| criterion.category == category);
            let (components, totals, _) = score_criteria(members, sheet);

            let total = components.len();
            let answered = components
                .iter()
                .filter(|component| component.rating.is_some_and(|rating| rating.is_answered()))
                .count();
            let completion_pct = if total == 0 {
                0
            } else {
                ((answered as f64 / total as f64) * 100.0).round() as u8
            };

            CategoryProgress {
                category: category.to_string(),
                answered,
                total,
                completion_pct,
                score: totals.percentage(),
            }
        })
        .collect()
}
