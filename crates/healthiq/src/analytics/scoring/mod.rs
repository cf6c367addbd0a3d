mod domain;
mod progress;
mod rules;

pub use domain::{Criterion, CriterionId, CriterionRating, RatingSheet};
pub use progress::CategoryProgress;

use super::rating::{Rating, ScoreBand};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Validated criterion set that turns rating sheets into weighted scores.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    criteria: Vec<Criterion>,
}

impl ScoreCalculator {
    /// Rejects negative weights and repeated ids; non-finite weights are
    /// normalized to 1.
    pub fn new(criteria: Vec<Criterion>) -> Result<Self, ScoringError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(criteria.len());

        for mut criterion in criteria {
            if !seen.insert(criterion.id.clone()) {
                return Err(ScoringError::DuplicateCriterion(criterion.id));
            }

            if !criterion.weight.is_finite() {
                debug!(criterion = %criterion.id, "non-finite weight normalized to 1");
                criterion.weight = Criterion::default_weight();
            }

            if criterion.weight < 0.0 {
                return Err(ScoringError::NegativeWeight {
                    criterion_id: criterion.id,
                    weight: criterion.weight,
                });
            }

            validated.push(criterion);
        }

        Ok(Self {
            criteria: validated,
        })
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn contains(&self, criterion_id: &CriterionId) -> bool {
        self.criteria
            .iter()
            .any(|criterion| &criterion.id == criterion_id)
    }

    pub fn score(&self, sheet: &RatingSheet) -> ScoreBreakdown {
        let (components, totals, tally) = rules::score_criteria(&self.criteria, sheet);

        let unknown_criteria = sheet
            .ratings()
            .filter(|entry| !self.contains(&entry.criterion_id))
            .map(|entry| entry.criterion_id.clone())
            .collect();

        let score = totals.percentage();

        ScoreBreakdown {
            score,
            band: ScoreBand::for_score(f64::from(score)),
            rated_weight: totals.weight,
            rated: tally.rated,
            excluded: tally.excluded,
            unrated: tally.unrated,
            unknown_criteria,
            components,
        }
    }

    /// Categories in the order their first criterion appears.
    pub fn categories(&self) -> Vec<&str> {
        progress::ordered_categories(&self.criteria)
    }

    pub fn category_progress(&self, sheet: &RatingSheet) -> Vec<CategoryProgress> {
        progress::category_progress(&self.criteria, sheet)
    }
}

/// Weighted percentage for a batch of ratings against a criterion set.
pub fn compute_weighted_score(
    ratings: &[CriterionRating],
    criteria: &[Criterion],
) -> Result<u8, ScoringError> {
    let calculator = ScoreCalculator::new(criteria.to_vec())?;
    let sheet = RatingSheet::from_ratings(ratings.iter().cloned())?;
    Ok(calculator.score(&sheet).score)
}

/// Contribution of a single criterion, kept for report audit trails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub criterion_id: CriterionId,
    pub category: String,
    pub rating: Option<Rating>,
    pub value: Option<u8>,
    pub weight: f64,
    pub contribution: f64,
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub band: ScoreBand,
    pub rated_weight: f64,
    pub rated: usize,
    pub excluded: usize,
    pub unrated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_criteria: Vec<CriterionId>,
    pub components: Vec<ScoreComponent>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("criterion {criterion_id} has negative weight {weight}")]
    NegativeWeight {
        criterion_id: CriterionId,
        weight: f64,
    },
    #[error("criterion {0} is defined more than once")]
    DuplicateCriterion(CriterionId),
    #[error("criterion {0} was rated more than once")]
    DuplicateRating(CriterionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("env-1", "Environment", 2.0),
            Criterion::new("env-2", "Environment", 1.0),
            Criterion::new("doc-1", "Documentation", 1.0),
        ]
    }

    #[test]
    fn breakdown_tracks_every_criterion() {
        let calculator = ScoreCalculator::new(criteria()).expect("valid criteria");
        let sheet = RatingSheet::from_ratings(vec![
            CriterionRating::new("env-1", Rating::Good),
            CriterionRating::new("env-2", Rating::NotApplicable),
        ])
        .expect("unique ratings");

        let breakdown = calculator.score(&sheet);

        assert_eq!(breakdown.score, 75);
        assert_eq!(breakdown.band, ScoreBand::Good);
        assert_eq!(breakdown.rated, 1);
        assert_eq!(breakdown.excluded, 1);
        assert_eq!(breakdown.unrated, 1);
        assert_eq!(breakdown.rated_weight, 2.0);
        assert_eq!(breakdown.components.len(), 3);
        let env_1 = &breakdown.components[0];
        assert!(env_1.counted);
        assert_eq!(env_1.contribution, 150.0);
    }

    #[test]
    fn rounds_half_up() {
        let calculator = ScoreCalculator::new(vec![
            Criterion::new("a", "A", 1.0),
            Criterion::new("b", "A", 1.0),
        ])
        .expect("valid criteria");
        let sheet = RatingSheet::from_ratings(vec![
            CriterionRating::new("a", Rating::Pass),
            CriterionRating::new("b", Rating::Fail),
        ])
        .expect("unique");
        assert_eq!(calculator.score(&sheet).score, 50);

        let calculator = ScoreCalculator::new(vec![
            Criterion::new("a", "A", 1.0),
            Criterion::new("b", "A", 1.0),
            Criterion::new("c", "A", 1.0),
            Criterion::new("d", "A", 1.0),
        ])
        .expect("valid criteria");
        let sheet = RatingSheet::from_ratings(vec![
            CriterionRating::new("a", Rating::Pass),
            CriterionRating::new("b", Rating::Pass),
            CriterionRating::new("c", Rating::Limited),
            CriterionRating::new("d", Rating::Fail),
        ])
        .expect("unique");
        // (100 + 100 + 25 + 0) / 4 = 56.25
        assert_eq!(calculator.score(&sheet).score, 56);
    }

    #[test]
    fn rejects_negative_weights_and_duplicates() {
        let err = ScoreCalculator::new(vec![Criterion::new("a", "A", -1.0)])
            .expect_err("negative weight rejected");
        assert!(matches!(err, ScoringError::NegativeWeight { .. }));

        let err = ScoreCalculator::new(vec![
            Criterion::new("a", "A", 1.0),
            Criterion::new("a", "B", 1.0),
        ])
        .expect_err("duplicate rejected");
        assert_eq!(err, ScoringError::DuplicateCriterion(CriterionId::from("a")));

        let err = RatingSheet::from_ratings(vec![
            CriterionRating::new("a", Rating::Pass),
            CriterionRating::new("a", Rating::Fail),
        ])
        .expect_err("duplicate rating rejected");
        assert_eq!(err, ScoringError::DuplicateRating(CriterionId::from("a")));
    }

    #[test]
    fn non_finite_weight_counts_as_one() {
        let calculator = ScoreCalculator::new(vec![
            Criterion::new("a", "A", f64::NAN),
            Criterion::new("b", "A", 1.0),
        ])
        .expect("nan normalized");
        assert_eq!(calculator.criteria()[0].weight, 1.0);

        let sheet = RatingSheet::from_ratings(vec![
            CriterionRating::new("a", Rating::Pass),
            CriterionRating::new("b", Rating::Fail),
        ])
        .expect("unique");
        assert_eq!(calculator.score(&sheet).score, 50);
    }

    #[test]
    fn unknown_ratings_are_reported_not_scored() {
        let calculator = ScoreCalculator::new(criteria()).expect("valid criteria");
        let sheet = RatingSheet::from_ratings(vec![
            CriterionRating::new("doc-1", Rating::Pass),
            CriterionRating::new("ghost", Rating::Fail),
        ])
        .expect("unique");

        let breakdown = calculator.score(&sheet);
        assert_eq!(breakdown.score, 100);
        assert_eq!(breakdown.unknown_criteria, vec![CriterionId::from("ghost")]);
    }

    #[test]
    fn category_progress_follows_wizard_order() {
        let calculator = ScoreCalculator::new(criteria()).expect("valid criteria");
        assert_eq!(calculator.categories(), vec!["Environment", "Documentation"]);

        let mut sheet = RatingSheet::new();
        sheet.set(CriterionRating::new("env-1", Rating::Partial));
        sheet.set(CriterionRating::new("env-2", Rating::NotRated));

        let progress = calculator.category_progress(&sheet);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].category, "Environment");
        assert_eq!(progress[0].answered, 1);
        assert_eq!(progress[0].total, 2);
        assert_eq!(progress[0].completion_pct, 50);
        assert_eq!(progress[0].score, 50);
        assert_eq!(progress[1].answered, 0);
        assert_eq!(progress[1].score, 0);

        sheet.set(CriterionRating::new("env-2", Rating::NotApplicable));
        let progress = calculator.category_progress(&sheet);
        assert_eq!(progress[0].completion_pct, 100);
    }
}
