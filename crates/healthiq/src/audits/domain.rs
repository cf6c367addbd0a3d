use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::rating::{Rating, ScoreBand};
use crate::analytics::scoring::{
    CategoryProgress, Criterion, CriterionRating, RatingSheet, ScoreBreakdown, ScoreCalculator,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body that opens an audit for a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStart {
    pub facility_id: String,
    #[serde(default)]
    pub facility_name: Option<String>,
    pub audit_date: NaiveDate,
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub rating: Rating,
    #[serde(default)]
    pub notes: String,
}

/// In-progress audit; the rating sheet is edited step by step until submit.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub id: DraftId,
    pub facility_id: String,
    pub facility_name: Option<String>,
    pub audit_date: NaiveDate,
    pub notes: Option<String>,
    pub(crate) calculator: ScoreCalculator,
    pub(crate) sheet: RatingSheet,
}

impl AuditDraft {
    pub fn criteria(&self) -> &[Criterion] {
        self.calculator.criteria()
    }

    pub fn sheet(&self) -> &RatingSheet {
        &self.sheet
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.calculator.score(&self.sheet)
    }

    pub fn progress(&self) -> DraftProgress {
        let breakdown = self.breakdown();
        let categories = self.calculator.category_progress(&self.sheet);
        let answered = categories.iter().map(|category| category.answered).sum();
        let total = categories.iter().map(|category| category.total).sum();

        DraftProgress {
            draft_id: self.id.clone(),
            score: breakdown.score,
            band: breakdown.band,
            answered,
            total,
            ready_to_submit: breakdown.rated > 0,
            categories,
        }
    }

    pub fn view(&self) -> DraftView {
        DraftView {
            id: self.id.clone(),
            facility_id: self.facility_id.clone(),
            facility_name: self.facility_name.clone(),
            audit_date: self.audit_date,
            notes: self.notes.clone(),
            criteria: self.criteria().to_vec(),
            ratings: self.sheet.ratings().cloned().collect(),
            progress: self.progress(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftProgress {
    pub draft_id: DraftId,
    pub score: u8,
    pub band: ScoreBand,
    pub answered: usize,
    pub total: usize,
    pub ready_to_submit: bool,
    pub categories: Vec<CategoryProgress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub id: DraftId,
    pub facility_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
    pub audit_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub criteria: Vec<Criterion>,
    pub ratings: Vec<CriterionRating>,
    pub progress: DraftProgress,
}
