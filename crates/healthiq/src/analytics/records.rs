use super::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::identifier(deserializer).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Assessment,
    Audit,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assessment => "Assessment",
            Self::Audit => "Audit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Scheduled,
    Completed,
    #[serde(alias = "incomplete")]
    Missed,
}

impl RecordStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Scheduled, Self::Completed, Self::Missed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Missed => "Missed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "pending" => Some(Self::Scheduled),
            "completed" | "complete" | "done" => Some(Self::Completed),
            "missed" | "incomplete" => Some(Self::Missed),
            _ => None,
        }
    }

    /// Only scheduled records move, and only to a terminal state.
    pub fn transition(self, next: Self) -> Result<Self, RecordError> {
        match (self, next) {
            (Self::Scheduled, Self::Completed) | (Self::Scheduled, Self::Missed) => Ok(next),
            (from, to) => Err(RecordError::InvalidTransition { from, to }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Initial,
    #[serde(alias = "followup", alias = "follow-up")]
    FollowUp,
    Discharge,
}

impl AssessmentType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Initial, Self::FollowUp, Self::Discharge]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::FollowUp => "Follow-up",
            Self::Discharge => "Discharge",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "initial" => Some(Self::Initial),
            "followup" => Some(Self::FollowUp),
            "discharge" => Some(Self::Discharge),
            _ => None,
        }
    }
}

/// Per-criterion score attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    #[serde(deserialize_with = "lenient::identifier")]
    pub criterion_id: String,
    #[serde(default)]
    pub criterion_name: String,
    #[serde(default, deserialize_with = "lenient::score")]
    pub score: f64,
}

/// Assessment or audit as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(deserialize_with = "lenient::identifier")]
    pub facility_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::score")]
    pub score: f64,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_type: Option<AssessmentType>,
    #[serde(default)]
    pub indicator_scores: Vec<IndicatorScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScoredRecord {
    pub fn new(
        id: impl Into<String>,
        kind: RecordKind,
        facility_id: impl Into<String>,
        date: NaiveDate,
        status: RecordStatus,
    ) -> Self {
        Self {
            id: RecordId(id.into()),
            kind,
            patient: None,
            facility_id: facility_id.into(),
            facility_name: None,
            date,
            score: 0.0,
            status,
            assessment_type: None,
            indicator_scores: Vec::new(),
            notes: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = lenient::clamp_score(score);
        self
    }

    pub fn with_patient(mut self, patient: impl Into<String>) -> Self {
        self.patient = Some(patient.into());
        self
    }

    pub fn with_facility_name(mut self, name: impl Into<String>) -> Self {
        self.facility_name = Some(name.into());
        self
    }

    pub fn with_assessment_type(mut self, assessment_type: AssessmentType) -> Self {
        self.assessment_type = Some(assessment_type);
        self
    }

    pub fn with_indicator(
        mut self,
        criterion_id: impl Into<String>,
        criterion_name: impl Into<String>,
        score: f64,
    ) -> Self {
        self.indicator_scores.push(IndicatorScore {
            criterion_id: criterion_id.into(),
            criterion_name: criterion_name.into(),
            score: lenient::clamp_score(score),
        });
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    pub fn facility_label(&self) -> &str {
        self.facility_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.facility_id)
    }

    /// Moves a scheduled record to completed with its final score.
    pub fn complete(&mut self, score: f64) -> Result<(), RecordError> {
        self.status = self.status.transition(RecordStatus::Completed)?;
        self.score = lenient::clamp_score(score);
        Ok(())
    }

    pub fn mark_missed(&mut self) -> Result<(), RecordError> {
        self.status = self.status.transition(RecordStatus::Missed)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record cannot move from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: RecordStatus,
        to: RecordStatus,
    },
}
