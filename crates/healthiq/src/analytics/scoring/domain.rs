use super::super::lenient;
use super::super::rating::Rating;
use super::ScoringError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CriterionId(pub String);

impl CriterionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CriterionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::identifier(deserializer).map(Self)
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CriterionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Weighted evaluation item; the category doubles as the wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub guidance: String,
    #[serde(
        default = "Criterion::default_weight",
        deserialize_with = "lenient::weight"
    )]
    pub weight: f64,
}

impl Criterion {
    pub const fn default_weight() -> f64 {
        1.0
    }

    pub fn new(id: impl Into<String>, category: impl Into<String>, weight: f64) -> Self {
        Self {
            id: CriterionId(id.into()),
            category: category.into(),
            description: String::new(),
            guidance: String::new(),
            weight,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = guidance.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRating {
    pub criterion_id: CriterionId,
    pub rating: Rating,
    #[serde(default)]
    pub notes: String,
}

impl CriterionRating {
    pub fn new(criterion_id: impl Into<String>, rating: Rating) -> Self {
        Self {
            criterion_id: CriterionId(criterion_id.into()),
            rating,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// At most one rating per criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSheet {
    entries: BTreeMap<CriterionId, CriterionRating>,
}

impl RatingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sheet from a submitted batch, refusing two ratings for the same
    /// criterion so the result never depends on input order.
    pub fn from_ratings<I>(ratings: I) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = CriterionRating>,
    {
        let mut entries = BTreeMap::new();
        for rating in ratings {
            match entries.entry(rating.criterion_id.clone()) {
                Entry::Occupied(_) => {
                    return Err(ScoringError::DuplicateRating(rating.criterion_id));
                }
                Entry::Vacant(slot) => {
                    slot.insert(rating);
                }
            }
        }

        Ok(Self { entries })
    }

    /// Replaces whatever was recorded for the criterion.
    pub fn set(&mut self, rating: CriterionRating) -> Option<CriterionRating> {
        self.entries.insert(rating.criterion_id.clone(), rating)
    }

    pub fn get(&self, criterion_id: &CriterionId) -> Option<&CriterionRating> {
        self.entries.get(criterion_id)
    }

    pub fn rating_for(&self, criterion_id: &CriterionId) -> Option<Rating> {
        self.get(criterion_id).map(|entry| entry.rating)
    }

    pub fn ratings(&self) -> impl Iterator<Item = &CriterionRating> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
