use serde::{Deserialize, Serialize};

/// Qualitative judgment recorded against a single criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Pass,
    #[serde(alias = "high-partial")]
    Good,
    Partial,
    #[serde(alias = "low-partial")]
    Limited,
    Fail,
    NotApplicable,
    NotRated,
}

impl Rating {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Pass,
            Self::Good,
            Self::Partial,
            Self::Limited,
            Self::Fail,
            Self::NotApplicable,
            Self::NotRated,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Good => "Good",
            Self::Partial => "Partial",
            Self::Limited => "Limited",
            Self::Fail => "Fail",
            Self::NotApplicable => "Not Applicable",
            Self::NotRated => "Not Rated",
        }
    }

    /// Percentage credited for the rating; `None` removes the criterion from
    /// both sides of the weighted average.
    pub const fn value(self) -> Option<u8> {
        match self {
            Self::Pass => Some(100),
            Self::Good => Some(75),
            Self::Partial => Some(50),
            Self::Limited => Some(25),
            Self::Fail => Some(0),
            Self::NotApplicable | Self::NotRated => None,
        }
    }

    pub const fn is_excluded(self) -> bool {
        self.value().is_none()
    }

    /// A criterion counts as answered once it carries anything but `not-rated`.
    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::NotRated)
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Pass
        } else if score >= 65.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Partial
        } else if score >= 20.0 {
            Self::Limited
        } else {
            Self::Fail
        }
    }
}

/// Labelled band for an overall percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreBand {
    pub const EXCELLENT_FLOOR: f64 = 80.0;
    pub const GOOD_FLOOR: f64 = 60.0;
    pub const FAIR_FLOOR: f64 = 50.0;

    pub fn for_score(score: f64) -> Self {
        if score >= Self::EXCELLENT_FLOOR {
            Self::Excellent
        } else if score >= Self::GOOD_FLOOR {
            Self::Good
        } else if score >= Self::FAIR_FLOOR {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}
