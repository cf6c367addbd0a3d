pub mod benchmark;
pub(crate) mod lenient;
pub mod rating;
pub mod records;
pub mod scoring;
pub mod stats;

pub use benchmark::{BenchmarkComparator, BenchmarkStatus, Comparison};
pub use rating::{Rating, ScoreBand};
pub use records::{AssessmentType, RecordKind, RecordStatus, ScoredRecord};
pub use scoring::{compute_weighted_score, Criterion, CriterionRating, RatingSheet, ScoreCalculator};
