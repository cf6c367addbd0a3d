use super::domain::{Criterion, RatingSheet};
use super::ScoreComponent;

/// Running numerator/denominator of a weighted average.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WeightedTotals {
    pub score: f64,
    pub weight: f64,
}

impl WeightedTotals {
    pub(crate) fn add(&mut self, value: u8, weight: f64) {
        self.score += f64::from(value) * weight;
        self.weight += weight;
    }

    /// Rounded percentage; an empty denominator scores zero.
    pub(crate) fn percentage(&self) -> u8 {
        if self.weight <= 0.0 {
            return 0;
        }

        (self.score / self.weight).round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RatingTally {
    pub rated: usize,
    pub excluded: usize,
    pub unrated: usize,
}

pub(crate) fn score_criteria<'a, I>(
    criteria: I,
    sheet: &RatingSheet,
) -> (Vec<ScoreComponent>, WeightedTotals, RatingTally)
where
    I: IntoIterator<Item = &'a Criterion>,
{
    let mut components = Vec::new();
    let mut totals = WeightedTotals::default();
    let mut tally = RatingTally::default();

    for criterion in criteria {
        let rating = sheet.rating_for(&criterion.id);
        let value = rating.and_then(|rating| rating.value());

        match (rating, value) {
            (Some(_), Some(value)) => {
                totals.add(value, criterion.weight);
                tally.rated += 1;
            }
            (Some(rating), None) if rating.is_answered() => tally.excluded += 1,
            _ => tally.unrated += 1,
        }

        components.push(ScoreComponent {
            criterion_id: criterion.id.clone(),
            category: criterion.category.clone(),
            rating,
            value,
            weight: criterion.weight,
            contribution: value.map_or(0.0, |value| f64::from(value) * criterion.weight),
            counted: value.is_some(),
        });
    }

    (components, totals, tally)
}
