use healthiq::analytics::rating::{Rating, ScoreBand};
use healthiq::analytics::scoring::{
    compute_weighted_score, Criterion, CriterionId, CriterionRating, RatingSheet, ScoreCalculator,
    ScoringError,
};

fn pair(weight_a: f64, weight_b: f64) -> Vec<Criterion> {
    vec![
        Criterion::new("a", "Environment", weight_a),
        Criterion::new("b", "Documentation", weight_b),
    ]
}

#[test]
fn excluded_ratings_alone_score_zero() {
    let ratings = vec![
        CriterionRating::new("a", Rating::NotApplicable),
        CriterionRating::new("b", Rating::NotRated),
    ];
    assert_eq!(compute_weighted_score(&ratings, &pair(2.0, 1.0)), Ok(0));

    let only_na = vec![CriterionRating::new("a", Rating::NotApplicable)];
    let single = vec![Criterion::new("a", "Environment", 2.0)];
    assert_eq!(compute_weighted_score(&only_na, &single), Ok(0));
}

#[test]
fn all_passing_scores_one_hundred() {
    let ratings = vec![
        CriterionRating::new("a", Rating::Pass),
        CriterionRating::new("b", Rating::Pass),
    ];
    let calculator = ScoreCalculator::new(pair(5.0, 0.5)).expect("valid criteria");
    let breakdown = calculator.score(&RatingSheet::from_ratings(ratings).expect("unique ratings"));

    assert_eq!(breakdown.score, 100);
    assert_eq!(breakdown.band, ScoreBand::Excellent);
    assert_eq!(breakdown.rated, 2);
}

#[test]
fn weights_decide_the_mix() {
    let ratings = vec![
        CriterionRating::new("a", Rating::Pass),
        CriterionRating::new("b", Rating::Fail),
    ];
    assert_eq!(compute_weighted_score(&ratings, &pair(3.0, 1.0)), Ok(75));
}

#[test]
fn rating_order_does_not_change_the_score() {
    let criteria = vec![
        Criterion::new("a", "Environment", 2.0),
        Criterion::new("b", "Environment", 1.0),
        Criterion::new("c", "Staff", 4.0),
    ];
    let forward = vec![
        CriterionRating::new("a", Rating::Good),
        CriterionRating::new("b", Rating::Limited),
        CriterionRating::new("c", Rating::Partial),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    assert_eq!(
        compute_weighted_score(&forward, &criteria),
        compute_weighted_score(&reversed, &criteria)
    );
}

#[test]
fn unknown_ratings_are_reported_and_ignored() {
    let calculator = ScoreCalculator::new(pair(1.0, 1.0)).expect("valid criteria");
    let sheet = RatingSheet::from_ratings(vec![
        CriterionRating::new("a", Rating::Pass),
        CriterionRating::new("zz", Rating::Fail),
    ])
    .expect("unique ratings");

    let breakdown = calculator.score(&sheet);
    assert_eq!(breakdown.score, 100);
    assert_eq!(breakdown.unrated, 1);
    assert_eq!(breakdown.unknown_criteria, vec![CriterionId::from("zz")]);
}

#[test]
fn duplicate_ratings_are_rejected() {
    let ratings = vec![
        CriterionRating::new("a", Rating::Pass),
        CriterionRating::new("a", Rating::Fail),
    ];
    assert_eq!(
        compute_weighted_score(&ratings, &pair(1.0, 1.0)),
        Err(ScoringError::DuplicateRating(CriterionId::from("a")))
    );
}

#[test]
fn criteria_arrive_from_loose_json() {
    let criteria: Vec<Criterion> = serde_json::from_str(
        r#"[
            {"id": 1, "category": "Environment", "weight": "3"},
            {"id": "2", "category": "Environment", "weight": null}
        ]"#,
    )
    .expect("criteria parse");
    assert_eq!(criteria[0].id, CriterionId::from("1"));
    assert_eq!(criteria[0].weight, 3.0);
    assert_eq!(criteria[1].weight, 1.0);

    let ratings = vec![
        CriterionRating::new("1", Rating::Fail),
        CriterionRating::new("2", Rating::Pass),
    ];
    assert_eq!(compute_weighted_score(&ratings, &criteria), Ok(25));
}
