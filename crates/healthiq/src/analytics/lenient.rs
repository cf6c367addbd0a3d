//! Forgiving deserializers for numeric fields that arrive from loosely typed
//! API payloads (numbers as strings, nulls, integer identifiers).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentifierLike {
    Text(String),
    Integer(i64),
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Numbers, numeric strings, and nulls; anything unparseable becomes `None`.
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberLike>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        NumberLike::Number(number) => Some(number).filter(|n| n.is_finite()),
        NumberLike::Text(text) => parse_number(&text),
    }))
}

pub(crate) fn weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_number(deserializer)?.unwrap_or(1.0))
}

pub(crate) fn score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(clamp_score(optional_number(deserializer)?.unwrap_or(0.0)))
}

pub(crate) fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdentifierLike::deserialize(deserializer)? {
        IdentifierLike::Text(text) => text.trim().to_string(),
        IdentifierLike::Integer(number) => number.to_string(),
    })
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default = "one", deserialize_with = "weight")]
        weight: f64,
        #[serde(default, deserialize_with = "score")]
        score: f64,
        #[serde(deserialize_with = "identifier")]
        id: String,
    }

    fn one() -> f64 {
        1.0
    }

    #[test]
    fn missing_and_garbage_values_fall_back() {
        let sample: Sample = serde_json::from_str(r#"{"id": 7, "score": "n/a"}"#).expect("parses");
        assert_eq!(sample.weight, 1.0);
        assert_eq!(sample.score, 0.0);
        assert_eq!(sample.id, "7");

        let sample: Sample =
            serde_json::from_str(r#"{"id": " c-1 ", "weight": null, "score": "87.5%"}"#)
                .expect("parses");
        assert_eq!(sample.weight, 1.0);
        assert_eq!(sample.score, 87.5);
        assert_eq!(sample.id, "c-1");
    }

    #[test]
    fn scores_are_clamped() {
        let sample: Sample = serde_json::from_str(r#"{"id": "x", "score": 140}"#).expect("parses");
        assert_eq!(sample.score, 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }
}
