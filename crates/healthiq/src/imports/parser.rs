use super::normalizer::{canonical_header, normalize_text};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row with every cell still optional; validation happens when the
/// row is turned into a record.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) id: Option<String>,
    #[serde(
        rename = "Facility ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) facility_id: Option<String>,
    #[serde(rename = "Facility", default, deserialize_with = "empty_string_as_none")]
    pub(crate) facility: Option<String>,
    #[serde(rename = "Patient", default, deserialize_with = "empty_string_as_none")]
    pub(crate) patient: Option<String>,
    #[serde(rename = "Date", default, deserialize_with = "empty_string_as_none")]
    pub(crate) date: Option<String>,
    #[serde(rename = "Score", default, deserialize_with = "empty_string_as_none")]
    pub(crate) score: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "empty_string_as_none")]
    pub(crate) assessment_type: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    pub(crate) notes: Option<String>,
}

/// A data row, or the reason it could not be decoded.
#[derive(Debug)]
pub(crate) struct ParsedRow {
    pub(crate) line: u64,
    pub(crate) row: Result<RecordRow, String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(canonical_header)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        rows.push(ParsedRow {
            line,
            row: decode_row(record, &headers),
        });
    }

    Ok(rows)
}

fn decode_row(record: csv::ByteRecord, headers: &csv::StringRecord) -> Result<RecordRow, String> {
    let record = csv::StringRecord::from_byte_record(record).map_err(|err| {
        let column = err.utf8_error().field();
        let name = headers.get(column).unwrap_or("unnamed");
        format!("invalid UTF-8 in column '{name}'")
    })?;
    record
        .deserialize(Some(headers))
        .map_err(|err| format!("undecodable row: {err}"))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| normalize_text(&value))
        .filter(|value| !value.is_empty()))
}

/// RFC 3339 timestamps keep their UTC date; bare `YYYY-MM-DD` is taken as is.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
