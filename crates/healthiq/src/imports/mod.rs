mod exporter;
mod normalizer;
mod parser;

pub use exporter::RecordExporter;

use crate::analytics::lenient;
use crate::analytics::records::{AssessmentType, RecordKind, RecordStatus, ScoredRecord};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use parser::{ParsedRow, RecordRow};

#[derive(Debug)]
pub enum RecordImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RecordImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordImportError::Io(err) => write!(f, "failed to read record export: {}", err),
            RecordImportError::Csv(err) => write!(f, "invalid record CSV data: {}", err),
        }
    }
}

impl std::error::Error for RecordImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordImportError::Io(err) => Some(err),
            RecordImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RecordImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RecordImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Row left out of an import, with the 1-based CSV line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordImport {
    pub records: Vec<ScoredRecord>,
    pub skipped: Vec<SkippedRow>,
}

pub struct RecordImporter;

impl RecordImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        kind: RecordKind,
    ) -> Result<RecordImport, RecordImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, kind)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        kind: RecordKind,
    ) -> Result<RecordImport, RecordImportError> {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for ParsedRow { line, row } in parser::parse_rows(reader)? {
            match row.and_then(|row| build_record(line, row, kind)) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(line, %reason, "skipping record row");
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        Ok(RecordImport { records, skipped })
    }
}

fn build_record(line: u64, row: RecordRow, kind: RecordKind) -> Result<ScoredRecord, String> {
    let date = match row.date.as_deref() {
        Some(raw) => parser::parse_date(raw).ok_or_else(|| format!("unparseable date '{raw}'"))?,
        None => return Err("missing date".to_string()),
    };

    let facility_id = row
        .facility_id
        .ok_or_else(|| "missing facility id".to_string())?;

    let status = match row.status.as_deref() {
        Some(raw) => {
            RecordStatus::parse(raw).ok_or_else(|| format!("unrecognized status '{raw}'"))?
        }
        None => return Err("missing status".to_string()),
    };

    let score = match row.score.as_deref() {
        Some(raw) => lenient::parse_number(raw).unwrap_or_else(|| {
            debug!(line, raw, "malformed score treated as 0");
            0.0
        }),
        None => 0.0,
    };

    let assessment_type = row.assessment_type.as_deref().and_then(|raw| {
        let parsed = AssessmentType::parse(raw);
        if parsed.is_none() {
            debug!(line, raw, "unknown assessment type ignored");
        }
        parsed
    });

    let id = row.id.unwrap_or_else(|| format!("row-{line}"));

    let mut record = ScoredRecord::new(id, kind, facility_id, date, status).with_score(score);
    record.facility_name = row.facility;
    record.patient = row.patient;
    record.assessment_type = assessment_type;
    record.notes = row.notes;
    Ok(record)
}
