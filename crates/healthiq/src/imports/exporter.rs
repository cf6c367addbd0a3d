use super::normalizer::headers;
use crate::analytics::records::{RecordStatus, ScoredRecord};
use std::io::Write;

/// Writes records in the same column layout the importer reads.
pub struct RecordExporter;

impl RecordExporter {
    pub fn write<W: Write>(records: &[ScoredRecord], writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(headers())?;

        for record in records {
            let date = record.date.format("%Y-%m-%d").to_string();
            let score = format_score(record.score);
            csv_writer.write_record([
                record.id.0.as_str(),
                record.facility_id.as_str(),
                record.facility_name.as_deref().unwrap_or(""),
                record.patient.as_deref().unwrap_or(""),
                date.as_str(),
                score.as_str(),
                status_cell(record),
                record
                    .assessment_type
                    .map(|assessment_type| assessment_type.label())
                    .unwrap_or(""),
                record.notes.as_deref().unwrap_or(""),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(records: &[ScoredRecord]) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        Self::write(records, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn status_cell(record: &ScoredRecord) -> &'static str {
    match record.status {
        RecordStatus::Scheduled => "scheduled",
        RecordStatus::Completed => "completed",
        RecordStatus::Missed => "missed",
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score}")
    }
}
