use super::super::records::ScoredRecord;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting window offered by the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "12months")]
    TwelveMonths,
}

impl TimeRange {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "3months" | "3m" => Some(Self::ThreeMonths),
            "6months" | "6m" => Some(Self::SixMonths),
            "ytd" => Some(Self::YearToDate),
            "12months" | "12m" | "1y" => Some(Self::TwelveMonths),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ThreeMonths => "Last 3 Months",
            Self::SixMonths => "Last 6 Months",
            Self::YearToDate => "Year to Date",
            Self::TwelveMonths => "Last 12 Months",
        }
    }

    /// Inclusive `(start, end)` window ending on `today`.
    pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let months_back = match self {
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
            Self::YearToDate => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                return (start, today);
            }
        };

        let start = today
            .checked_sub_months(Months::new(months_back))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_patients: Option<usize>,
}

impl StatsQuery {
    pub fn new() -> Self {
        Self {
            time_range: None,
            facility_id: None,
            today: None,
            active_patients: None,
        }
    }

    pub fn with_time_range(mut self, time_range: TimeRange, today: NaiveDate) -> Self {
        self.time_range = Some(time_range);
        self.today = Some(today);
        self
    }

    pub fn with_facility(mut self, facility_id: impl Into<String>) -> Self {
        self.facility_id = Some(facility_id.into());
        self
    }

    pub fn with_active_patients(mut self, active_patients: usize) -> Self {
        self.active_patients = Some(active_patients);
        self
    }

    /// Resolved window; a range without a reference date falls back to the
    /// latest record date so historical exports still filter sensibly.
    pub fn window(&self, records: &[ScoredRecord]) -> Option<(NaiveDate, NaiveDate)> {
        let range = self.time_range?;
        let today = self
            .today
            .or_else(|| records.iter().map(|record| record.date).max())?;
        Some(range.window(today))
    }

    pub fn matches(&self, record: &ScoredRecord, window: Option<(NaiveDate, NaiveDate)>) -> bool {
        let in_facility = self
            .facility_id
            .as_deref()
            .map_or(true, |facility| record.facility_id == facility);
        let in_window =
            window.map_or(true, |(start, end)| record.date >= start && record.date <= end);
        in_facility && in_window
    }

    pub fn filter<'a>(&self, records: &'a [ScoredRecord]) -> Vec<&'a ScoredRecord> {
        let window = self.window(records);
        records
            .iter()
            .filter(|record| self.matches(record, window))
            .collect()
    }
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self::new()
    }
}
