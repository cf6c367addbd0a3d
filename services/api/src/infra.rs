use chrono::NaiveDate;
use healthiq::analytics::benchmark::MAX_PROJECTION_DAYS;
use healthiq::analytics::records::{RecordKind, ScoredRecord};
use healthiq::analytics::stats::{GroupBy, TimeRange};
use healthiq::audits::{AuditDraft, AuditRepository, DraftId, RepositoryError};
use healthiq::config::AnalyticsConfig;
use healthiq::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) analytics: AnalyticsConfig,
}

/// Process-local draft and audit store; the backend remains the system of
/// record.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditRepository {
    drafts: Arc<Mutex<HashMap<DraftId, AuditDraft>>>,
    records: Arc<Mutex<Vec<ScoredRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

impl AuditRepository for InMemoryAuditRepository {
    fn insert_draft(&self, draft: AuditDraft) -> Result<AuditDraft, RepositoryError> {
        let mut guard = lock(&self.drafts)?;
        if guard.contains_key(&draft.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(draft.id.clone(), draft.clone());
        Ok(draft)
    }

    fn fetch_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        Ok(lock(&self.drafts)?.get(id).cloned())
    }

    fn modify_draft(
        &self,
        id: &DraftId,
        apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError> {
        let mut guard = lock(&self.drafts)?;
        Ok(guard.get_mut(id).map(|draft| {
            apply(draft);
            draft.clone()
        }))
    }

    fn take_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        Ok(lock(&self.drafts)?.remove(id))
    }

    fn insert_record(&self, record: ScoredRecord) -> Result<ScoredRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_kind(raw: &str) -> Result<RecordKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "assessment" | "assessments" => Ok(RecordKind::Assessment),
        "audit" | "audits" => Ok(RecordKind::Audit),
        other => Err(format!("unknown record kind '{other}' (expected assessment or audit)")),
    }
}

pub(crate) fn parse_group_by(raw: &str) -> Result<GroupBy, String> {
    GroupBy::parse(raw)
        .ok_or_else(|| format!("unknown grouping '{raw}' (expected period, facility or type)"))
}

pub(crate) fn parse_time_range(raw: &str) -> Result<TimeRange, String> {
    TimeRange::parse(raw)
        .ok_or_else(|| format!("unknown time range '{raw}' (expected 3months, 6months, ytd or 12months)"))
}

pub(crate) fn projection_days(days: u32) -> Result<u32, AppError> {
    if days > MAX_PROJECTION_DAYS {
        return Err(AppError::InvalidInput(format!(
            "days_to_target {days} exceeds the {MAX_PROJECTION_DAYS} day maximum"
        )));
    }
    Ok(days)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
