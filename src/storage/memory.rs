//! Process-local history store

use crate::error::{ReposcoreError, Result};
use crate::storage::{check_scores, validate_html_url, HistoryStore};
use crate::types::{AnalysisId, AnalysisRecord, AnalysisRecordDraft, RepositoryId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    repositories: HashMap<String, RepositoryId>,
    records: Vec<AnalysisRecord>,
    next_repository_id: i64,
    next_analysis_id: i64,
}

impl Inner {
    fn knows(&self, repository_id: RepositoryId) -> bool {
        self.repositories.values().any(|id| *id == repository_id)
    }

    fn history(&self, repository_id: RepositoryId) -> Vec<AnalysisRecord> {
        let mut records: Vec<AnalysisRecord> = self
            .records
            .iter()
            .filter(|r| r.repository_id == repository_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records
    }
}

/// [`HistoryStore`] kept entirely in memory; contents vanish with the process
#[derive(Default)]
pub struct InMemoryHistoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn register_repository(&self, html_url: &str) -> Result<RepositoryId> {
        let html_url = validate_html_url(html_url)?;
        let mut inner = self.inner.write().await;

        if let Some(id) = inner.repositories.get(html_url) {
            return Ok(*id);
        }

        inner.next_repository_id += 1;
        let id = RepositoryId(inner.next_repository_id);
        inner.repositories.insert(html_url.to_string(), id);
        Ok(id)
    }

    async fn append(&self, draft: AnalysisRecordDraft) -> Result<AnalysisRecord> {
        check_scores(&draft)?;
        let mut inner = self.inner.write().await;

        if !inner.knows(draft.repository_id) {
            return Err(ReposcoreError::PersistenceFailure(format!(
                "unknown repository {}",
                draft.repository_id
            )));
        }

        let floor = inner
            .records
            .iter()
            .filter(|r| r.repository_id == draft.repository_id)
            .map(|r| r.created_at)
            .max();
        let now = Utc::now();
        let created_at = floor.map_or(now, |latest| latest.max(now));

        inner.next_analysis_id += 1;
        let record =
            AnalysisRecord::from_draft(AnalysisId(inner.next_analysis_id), created_at, draft);
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn latest_for(&self, repository_id: RepositoryId) -> Result<Option<AnalysisRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.repository_id == repository_id)
            .fold(None, |best: Option<&AnalysisRecord>, r| match best {
                Some(b) if !r.is_newer_than(b) => Some(b),
                _ => Some(r),
            })
            .cloned())
    }

    async fn all_for(&self, repository_id: RepositoryId) -> Result<Vec<AnalysisRecord>> {
        Ok(self.inner.read().await.history(repository_id))
    }

    async fn count_for(&self, repository_id: RepositoryId) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.repository_id == repository_id)
            .count() as u64)
    }

    async fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }
}
