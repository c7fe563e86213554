//! Evaluation orchestrator
//!
//! [`EvaluationService`] is the only component that knows about both the
//! gateway and the store. A call either returns a fully validated, persisted
//! record or leaves the store untouched.

use crate::error::{ReposcoreError, Result};
use crate::evaluation::parser;
use crate::gateway::ModelGateway;
use crate::storage::HistoryStore;
use crate::types::{
    AnalysisId, AnalysisRecord, AnalysisRecordDraft, AnalysisVersion, EvaluationResult,
    RepositoryId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ceiling on a single gateway call when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Composes gateway, parser and history store
pub struct EvaluationService {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn HistoryStore>,
    timeout: Duration,
}

impl EvaluationService {
    pub fn new(gateway: Arc<dyn ModelGateway>, store: Arc<dyn HistoryStore>) -> Self {
        Self::with_timeout(gateway, store, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn HistoryStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            timeout,
        }
    }

    /// Name of the active gateway
    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Pass-through completion with input validation and a timeout
    pub async fn complete_raw(&self, content: &str, instruction: &str) -> Result<String> {
        require_non_blank("content", content)?;
        require_non_blank("instruction", instruction)?;

        debug!(
            "Requesting completion from {} ({} content bytes)",
            self.gateway.name(),
            content.len()
        );

        match tokio::time::timeout(self.timeout, self.gateway.complete(content, instruction)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Gateway {} did not answer within {:?}",
                    self.gateway.name(),
                    self.timeout
                );
                Err(ReposcoreError::GatewayUnavailable(format!(
                    "no answer within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    /// Gateway call plus validation, without persisting
    pub async fn evaluate(&self, content: &str, instruction: &str) -> Result<EvaluationResult> {
        let raw = self.complete_raw(content, instruction).await?;
        parser::parse(&raw).map_err(|e| {
            warn!("Model output rejected: {}", e);
            e
        })
    }

    /// Evaluate a repository and append the result to its history
    pub async fn evaluate_and_persist(
        &self,
        repository_id: RepositoryId,
        content: &str,
        instruction: &str,
    ) -> Result<AnalysisRecord> {
        let evaluation = self.evaluate(content, instruction).await?;
        let record = self
            .store
            .append(AnalysisRecordDraft::new(repository_id, evaluation))
            .await?;

        info!(
            "Stored analysis {} for repository {} (total {})",
            record.id,
            repository_id,
            record.total_score()
        );
        Ok(record)
    }

    pub async fn register_repository(&self, html_url: &str) -> Result<RepositoryId> {
        self.store.register_repository(html_url).await
    }

    pub async fn latest_for(&self, repository_id: RepositoryId) -> Result<Option<AnalysisRecord>> {
        self.store.latest_for(repository_id).await
    }

    pub async fn all_for(&self, repository_id: RepositoryId) -> Result<Vec<AnalysisRecord>> {
        self.store.all_for(repository_id).await
    }

    /// Version list for a repository, newest first
    pub async fn history_for(&self, repository_id: RepositoryId) -> Result<Vec<AnalysisVersion>> {
        let records = self.store.all_for(repository_id).await?;
        Ok(AnalysisVersion::from_history(&records))
    }

    pub async fn count_for(&self, repository_id: RepositoryId) -> Result<u64> {
        self.store.count_for(repository_id).await
    }

    /// One analysis by id; `NotFound` when absent
    pub async fn analysis(&self, id: AnalysisId) -> Result<AnalysisRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ReposcoreError::NotFound(format!("analysis {}", id)))
    }
}

fn require_non_blank(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReposcoreError::InvalidInput(format!(
            "{} must not be empty",
            name
        )));
    }
    Ok(())
}
