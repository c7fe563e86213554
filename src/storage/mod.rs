//! Evaluation history storage
//!
//! History is append-only: a record, once written, is never updated or
//! deleted. Two backends implement [`HistoryStore`]:
//! - [`LibsqlHistoryStore`] persists to a libSQL database (file or memory)
//! - [`InMemoryHistoryStore`] keeps everything in process memory

pub mod libsql;
pub mod memory;

pub use self::libsql::{ConnectionMode, LibsqlHistoryStore};
pub use self::memory::InMemoryHistoryStore;

use crate::error::Result;
use crate::types::{AnalysisId, AnalysisRecord, AnalysisRecordDraft, RepositoryId};
use async_trait::async_trait;

/// Append-only store of analysis records, keyed by repository
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Register a repository by URL, returning the existing id if known
    async fn register_repository(&self, html_url: &str) -> Result<RepositoryId>;

    /// Atomically persist a draft, assigning id and `created_at`
    ///
    /// `created_at` never precedes the repository's current latest record.
    async fn append(&self, draft: AnalysisRecordDraft) -> Result<AnalysisRecord>;

    /// Most recent record for a repository
    async fn latest_for(&self, repository_id: RepositoryId) -> Result<Option<AnalysisRecord>>;

    /// Every record for a repository, newest first
    async fn all_for(&self, repository_id: RepositoryId) -> Result<Vec<AnalysisRecord>>;

    async fn count_for(&self, repository_id: RepositoryId) -> Result<u64>;

    async fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>>;
}

/// Reject blank repository URLs before they reach a backend
pub(crate) fn validate_html_url(html_url: &str) -> Result<&str> {
    let trimmed = html_url.trim();
    if trimmed.is_empty() {
        return Err(crate::ReposcoreError::InvalidInput(
            "repository url must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Refuse drafts whose scores escaped the 0..=25 bounds
pub(crate) fn check_scores(draft: &AnalysisRecordDraft) -> Result<()> {
    draft
        .evaluation
        .scores
        .check_bounds()
        .map_err(|e| crate::ReposcoreError::PersistenceFailure(format!("rejected draft: {}", e)))
}
