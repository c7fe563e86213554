//! Shared helper functions for CLI commands

use reposcore_core::{
    config::Settings, gateway, storage::LibsqlHistoryStore, EvaluationService, ReposcoreError,
    Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Wire gateway, store and orchestrator from settings
///
/// Consumes the credential held in `settings`; it is not needed afterwards.
pub async fn build_service(settings: &mut Settings) -> Result<Arc<EvaluationService>> {
    debug!("Using database: {}", settings.database_path);
    let store = LibsqlHistoryStore::from_path(&settings.database_path).await?;
    let gateway = gateway::select(settings.api_key.take(), &settings.gateway)?;

    Ok(Arc::new(EvaluationService::with_timeout(
        gateway,
        Arc::new(store),
        settings.evaluation.timeout(),
    )))
}

/// Content from `--content`, else from `--file`
pub fn read_content(content: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (content, file) {
        (Some(content), _) => Ok(content),
        (None, Some(path)) => {
            debug!("Reading content from {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        (None, None) => Err(ReposcoreError::InvalidInput(
            "provide --content or --file".to_string(),
        )),
    }
}

/// Positive repository id from a CLI argument
pub fn repository_id(id: i64) -> Result<reposcore_core::RepositoryId> {
    if id <= 0 {
        return Err(ReposcoreError::InvalidInput(format!(
            "repository id must be positive, got {}",
            id
        )));
    }
    Ok(reposcore_core::RepositoryId(id))
}
