//! reposcore - LLM-backed repository quality evaluation
//!
//! Turns already-extracted repository text into a structured evaluation
//! (summary, strengths, improvements, four 0-25 sub-scores) by asking a
//! language model, validating its answer, and appending the result to an
//! immutable per-repository history.
//!
//! # Architecture
//!
//! - **Gateway**: [`ModelGateway`] with a live OpenAI variant and a disabled
//!   variant selected once from configuration
//! - **Evaluation**: the response parser and the [`EvaluationService`]
//!   orchestrator
//! - **Storage**: the append-only [`HistoryStore`] (libSQL or in-memory)
//! - **API**: axum routes over the orchestrator
//!
//! # Example
//!
//! ```ignore
//! use reposcore_core::{gateway, EvaluationService, InMemoryHistoryStore, Settings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> reposcore_core::Result<()> {
//!     let mut settings = Settings::load(None)?;
//!     let gateway = gateway::select(settings.api_key.take(), &settings.gateway)?;
//!     let service = EvaluationService::new(gateway, Arc::new(InMemoryHistoryStore::new()));
//!
//!     let repo = service.register_repository("https://github.com/acme/widgets").await?;
//!     let record = service
//!         .evaluate_and_persist(repo, "README: ...", reposcore_core::DEFAULT_INSTRUCTION)
//!         .await?;
//!     println!("{} / 100", record.total_score());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod gateway;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::Settings;
pub use error::{ErrorKind, ReposcoreError, Result};
pub use evaluation::{instruction_or_default, parse, EvaluationService, DEFAULT_INSTRUCTION};
pub use gateway::{DisabledGateway, ModelGateway, OpenAiGateway};
pub use storage::{ConnectionMode, HistoryStore, InMemoryHistoryStore, LibsqlHistoryStore};
pub use types::{
    AnalysisId, AnalysisRecord, AnalysisRecordDraft, AnalysisVersion, EvaluationResult,
    RepositoryId, ScoreField, Scores, MAX_SUB_SCORE,
};
