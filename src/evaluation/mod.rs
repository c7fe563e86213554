//! Evaluation pipeline
//!
//! - [`parser`]: turns raw model text into a validated [`EvaluationResult`]
//! - [`prompt`]: the built-in instruction used when callers omit one
//! - [`orchestrator`]: [`EvaluationService`] composing gateway, parser and store
//!
//! [`EvaluationResult`]: crate::types::EvaluationResult

pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use orchestrator::EvaluationService;
pub use parser::parse;
pub use prompt::{instruction_or_default, DEFAULT_INSTRUCTION};
