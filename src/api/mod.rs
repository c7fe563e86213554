//! HTTP API for the evaluation pipeline
//!
//! Every response body, success or failure, uses the [`ApiResponse`]
//! envelope so clients can branch on `code` without parsing messages.

pub mod response;
pub mod server;

pub use response::{ApiError, ApiResponse};
pub use server::{AnalysisView, ApiServer, ApiServerConfig};
