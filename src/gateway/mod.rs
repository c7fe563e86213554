//! Model gateway: the boundary through which the pipeline reaches an LLM
//!
//! Two implementations exist:
//! - [`OpenAiGateway`] forwards requests to an OpenAI-compatible backend
//! - [`DisabledGateway`] answers with a fixed explanatory message
//!
//! Which one a process uses is decided once, at startup, by [`select`].

pub mod disabled;
pub mod openai;

pub use disabled::{DisabledGateway, DISABLED_MESSAGE};
pub use openai::OpenAiGateway;

use crate::config::GatewaySettings;
use crate::error::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

/// Capability to turn (content, instruction) into raw model text
///
/// Implementations do not validate their inputs and never retry; both are
/// the caller's business.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Ask the model to respond to `content` under `instruction`
    async fn complete(&self, content: &str, instruction: &str) -> Result<String>;

    /// Short name for logs and health output
    fn name(&self) -> &'static str;
}

/// Pick the gateway for this process from the credential's presence
pub fn select(
    api_key: Option<SecretString>,
    settings: &GatewaySettings,
) -> Result<Arc<dyn ModelGateway>> {
    match api_key {
        Some(key) => {
            let gateway = OpenAiGateway::new(key, settings)?;
            info!(
                "Model gateway: {} (model {}, base {})",
                gateway.name(),
                settings.model,
                settings.base_url
            );
            Ok(Arc::new(gateway))
        }
        None => {
            warn!(
                "Model gateway: {} ({} not set, evaluations will not be generated)",
                DisabledGateway.name(),
                crate::config::API_KEY_ENV
            );
            Ok(Arc::new(DisabledGateway))
        }
    }
}
