//! Degraded-mode gateway used when no model credential is configured

use super::ModelGateway;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Fixed reply of the disabled gateway
pub const DISABLED_MESSAGE: &str = "[AI evaluation disabled] OPENAI_API_KEY is not set. \
Configure the credential to enable live evaluations.";

/// Gateway that never touches the network and never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl ModelGateway for DisabledGateway {
    async fn complete(&self, _content: &str, _instruction: &str) -> Result<String> {
        debug!("Disabled gateway invoked, returning fixed message");
        Ok(DISABLED_MESSAGE.to_string())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
