//! Live gateway backed by an OpenAI-compatible chat completions API

use super::ModelGateway;
use crate::config::GatewaySettings;
use crate::error::{ReposcoreError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completions response body (only the fields we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Gateway performing exactly one HTTPS call per completion
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
}

impl OpenAiGateway {
    pub fn new(api_key: SecretString, settings: &GatewaySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reposcore/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| {
                ReposcoreError::Config(config::ConfigError::Message(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            model: settings.model.clone(),
        })
    }

    fn unavailable(e: reqwest::Error) -> ReposcoreError {
        if e.is_timeout() {
            ReposcoreError::GatewayUnavailable("request to model backend timed out".to_string())
        } else {
            ReposcoreError::GatewayUnavailable(format!("request to model backend failed: {}", e))
        }
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(&self, content: &str, instruction: &str) -> Result<String> {
        debug!("Calling model backend ({})", self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: instruction,
                },
                Message {
                    role: "user",
                    content,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(Self::unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ReposcoreError::GatewayUnavailable(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            ReposcoreError::GatewayUnavailable(format!("Failed to parse response: {}", e))
        })?;

        api_response
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or_else(|| {
                ReposcoreError::GatewayUnavailable("Empty response from API".to_string())
            })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
