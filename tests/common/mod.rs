//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use reposcore_core::{
    ConnectionMode, EvaluationService, LibsqlHistoryStore, ModelGateway, ReposcoreError, Result,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const REFERENCE_JSON: &str = r#"{"summary":"Good docs, weak tests","strengths":["Clear README"],"improvements":["Add unit tests"],"scores":{"readme":20,"test":5,"commit":15,"cicd":0}}"#;

/// Build a valid model answer with the given summary and readme score
pub fn evaluation_json(summary: &str, readme: i64) -> String {
    format!(
        r#"{{"summary":"{}","strengths":["s"],"improvements":["i"],"scores":{{"readme":{},"test":5,"commit":15,"cicd":0}}}}"#,
        summary, readme
    )
}

/// Create a file-backed libSQL store in a temporary directory
///
/// Uses a file instead of `:memory:` so the schema and data live in one
/// database regardless of how connections are opened.
pub async fn create_test_store() -> (TempDir, Arc<LibsqlHistoryStore>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("reposcore_test.db");
    let store = LibsqlHistoryStore::open(ConnectionMode::Local(
        path.to_string_lossy().to_string(),
    ))
    .await
    .expect("Failed to create test store");
    (dir, Arc::new(store))
}

/// One scripted gateway answer: optional delay, then the result
pub struct Scripted {
    pub delay: Duration,
    pub answer: Result<String>,
}

impl Scripted {
    pub fn ok(answer: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            answer: Ok(answer.into()),
        }
    }

    pub fn after(delay: Duration, answer: impl Into<String>) -> Self {
        Self {
            delay,
            answer: Ok(answer.into()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            answer: Err(ReposcoreError::GatewayUnavailable(reason.to_string())),
        }
    }
}

/// Gateway replaying scripted answers in call order and recording inputs
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, content: &str, instruction: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((content.to_string(), instruction.to_string()));
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.answer
            }
            None => Err(ReposcoreError::GatewayUnavailable(
                "script exhausted".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Orchestrator over a scripted gateway and a fresh libSQL store
pub async fn create_test_service(
    script: Vec<Scripted>,
) -> (
    TempDir,
    Arc<ScriptedGateway>,
    Arc<LibsqlHistoryStore>,
    Arc<EvaluationService>,
) {
    let (dir, store) = create_test_store().await;
    let gateway = ScriptedGateway::new(script);
    let service = Arc::new(EvaluationService::new(gateway.clone(), store.clone()));
    (dir, gateway, store, service)
}
