//! HTTP API server

use super::response::{ApiError, ApiResponse};
use crate::evaluation::{instruction_or_default, EvaluationService};
use crate::types::{AnalysisId, AnalysisRecord, AnalysisVersion, RepositoryId};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8080).into(),
        }
    }
}

/// API server state
#[derive(Clone)]
struct AppState {
    evaluator: Arc<EvaluationService>,
    instance_id: String,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    evaluator: Arc<EvaluationService>,
    instance_id: String,
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub repository_id: RepositoryId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Analysis record plus its derived total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisView {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub total_score: u32,
}

impl From<AnalysisRecord> for AnalysisView {
    fn from(record: AnalysisRecord) -> Self {
        let total_score = record.total_score();
        Self {
            record,
            total_score,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance_id: String,
    pub gateway: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(config: ApiServerConfig, evaluator: Arc<EvaluationService>) -> Self {
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        Self {
            config,
            evaluator,
            instance_id,
        }
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build router
    pub fn router(&self) -> Router {
        Self::build_router(AppState {
            evaluator: self.evaluator.clone(),
            instance_id: self.instance_id.clone(),
        })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            // Raw completion
            .route("/evaluation/complete", post(complete_handler))
            // Repository history
            .route("/evaluation/repositories", post(register_handler))
            .route("/evaluation/repositories/:id", post(evaluate_handler))
            .route("/evaluation/repositories/:id/latest", get(latest_handler))
            .route("/evaluation/repositories/:id/history", get(history_handler))
            .route("/evaluation/repositories/:id/count", get(count_handler))
            .route("/evaluation/analyses/:id", get(analysis_handler))
            // Health check
            .route("/health", get(health_handler))
            // State
            .with_state(state)
            // Middleware
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until the process exits
    pub async fn serve(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", self.config.addr, e))?;

        info!(
            "API server [{}] listening on http://{} (gateway: {})",
            self.instance_id,
            self.config.addr,
            self.evaluator.gateway_name()
        );
        axum::serve(listener, router).await?;
        Ok(())
    }
}

fn repository_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<RepositoryId, ApiError> {
    let Path(id) = path.map_err(|e| ApiError::invalid_input(e.body_text()))?;
    if id <= 0 {
        return Err(ApiError::invalid_input(format!(
            "repository id must be positive, got {}",
            id
        )));
    }
    Ok(RepositoryId(id))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::invalid_input(e.body_text()))
}

async fn complete_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CompleteRequest>, JsonRejection>,
) -> ApiResult<CompleteResponse> {
    let request = json_body(payload)?;
    debug!("Raw completion requested");

    let result = state
        .evaluator
        .complete_raw(&request.content, &request.prompt)
        .await?;
    Ok(Json(ApiResponse::ok(CompleteResponse { result })))
}

async fn register_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let request = json_body(payload)?;
    let repository_id = state
        .evaluator
        .register_repository(&request.html_url)
        .await?;
    Ok(Json(ApiResponse::ok(RegisterResponse { repository_id })))
}

async fn evaluate_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<EvaluateRequest>, JsonRejection>,
) -> ApiResult<AnalysisView> {
    let repository_id = repository_id(path)?;
    let request = json_body(payload)?;

    let instruction = instruction_or_default(request.prompt.as_deref());

    let record = state
        .evaluator
        .evaluate_and_persist(repository_id, &request.content, instruction)
        .await?;
    Ok(Json(ApiResponse::ok(record.into())))
}

async fn latest_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<Option<AnalysisView>> {
    let repository_id = repository_id(path)?;
    let latest = state.evaluator.latest_for(repository_id).await?;
    Ok(Json(ApiResponse::ok(latest.map(AnalysisView::from))))
}

async fn history_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<AnalysisVersion>> {
    let repository_id = repository_id(path)?;
    let versions = state.evaluator.history_for(repository_id).await?;
    Ok(Json(ApiResponse::ok(versions)))
}

async fn count_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<CountResponse> {
    let repository_id = repository_id(path)?;
    let count = state.evaluator.count_for(repository_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

async fn analysis_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<AnalysisView> {
    let Path(id) = path.map_err(|e| ApiError::invalid_input(e.body_text()))?;
    let record = state.evaluator.analysis(AnalysisId(id)).await?;
    Ok(Json(ApiResponse::ok(record.into())))
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        gateway: state.evaluator.gateway_name().to_string(),
    }))
}
