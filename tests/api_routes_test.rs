//! HTTP surface tests driven through the router with `oneshot`

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{create_test_service, Scripted, REFERENCE_JSON};
use reposcore_core::api::{ApiServer, ApiServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_router(script: Vec<Scripted>) -> (TempDir, Arc<common::ScriptedGateway>, Router) {
    let (dir, gateway, _store, service) = create_test_service(script).await;
    let router = ApiServer::new(ApiServerConfig::default(), service).router();
    (dir, gateway, router)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(router: &Router, url: &str) -> i64 {
    let (status, body) = send(
        router,
        "POST",
        "/evaluation/repositories",
        Some(json!({ "html_url": url })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["repository_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_complete_returns_raw_text() {
    let (_dir, gateway, router) = test_router(vec![Scripted::ok("plain model text")]).await;

    let (status, body) = send(
        &router,
        "POST",
        "/evaluation/complete",
        Some(json!({ "content": "repo text", "prompt": "Score this repo" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["result"], "plain model text");
    assert_eq!(gateway.calls().len(), 1);
}

#[tokio::test]
async fn test_complete_rejects_blank_fields_before_gateway() {
    let (_dir, gateway, router) = test_router(vec![Scripted::ok("unused")]).await;

    for payload in [
        json!({ "content": "", "prompt": "Score this repo" }),
        json!({ "content": "repo text", "prompt": "   " }),
        json!({ "prompt": "Score this repo" }),
    ] {
        let (status, body) = send(&router, "POST", "/evaluation/complete", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["data"].is_null());
    }

    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_complete_rejects_undecodable_body() {
    let (_dir, _gateway, router) = test_router(vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/evaluation/complete")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_gateway_unavailable_maps_to_503() {
    let (_dir, _gateway, router) = test_router(vec![Scripted::unavailable("401 Unauthorized")]).await;

    let (status, body) = send(
        &router,
        "POST",
        "/evaluation/complete",
        Some(json!({ "content": "repo text", "prompt": "Score this repo" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "GATEWAY_UNAVAILABLE");
}

#[tokio::test]
async fn test_evaluate_persist_and_read_back() {
    let (_dir, gateway, router) = test_router(vec![Scripted::ok(REFERENCE_JSON)]).await;
    let repo = register(&router, "https://github.com/acme/widgets").await;

    let (status, body) = send(
        &router,
        "POST",
        &format!("/evaluation/repositories/{}", repo),
        Some(json!({ "content": "README.md: ..." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let analysis = &body["data"];
    assert_eq!(analysis["summary"], "Good docs, weak tests");
    assert_eq!(analysis["scores"]["readme"], 20);
    assert_eq!(analysis["total_score"], 40);
    let analysis_id = analysis["id"].as_i64().unwrap();

    // Omitted prompt falls back to the built-in instruction
    assert_eq!(gateway.calls()[0].1, reposcore_core::DEFAULT_INSTRUCTION);

    let (status, body) = send(
        &router,
        "GET",
        &format!("/evaluation/repositories/{}/latest", repo),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], analysis_id);

    let (_, body) = send(
        &router,
        "GET",
        &format!("/evaluation/repositories/{}/count", repo),
        None,
    )
    .await;
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = send(
        &router,
        "GET",
        &format!("/evaluation/repositories/{}/history", repo),
        None,
    )
    .await;
    let versions = body["data"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert!(versions[0]["version_label"]
        .as_str()
        .unwrap()
        .starts_with("v1 ("));

    let (status, body) = send(
        &router,
        "GET",
        &format!("/evaluation/analyses/{}", analysis_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], "Good docs, weak tests");
}

#[tokio::test]
async fn test_blank_prompt_uses_built_in_instruction() {
    let (_dir, gateway, router) = test_router(vec![Scripted::ok(REFERENCE_JSON)]).await;
    let repo = register(&router, "https://github.com/acme/widgets").await;

    let (status, _) = send(
        &router,
        "POST",
        &format!("/evaluation/repositories/{}", repo),
        Some(json!({ "content": "README.md: ...", "prompt": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gateway.calls()[0].1, reposcore_core::DEFAULT_INSTRUCTION);
}

#[tokio::test]
async fn test_validation_failure_maps_to_422() {
    let out_of_range = r#"{"summary":"ok","scores":{"readme":99,"test":5,"commit":15,"cicd":0}}"#;
    let (_dir, _gateway, router) = test_router(vec![Scripted::ok(out_of_range)]).await;
    let repo = register(&router, "https://github.com/acme/widgets").await;

    let (status, body) = send(
        &router,
        "POST",
        &format!("/evaluation/repositories/{}", repo),
        Some(json!({ "content": "repo", "prompt": "Score this repo" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "SCORE_OUT_OF_RANGE");

    let (_, body) = send(
        &router,
        "GET",
        &format!("/evaluation/repositories/{}/count", repo),
        None,
    )
    .await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_empty_history_and_missing_analysis() {
    let (_dir, _gateway, router) = test_router(vec![]).await;
    let repo = register(&router, "https://github.com/acme/widgets").await;

    let (status, body) = send(
        &router,
        "GET",
        &format!("/evaluation/repositories/{}/latest", repo),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "OK");
    assert!(body["data"].is_null());

    let (status, body) = send(&router, "GET", "/evaluation/analyses/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_repository_id() {
    let (_dir, _gateway, router) = test_router(vec![]).await;

    let (status, body) = send(&router, "GET", "/evaluation/repositories/abc/latest", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = send(&router, "GET", "/evaluation/repositories/0/count", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_gateway() {
    let (_dir, _gateway, router) = test_router(vec![]).await;

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["gateway"], "scripted");
}
