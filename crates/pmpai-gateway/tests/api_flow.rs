//! End-to-end gateway tests over an in-memory store with stub providers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use pmpai_core::config::PmpConfig;
use pmpai_core::traits::DocumentRepository;
use pmpai_gateway::{build_router, AppState};
use pmpai_knowledge::SqliteKnowledgeStore;

fn test_router() -> axum::Router {
    let repo: Arc<dyn DocumentRepository> =
        Arc::new(SqliteKnowledgeStore::open_in_memory().unwrap());
    let state = AppState::from_config(PmpConfig::default(), repo).unwrap();
    build_router(Arc::new(state))
}

async fn call(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = match body {
        Some(b) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let router = test_router();
    let (status, body) = call(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_extract_plain_text() {
    let router = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/extract",
        Some(json!({
            "mime_type": "text/plain",
            "content": "项目管理是一门系统工程学科。",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "项目管理是一门系统工程学科。");
    assert_eq!(body["length"], 14);
}

#[tokio::test]
async fn test_extract_unsupported_mime_is_400() {
    let router = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/extract",
        Some(json!({ "mime_type": "image/png", "content": "xxxxxxxxxxxx" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_extract_sub_threshold_is_400() {
    let router = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/extract",
        Some(json!({ "mime_type": "text/plain", "content": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Empty content"));
}

#[tokio::test]
async fn test_extract_analysis_intake_uses_stricter_floor() {
    let router = test_router();
    // 15 chars: fine for the generic intake, below the 100-char analysis floor
    let body = json!({
        "mime_type": "text/plain",
        "content": "这份材料太短无法进行智能分析。",
    });

    let (status, _) = call(&router, "POST", "/api/v1/extract", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let mut analysis_body = body;
    analysis_body["analysis"] = json!(true);
    let (status, resp) = call(&router, "POST", "/api/v1/extract", Some(analysis_body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("need at least 100"));
}

#[tokio::test]
async fn test_upload_vectorize_search_flow() {
    let router = test_router();

    // Upload a 300-char CJK document
    let text: String = "项目管理是一门学科。".chars().cycle().take(300).collect();
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "项目管理概论",
            "category": "项目管理",
            "mime_type": "text/plain",
            "content": text,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["document"]["id"].as_str().unwrap().to_string();
    assert!(!body["document"]["summary"].as_str().unwrap().is_empty());

    // Vectorize: shorter than chunk_size → exactly one chunk
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/vectorize",
        Some(json!({ "knowledge_id": id, "chunk_size": 1000, "overlap": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunk_count"], 1);
    assert_eq!(body["chunk_ids"].as_array().unwrap().len(), 1);
    assert_eq!(body["status"], "completed");

    // Document detail carries per-chunk metadata
    let (status, body) = call(&router, "GET", &format!("/api/v1/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunk_count"], 1);
    assert_eq!(body["chunks"][0]["chunk_number"], 1);
    assert_eq!(body["chunks"][0]["position"], 0);

    // Search finds it
    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/search",
        Some(json!({ "query": "项目管理", "limit": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["title"], "项目管理概论");
    assert!(body["time_taken"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_search_get_with_repeated_params() {
    let router = test_router();
    let (status, _) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "risk register",
            "category": "pm",
            "mime_type": "text/plain",
            "content": "Full risk register body content.",
            "vectorize": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &router,
        "GET",
        "/api/v1/search?query=risk&category=pm&category=other&limit=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Filter that matches nothing
    let (status, body) = call(&router, "GET", "/api/v1/search?query=risk&category=hr", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_qa_missing_question_is_400() {
    let router = test_router();
    let (status, body) = call(&router, "POST", "/api/v1/qa", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn test_qa_answers_with_sources() {
    let router = test_router();
    let (_, body) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "风险管理计划",
            "category": "项目管理",
            "mime_type": "text/plain",
            "content": "风险识别、定性分析、应对策略与监控方法。",
            "vectorize": true,
        })),
    )
    .await;
    let id = body["document"]["id"].as_str().unwrap();

    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/qa",
        Some(json!({ "question": "风险管理" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"][0]["document_id"], id);
    assert!(body["answer"].as_str().unwrap().contains("风险管理计划"));
}

#[tokio::test]
async fn test_vectorize_inline_content_replaces_text() {
    let router = test_router();
    let (_, body) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "draft",
            "category": "pm",
            "mime_type": "text/plain",
            "content": "Original draft body text.",
        })),
    )
    .await;
    let id = body["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/vectorize",
        Some(json!({ "knowledge_id": id, "content": "Revised final body text with more detail." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunk_count"], 1);

    let (_, body) = call(&router, "GET", &format!("/api/v1/documents/{id}"), None).await;
    assert_eq!(
        body["document"]["raw_text"],
        "Revised final body text with more detail."
    );
}

#[tokio::test]
async fn test_vectorize_unknown_id_is_404() {
    let router = test_router();
    let (status, _) = call(
        &router,
        "POST",
        "/api/v1/vectorize",
        Some(json!({ "knowledge_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_vectorize_reports_failures_inline() {
    let router = test_router();
    let (_, body) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "good doc",
            "category": "pm",
            "mime_type": "text/plain",
            "content": "A perfectly fine document body.",
        })),
    )
    .await;
    let id = body["document"]["id"].as_str().unwrap();

    let (status, body) = call(
        &router,
        "POST",
        "/api/v1/vectorize/batch",
        Some(json!({ "knowledge_ids": [id, "missing"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["failed"], 1);
    assert!(body["outcomes"][1]["error"].as_str().is_some());
}

#[tokio::test]
async fn test_document_crud() {
    let router = test_router();
    let (_, body) = call(
        &router,
        "POST",
        "/api/v1/documents",
        Some(json!({
            "title": "charter",
            "category": "pm",
            "mime_type": "text/plain",
            "content": "Project charter body text.",
        })),
    )
    .await;
    let id = body["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&router, "GET", &format!("/api/v1/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"]["title"], "charter");

    let (status, body) = call(&router, "GET", "/api/v1/documents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_docs"], 1);

    let (status, _) = call(&router, "DELETE", &format!("/api/v1/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&router, "GET", &format!("/api/v1/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
