//! API route handlers for the gateway.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use base64::Engine as _;
use serde_json::{json, Value};

use pmpai_core::error::PmpError;
use pmpai_core::traits::{DocumentRepository as _, Summarizer, Tagger};
use pmpai_core::types::{Document, SearchFilter};
use pmpai_extract::TextExtractor;

use super::error::ApiError;
use super::server::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pmpai-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// System health with store stats and uptime.
pub async fn system_health(State(state): State<Arc<AppState>>) -> ApiResult {
    let (documents, chunks) = state.repo.stats()?;
    Ok(Json(json!({
        "ok": true,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "documents": documents,
        "chunks": chunks,
    })))
}

fn decode_content(body: &Value) -> Result<Vec<u8>, PmpError> {
    // Accept either raw text or base64-encoded binary
    if let Some(text) = body["content"].as_str() {
        return Ok(text.as_bytes().to_vec());
    }
    let encoded = body["content_base64"].as_str().ok_or_else(|| {
        PmpError::InvalidRequest("missing 'content' or 'content_base64'".into())
    })?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| PmpError::InvalidRequest(format!("invalid base64 content: {e}")))
}

/// Extract text from an uploaded binary without storing anything.
/// `"analysis": true` selects the stricter AI-analysis intake floor.
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let mime = body["mime_type"].as_str().unwrap_or("");
    let filename = body["filename"].as_str().unwrap_or("");
    let bytes = decode_content(&body)?;

    let min_text_len = if body["analysis"].as_bool().unwrap_or(false) {
        state.config.knowledge.analysis_min_text_len
    } else {
        state.config.knowledge.min_text_len
    };
    let extractor = TextExtractor::new(min_text_len);
    let text = extractor.extract(&bytes, mime, filename)?;
    let length = text.chars().count();
    Ok(Json(json!({ "ok": true, "text": text, "length": length })))
}

/// Upload a document: extract, enrich (summary + tags), store, and
/// optionally vectorize in the same call.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let title = body["title"].as_str().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err(PmpError::InvalidRequest("missing 'title'".into()).into());
    }
    let mime = body["mime_type"].as_str().unwrap_or("text/plain");
    let filename = body["filename"].as_str().unwrap_or("");
    let bytes = decode_content(&body)?;

    let extractor = TextExtractor::new(state.config.knowledge.min_text_len);
    let text = extractor.extract(&bytes, mime, filename)?;

    let mut doc = Document::new(
        &title,
        body["category"].as_str().unwrap_or(""),
        body["source_type"].as_str().unwrap_or("upload"),
    );
    doc.file_size = bytes.len() as u64;
    doc.author = body["author"].as_str().unwrap_or("").to_string();
    doc.project_id = body["project_id"].as_str().map(str::to_string);
    doc.tags = body["tags"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if doc.tags.is_empty() {
        doc.tags = state.tagger.tag(&text, 5).await?;
    }
    doc.summary = state.summarizer.summarize(&text).await?;
    doc.raw_text = text;

    state.repo.insert_document(&doc)?;
    tracing::info!("Document '{}' uploaded ({} bytes)", doc.id, doc.file_size);

    let mut response = json!({
        "ok": true,
        "document": {
            "id": doc.id,
            "title": doc.title,
            "category": doc.category,
            "tags": doc.tags,
            "summary": doc.summary,
            "file_size": doc.file_size,
            "created_at": doc.created_at.to_rfc3339(),
        },
    });

    if body["vectorize"].as_bool().unwrap_or(false) {
        let outcome = state.engine.vectorize(&doc.id, None, None).await?;
        response["chunk_count"] = json!(outcome.chunk_count);
    }
    Ok(Json(response))
}

/// List stored documents, optionally narrowed by category/tag/project.
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult {
    let filter = filter_from_params(&params);
    let docs: Vec<Value> = state
        .repo
        .list_documents(&filter)?
        .into_iter()
        .map(|d| {
            json!({
                "id": d.id,
                "title": d.title,
                "category": d.category,
                "tags": d.tags,
                "summary": d.summary,
                "source_type": d.source_type,
                "project_id": d.project_id,
                "file_size": d.file_size,
                "created_at": d.created_at.to_rfc3339(),
            })
        })
        .collect();
    let (total_docs, total_chunks) = state.repo.stats()?;
    Ok(Json(json!({
        "ok": true,
        "documents": docs,
        "total_docs": total_docs,
        "total_chunks": total_chunks,
    })))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let d = state.repo.get_document(&id)?;
    let chunks: Vec<Value> = state
        .repo
        .chunks_for_document(&id)?
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "chunk_number": c.chunk_number(),
                "total_chunks": c.total_chunks,
                "position": c.position,
                "chars": c.content.chars().count(),
            })
        })
        .collect();
    Ok(Json(json!({
        "ok": true,
        "document": {
            "id": d.id,
            "title": d.title,
            "category": d.category,
            "tags": d.tags,
            "summary": d.summary,
            "source_type": d.source_type,
            "project_id": d.project_id,
            "file_size": d.file_size,
            "raw_text": d.raw_text,
            "author": d.author,
            "created_at": d.created_at.to_rfc3339(),
        },
        "chunk_count": chunks.len(),
        "chunks": chunks,
    })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    state.repo.delete_document(&id)?;
    Ok(Json(json!({ "ok": true })))
}

/// Chunk and embed one stored document. An inline `content` replaces the
/// stored text before chunking, so chunks and document never diverge.
pub async fn vectorize(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResult {
    let knowledge_id = body["knowledge_id"]
        .as_str()
        .ok_or_else(|| PmpError::InvalidRequest("missing 'knowledge_id'".into()))?;
    let chunk_size = body["chunk_size"].as_u64().map(|v| v as usize);
    let overlap = body["overlap"].as_u64().map(|v| v as usize);

    if let Some(content) = body["content"].as_str() {
        let mut doc = state.repo.get_document(knowledge_id)?;
        doc.raw_text = content.to_string();
        state.repo.insert_document(&doc)?;
    }

    let outcome = state
        .engine
        .vectorize(knowledge_id, chunk_size, overlap)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "knowledge_id": outcome.knowledge_id,
        "chunk_count": outcome.chunk_count,
        "chunk_ids": outcome.chunk_ids,
        "status": outcome.status,
    })))
}

/// Vectorize many documents; individual failures are reported inline and
/// never abort the batch.
pub async fn vectorize_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let ids: Vec<String> = body["knowledge_ids"]
        .as_array()
        .ok_or_else(|| PmpError::InvalidRequest("missing 'knowledge_ids'".into()))?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let outcomes = state.engine.vectorize_batch(&ids).await;
    let completed = outcomes.iter().filter(|o| o.error.is_none()).count();
    Ok(Json(json!({
        "ok": true,
        "completed": completed,
        "failed": outcomes.len() - completed,
        "outcomes": outcomes,
    })))
}

fn parse_filter(body: &Value) -> Result<SearchFilter, PmpError> {
    match body.get("filter") {
        None | Some(Value::Null) => Ok(SearchFilter::default()),
        Some(f) => serde_json::from_value(f.clone())
            .map_err(|e| PmpError::InvalidRequest(format!("invalid filter: {e}"))),
    }
}

/// Semantic search over the corpus.
pub async fn search_post(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResult {
    let query = body["query"].as_str().unwrap_or("");
    let filter = parse_filter(&body)?;
    let limit = body["limit"].as_u64().unwrap_or(10) as usize;
    let offset = body["offset"].as_u64().unwrap_or(0) as usize;

    let page = state.engine.search(query, &filter, limit, offset).await?;
    Ok(Json(json!({
        "ok": true,
        "results": page.results,
        "total": page.total,
        "query": page.query,
        "time_taken": page.time_taken,
    })))
}

fn filter_from_params(params: &[(String, String)]) -> SearchFilter {
    let mut filter = SearchFilter::default();
    for (key, value) in params {
        match key.as_str() {
            "category" => filter.categories.push(value.clone()),
            "tag" => filter.tags.push(value.clone()),
            "author" => filter.author = Some(value.clone()),
            "project_id" => filter.project_id = Some(value.clone()),
            _ => {}
        }
    }
    filter
}

/// GET variant of search: repeated `query`/`category`/`tag` parameters.
pub async fn search_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = params
        .iter()
        .filter(|(k, _)| k == "query")
        .map(|(_, v)| v.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let filter = filter_from_params(&params);
    let get_num = |name: &str, default: usize| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(default)
    };

    let page = state
        .engine
        .search(&query, &filter, get_num("limit", 10), get_num("offset", 0))
        .await?;
    Ok(Json(json!({
        "ok": true,
        "results": page.results,
        "total": page.total,
        "query": page.query,
        "time_taken": page.time_taken,
    })))
}

/// Retrieval-augmented question answering.
pub async fn qa(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResult {
    let question = body["question"].as_str().unwrap_or("");
    let project_id = body["project_id"].as_str();
    let filter = parse_filter(&body)?;

    let qa = state.engine.answer(question, project_id, &filter).await?;
    Ok(Json(json!({
        "ok": true,
        "answer": qa.answer,
        "sources": qa.sources,
        "question": qa.question,
        "time_taken": qa.time_taken,
    })))
}
