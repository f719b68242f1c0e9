use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::summary::SummaryRecordService;
use crate::modules::summary_pipeline;
use crate::services::notify_hub;
use crate::utils::sse::sse_channel;

#[derive(Debug, Deserialize)]
struct EnqueueRequest {
    account_id: Option<String>,
    message_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CachedQuery {
    account_id: Option<String>,
    /// Comma-separated list of message ids.
    message_ids: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    account_id: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/summaries/enqueue", post(enqueue))
        .route("/api/summaries", get(get_cached))
        .route("/api/summaries/events", get(events))
}

async fn enqueue(Json(req): Json<EnqueueRequest>) -> (StatusCode, Json<Value>) {
    let Some(account_id) = req.account_id.filter(|a| !a.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_id is required" })),
        );
    };
    let message_ids = req.message_ids.unwrap_or_default();
    if message_ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message_ids must not be empty" })),
        );
    }

    match summary_pipeline::get().enqueue_batch(&account_id, &message_ids).await {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "enqueue failed", "detail": err })),
        ),
    }
}

async fn get_cached(Query(query): Query<CachedQuery>) -> (StatusCode, Json<Value>) {
    let Some(account_id) = query.account_id.filter(|a| !a.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_id is required" })),
        );
    };
    let message_ids: Vec<String> = query
        .message_ids
        .unwrap_or_default()
        .split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if message_ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message_ids is required" })),
        );
    }

    match SummaryRecordService::get_cached_map(&account_id, &message_ids).await {
        Ok(summaries) => (StatusCode::OK, Json(json!({ "summaries": summaries }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "read summaries failed", "detail": err })),
        ),
    }
}

/// Opens a per-account SSE stream; completed summaries are pushed here as
/// `summary_ready` events.
async fn events(Query(query): Query<EventsQuery>) -> Response {
    let Some(account_id) = query.account_id.filter(|a| !a.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_id is required" })),
        )
            .into_response();
    };

    let (stream, sender) = sse_channel();
    notify_hub::get().attach(&account_id, sender);
    stream.into_response()
}
