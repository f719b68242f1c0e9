use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::modules::summary_pipeline;
use crate::services::providers::router::ProviderError;
use crate::services::providers::settings;

#[derive(Debug, Deserialize)]
struct ExtractTasksRequest {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedTermsRequest {
    term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalProviderRequest {
    base_url: Option<String>,
    model: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/assist/extract-tasks", post(extract_tasks))
        .route("/api/assist/related-terms", post(related_terms))
        .route(
            "/api/assist/local-provider",
            get(get_local_provider).put(put_local_provider),
        )
}

async fn extract_tasks(Json(req): Json<ExtractTasksRequest>) -> (StatusCode, Json<Value>) {
    let Some(text) = req.text.filter(|t| !t.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "text is required" })),
        );
    };

    let router = summary_pipeline::get().provider_router();
    match router.extract_tasks(&text).await {
        Ok(tasks) => (StatusCode::OK, Json(json!({ "tasks": tasks }))),
        Err(err) => provider_error_response(err),
    }
}

async fn related_terms(Json(req): Json<RelatedTermsRequest>) -> (StatusCode, Json<Value>) {
    let Some(term) = req.term.filter(|t| !t.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "term is required" })),
        );
    };

    let router = summary_pipeline::get().provider_router();
    match router.suggest_related_terms(&term).await {
        Ok(terms) => (StatusCode::OK, Json(json!({ "terms": terms }))),
        Err(err) => provider_error_response(err),
    }
}

async fn get_local_provider() -> (StatusCode, Json<Value>) {
    let snapshot = settings::get().snapshot();
    (StatusCode::OK, Json(json!(snapshot)))
}

async fn put_local_provider(Json(req): Json<LocalProviderRequest>) -> (StatusCode, Json<Value>) {
    let snapshot = settings::get().update(req.base_url, req.model);
    (StatusCode::OK, Json(json!({ "ok": true, "settings": snapshot })))
}

fn provider_error_response(err: ProviderError) -> (StatusCode, Json<Value>) {
    let status = match err {
        ProviderError::Quota(_) => StatusCode::TOO_MANY_REQUESTS,
        ProviderError::Connection(_) | ProviderError::Other(_) => StatusCode::BAD_GATEWAY,
        ProviderError::NoProviderAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
