//! HTTP service: `/ingest`, `/query` and `/status`

use crate::acquisition::DocumentFetcher;
use crate::error::{RagError, Result};
use crate::retrieval::Evidence;
use crate::service::{RagService, REQUIRED_DOCUMENTS};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    service: Arc<RagService>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl AppState {
    pub fn new(service: Arc<RagService>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { service, fetcher }
    }
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub passages_indexed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponseBody {
    pub answer: String,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub passages: usize,
    pub documents: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest_handler))
        .route("/query", post(query_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| RagError::Config(format!("Invalid bind address {}: {}", addr, e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RagError::Io {
            source: e,
            context: format!("Failed to bind {}", addr),
        })?;

    tracing::info!("finrag listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| RagError::Io {
            source: e,
            context: "Server error".to_string(),
        })
}

pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> std::result::Result<Json<IngestResponse>, ApiError> {
    if request.urls.len() != REQUIRED_DOCUMENTS {
        return Err(bad_request(format!(
            "Please provide exactly {} URLs in an array under the 'urls' key.",
            REQUIRED_DOCUMENTS
        )));
    }

    let service = Arc::clone(&state.service);
    let fetcher = Arc::clone(&state.fetcher);
    let count = tokio::task::spawn_blocking(move || service.ingest_urls(fetcher.as_ref(), &request.urls))
        .await
        .map_err(|e| internal_error(e.to_string()))?
        .map_err(error_response)?;

    let warning =
        (count == 0).then(|| "Ingestion produced no passages (check URLs).".to_string());

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
        passages_indexed: count,
        warning,
    }))
}

pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> std::result::Result<Json<QueryResponseBody>, ApiError> {
    let question = request.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(bad_request(
            "No question provided under 'question' key.".to_string(),
        ));
    }

    let service = Arc::clone(&state.service);
    let top_k = request.top_k;
    let response = tokio::task::spawn_blocking(move || service.query(&question, top_k))
        .await
        .map_err(|e| internal_error(e.to_string()))?
        .map_err(error_response)?;

    Ok(Json(QueryResponseBody {
        answer: response.answer,
        evidence: response.evidence,
    }))
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = state.service.stats();
    Json(StatusResponse {
        status: "ok".to_string(),
        passages: stats.passages,
        documents: stats.documents,
    })
}

fn error_response(err: RagError) -> ApiError {
    let status = match &err {
        RagError::Acquisition { .. } => StatusCode::BAD_GATEWAY,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message }))
}

fn internal_error(message: String) -> ApiError {
    tracing::error!("Worker task failed: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: message }),
    )
}
