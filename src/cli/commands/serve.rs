//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for catalog questions and semantic search.

use crate::catalog::CatalogMatch;
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::UrverkError;
use crate::pipeline::QueryPipeline;
use crate::vector_store::{open_store, VectorStore};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    pipeline: QueryPipeline,
    store: Arc<dyn VectorStore>,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = QueryPipeline::new(&settings)?;
    let store = open_store(&settings)?;

    let state = Arc::new(AppState {
        pipeline,
        store,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/search", post(search))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Urverk API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<CatalogMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    provenance: Vec<ProvenanceInfo>,
}

#[derive(Serialize)]
struct ProvenanceInfo {
    source: Option<String>,
    raw: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_min_score")]
    min_score: f32,
}

fn default_limit() -> usize {
    5
}

fn default_min_score() -> f32 {
    0.3
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResultInfo>,
}

#[derive(Serialize)]
struct SearchResultInfo {
    brand: String,
    model_name: String,
    reference_number: String,
    description: String,
    score: f32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    match state.pipeline.answer(&req.question).await {
        Ok(answer) => Json(AskResponse {
            answer: answer.answer,
            metadata: answer.metadata,
            provenance: answer
                .provenance
                .into_iter()
                .map(|p| ProvenanceInfo {
                    source: p.source,
                    raw: p.raw,
                })
                .collect(),
        })
        .into_response(),
        Err(UrverkError::InvalidInput(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: msg }),
        )
            .into_response(),
        Err(e) => {
            error!("Unhandled pipeline failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let embedder = OpenAIEmbedder::with_config(
        &state.settings.embedding.model,
        state.settings.embedding.dimensions as usize,
    );

    let query_embedding = match embedder.embed(&req.query).await {
        Ok(embedding) => embedding,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    match state
        .store
        .search_with_threshold(&query_embedding, req.limit, req.min_score)
        .await
    {
        Ok(results) => Json(SearchResponse {
            results: results
                .into_iter()
                .map(|r| SearchResultInfo {
                    brand: r.entry.brand,
                    model_name: r.entry.model_name,
                    reference_number: r.entry.reference_number,
                    description: r.entry.description,
                    score: r.score,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
