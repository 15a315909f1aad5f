use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use engine::persist::{load_index, IndexPaths};
use engine::{InvertedIndex, QueryRunner, RankedHit, ScoringModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RankedHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub model: ScoringModel,
}

pub fn build_app(index_dir: String, model: ScoringModel) -> Result<Router> {
    // Load the whole index at startup; it is read-only afterwards.
    let index = load_index(&IndexPaths::new(&index_dir))?;
    Ok(router(AppState { index: Arc::new(index), model }))
}

pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let index = Arc::clone(&state.index);
    let model = state.model;
    let text = params.q.clone();

    // Scoring is CPU-bound; keep it off the async workers.
    let mut hits = tokio::task::spawn_blocking(move || {
        let analyzer = index.analyzer;
        let runner = QueryRunner::new(index.as_ref(), &analyzer, model);
        let query = engine::Query::parse("adhoc", &text, &analyzer);
        runner.evaluate(&query, usize::MAX)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let total_hits = hits.len();
    hits.truncate(params.k.clamp(1, state.model.top_k()));

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results: hits }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<u32>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.index.docs.get(&doc_id) {
        Some(meta) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "docno": meta.external_id,
            "ht": meta.ht,
            "length": meta.length,
        }))),
        None => Err((StatusCode::NOT_FOUND, "not found".into())),
    }
}
