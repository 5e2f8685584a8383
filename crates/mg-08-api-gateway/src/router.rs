//! # HTTP Routes
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /annotations?url=&annotationId=` | read path |
//! | `POST /graph` | client put or peer [`GraphMessage`], always `202` |
//! | `GET /graph/node?soul=` | one node, `404` when absent |
//! | `GET /graph/children?soul=` | direct children of a soul |
//! | `GET /peers` | directory entries |
//! | `GET /recent?limit=` | recently seen annotations |
//! | `GET /health`, `GET /metrics` | liveness, Prometheus text |
//!
//! The `/graph` routes double as the peer sync endpoint: a peer's graph URL
//! is `https://host/graph`, and replication appends `/node` and `/children`.

use crate::domain::{GatewayConfig, GatewayError};
use crate::middleware::{create_cors_layer, track_requests, GatewayMetrics};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use marginalia_telemetry::{encode_metrics, HistogramTimer, ANNOTATIONS_SERVED, READ_LATENCY};
use mg_01_peer_directory::PeerDirectoryApi;
use mg_02_graph_store::{GraphApi, PutOutcome};
use mg_05_annotation_reads::{AnnotationReadApi, ReadResponse};
use mg_07_replication::{Delivery, GraphMessage, ReplicationApi};
use serde::Deserialize;
use serde_json::json;
use shared_types::{GraphPut, Node, Soul, WriteOrigin};
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Upper bound on `GET /recent?limit=`.
pub const MAX_RECENT_LIMIT: usize = 50;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub reads: Arc<dyn AnnotationReadApi>,
    pub graph: Arc<dyn GraphApi>,
    pub replication: Arc<dyn ReplicationApi>,
    pub directory: Arc<dyn PeerDirectoryApi>,
    pub metrics: Arc<GatewayMetrics>,
    pub recent_limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationsQuery {
    pub url: Option<String>,
    pub annotation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SoulQuery {
    pub soul: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Body of `POST /graph`: peers send a wrapped message, clients a bare put.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboundWrite {
    Relayed(GraphMessage),
    Put(GraphPut),
}

/// Build the full router with its middleware stack.
///
/// Each layer goes on through `Router::layer` so the response body is
/// converted back to `axum::body::Body` between them. CORS and the timeout
/// need a `Default` body, which the trace and body-limit bodies are not.
/// Innermost first: request metrics, CORS, timeout, body limit, trace.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/annotations", get(get_annotations))
        .route("/graph", post(post_graph))
        .route("/graph/node", get(get_node))
        .route("/graph/children", get(get_children))
        .route("/peers", get(get_peers))
        .route("/recent", get(get_recent))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.metrics),
            track_requests,
        ))
        .layer(create_cors_layer(&config.cors))
        .layer(TimeoutLayer::new(Duration::from_millis(
            config.request_timeout_ms,
        )))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_annotations(
    State(state): State<AppState>,
    Query(query): Query<AnnotationsQuery>,
) -> Result<Json<ReadResponse>, GatewayError> {
    let _timer = HistogramTimer::new(&READ_LATENCY);
    let url = query.url.unwrap_or_default();
    let response = match query.annotation_id.filter(|id| !id.is_empty()) {
        Some(id) => state.reads.read_annotation(&url, &id).await?,
        None => state.reads.read_annotations(&url).await?,
    };
    ANNOTATIONS_SERVED.inc_by(response.annotations.len() as f64);
    Ok(Json(response))
}

fn outcome_label(outcome: &PutOutcome) -> &'static str {
    match outcome {
        PutOutcome::Applied { .. } => "applied",
        PutOutcome::Unchanged { deferred } if *deferred > 0 => "deferred",
        PutOutcome::Unchanged { .. } => "unchanged",
        PutOutcome::Rejected { .. } => "rejected",
    }
}

async fn post_graph(
    State(state): State<AppState>,
    Json(write): Json<InboundWrite>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = match write {
        InboundWrite::Relayed(message) => {
            let soul = message.put.soul.clone();
            match state.replication.handle_message(message).await? {
                Delivery::Duplicate => "duplicate",
                Delivery::Delivered(outcome) => {
                    debug!(%soul, outcome = outcome_label(&outcome), "[mg-08] Relayed write");
                    outcome_label(&outcome)
                }
            }
        }
        InboundWrite::Put(put) => {
            let outcome = state.graph.put(put, WriteOrigin::Local).await?;
            outcome_label(&outcome)
        }
    };
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": status }))))
}

async fn get_node(
    State(state): State<AppState>,
    Query(query): Query<SoulQuery>,
) -> Result<Json<Node>, GatewayError> {
    let soul = Soul::new(query.soul);
    state
        .graph
        .get(&soul)?
        .map(Json)
        .ok_or_else(|| GatewayError::NotFound(format!("No node at {soul}")))
}

async fn get_children(
    State(state): State<AppState>,
    Query(query): Query<SoulQuery>,
) -> Result<Json<Vec<Node>>, GatewayError> {
    Ok(Json(state.graph.children(&Soul::new(query.soul))?))
}

async fn get_peers(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let live = state.directory.live_peers()?;
    let known = state.directory.all_peers()?;
    Ok(Json(json!({ "live": live, "known": known })))
}

async fn get_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .unwrap_or(state.recent_limit)
        .min(MAX_RECENT_LIMIT);
    Json(json!({ "annotations": state.reads.recent(limit) }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "marginalia",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let mut body = encode_metrics().map_err(|e| GatewayError::Internal(e.to_string()))?;
    body.push_str(&state.metrics.to_prometheus());
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
