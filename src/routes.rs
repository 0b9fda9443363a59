//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod proposals;
mod relinquish;

use crate::config::Settings;
use crate::error::ApiResult;
use crate::models::{EventsQuery, EventsResponse, GovernanceInfoResponse, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Governance parameters and notifications
        .route("/api/governance", get(governance_info))
        .route("/api/events", get(list_events))

        // Cut proposals
        .route("/api/proposals", post(proposals::propose_cut).get(proposals::list_proposals))
        .route("/api/proposals/expire", post(proposals::sweep_expired))
        .route("/api/proposals/{id}", get(proposals::get_proposal))
        .route("/api/proposals/{id}/votes", post(proposals::vote_on_cut))
        .route("/api/proposals/{id}/votes/{signer}", get(proposals::get_vote_status))

        // Relinquish vote
        .route("/api/relinquish", get(relinquish::relinquish_status))
        .route("/api/relinquish/votes", post(relinquish::vote_to_relinquish))
        .route("/api/relinquish/votes/{signer}", get(relinquish::get_relinquish_vote_status))

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Deployment parameters and relinquish state
async fn governance_info(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<GovernanceInfoResponse>>> {
    let gate = state.gate.read().await;
    let signers = gate.signers();

    Ok(Json(SuccessResponse::with_data(
        "Governance parameters",
        GovernanceInfoResponse {
            signers: signers.signers().to_vec(),
            admin: signers.admin(),
            vote_threshold: gate.vote_threshold(),
            proposal_expiration_secs: gate.proposal_expiration().num_seconds(),
            relinquish: gate.relinquish_status(),
        },
    )))
}

/// Committed notifications after a sequence number
async fn list_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<SuccessResponse<EventsResponse>>> {
    let gate = state.gate.read().await;
    let events = gate.events_since(query.since).to_vec();

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} events", events.len()),
        EventsResponse { events },
    )))
}
