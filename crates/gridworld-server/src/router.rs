//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser front end.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use gridworld_core::oracle::Oracle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/health` -- liveness
/// - `GET /api/scenario/default` -- the built-in forest scenario
/// - `POST /api/turn` -- advance a session
/// - `POST /api/story` -- narrate a session
/// - `POST /api/scenario` -- generate a scenario
pub fn build_router<O: Oracle + 'static>(state: Arc<AppState<O>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/scenario/default", get(handlers::default_scenario))
        .route("/api/turn", post(handlers::advance::<O>))
        .route("/api/story", post(handlers::story::<O>))
        .route("/api/scenario", post(handlers::scenario::<O>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
