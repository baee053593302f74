//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness probe |
//! | `GET` | `/api/scenario/default` | Built-in forest scenario |
//! | `POST` | `/api/turn` | Advance a session by one turn |
//! | `POST` | `/api/story` | Tell the session so far as a story |
//! | `POST` | `/api/scenario` | Generate a new scenario |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use gridworld_core::oracle::Oracle;
use gridworld_core::scenario::generate_scenario;
use gridworld_core::story::generate_story;
use gridworld_core::turn::advance_turn;
use gridworld_types::{GameState, TurnReport};
use gridworld_world::starting_scenario;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/turn` and `POST /api/story`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// The session to act on.
    pub game_state: GameState,
    /// The caller's model API key.
    #[serde(default)]
    pub api_key: String,
}

/// Body of `POST /api/scenario`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    /// What the user wants the world to be.
    pub world_description: String,
    /// The caller's model API key.
    #[serde(default)]
    pub api_key: String,
}

/// Response of `POST /api/turn`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    /// The advanced session.
    pub game_state: GameState,
    /// Diagnostics for the pass.
    pub report: TurnReport,
}

/// Response carrying a whole session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    /// The session.
    pub game_state: GameState,
}

/// Response of `POST /api/story`.
#[derive(Debug, Serialize)]
pub struct StoryResponse {
    /// The narrated story.
    pub story: String,
}

/// `GET /api/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /api/scenario/default`
pub async fn default_scenario() -> Json<GameStateResponse> {
    Json(GameStateResponse {
        game_state: starting_scenario(),
    })
}

/// `POST /api/turn`
pub async fn advance<O: Oracle + 'static>(
    State(state): State<Arc<AppState<O>>>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let outcome = advance_turn(state.oracle.as_ref(), &state.turn, body.game_state, &body.api_key)
        .await
        .map_err(ApiError::Turn)?;
    Ok(Json(TurnResponse {
        game_state: outcome.game_state,
        report: outcome.report,
    }))
}

/// `POST /api/story`
pub async fn story<O: Oracle + 'static>(
    State(state): State<Arc<AppState<O>>>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<StoryResponse>, ApiError> {
    let story = generate_story(state.oracle.as_ref(), &body.game_state, &body.api_key)
        .await
        .map_err(ApiError::Story)?;
    Ok(Json(StoryResponse { story }))
}

/// `POST /api/scenario`
pub async fn scenario<O: Oracle + 'static>(
    State(state): State<Arc<AppState<O>>>,
    Json(body): Json<ScenarioRequest>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let game_state = generate_scenario(
        state.oracle.as_ref(),
        &body.world_description,
        &body.api_key,
        state.world.rows,
        state.world.cols,
    )
    .await
    .map_err(ApiError::Scenario)?;
    Ok(Json(GameStateResponse { game_state }))
}
