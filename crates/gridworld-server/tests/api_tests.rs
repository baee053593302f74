//! Integration tests for the HTTP API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, with a scripted oracle standing in for the model.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gridworld_core::oracle::CallSite;
use gridworld_core::scripted::ScriptedOracle;
use gridworld_server::router::build_router;
use gridworld_server::state::AppState;
use gridworld_types::Grid;
use serde_json::{Value, json};
use tower::ServiceExt;

const KNIGHT_MOVE: &str = r#"{"changes": [
    {"row": 6, "col": 8, "newContent": ""},
    {"row": 5, "col": 8, "newContent": "<Knight> scouts north of the bridge"}
], "explanation": "The knight stepped north"}"#;

fn knight_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .respond(CallSite::AgentAction, "They do what feels right.")
        .respond_with(CallSite::TranslateAction, |ctx| {
            if ctx["agentName"] == "Knight" {
                Ok(KNIGHT_MOVE.to_owned())
            } else {
                Ok(r#"{"changes": [], "explanation": "waits"}"#.to_owned())
            }
        })
        .respond(CallSite::Environmental, r#"{"environmentalActions": []}"#)
        .respond(CallSite::Summarize, "The knight went scouting.")
}

fn router_with(oracle: ScriptedOracle) -> (axum::Router, Arc<ScriptedOracle>) {
    let oracle = Arc::new(oracle);
    let state = Arc::new(AppState::new(Arc::clone(&oracle)));
    (build_router(state), oracle)
}

async fn default_game_state() -> Value {
    let (router, _) = router_with(ScriptedOracle::new());
    let response = router
        .oneshot(Request::get("/api/scenario/default").body(Body::empty()).unwrap())
        .await
        .unwrap();
    body_to_json(response.into_body()).await["gameState"].clone()
}

fn post(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let (router, _) = router_with(ScriptedOracle::new());
    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_default_scenario() {
    let game_state = default_game_state().await;

    assert_eq!(game_state["history"].as_array().unwrap().len(), 1);
    assert_eq!(game_state["history"][0]["world"].as_array().unwrap().len(), 15);
    assert_eq!(game_state["agents"].as_array().unwrap().len(), 4);
    assert!(game_state["worldDescription"].as_str().unwrap().len() > 10);
}

#[tokio::test]
async fn test_turn_moves_knight() {
    let mut game_state = default_game_state().await;
    game_state["history"][0]["legend"] = json!({});
    let (router, oracle) = router_with(knight_oracle());

    let response = router
        .oneshot(post("/api/turn", &json!({"gameState": game_state, "apiKey": "sk-test"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    let history = json["gameState"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["description"], "The knight went scouting.");
    assert_eq!(history[1]["world"][5][8], "<Knight> scouts north of the bridge");
    assert_eq!(history[1]["world"][6][8], "");

    let knight = json["gameState"]["agents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["name"] == "Knight")
        .unwrap();
    assert_eq!(knight["location"], json!({"row": 5, "col": 8}));
    assert_eq!(knight["privateHistory"].as_array().unwrap().len(), 1);

    let report = &json["report"];
    assert_eq!(report["turnNumber"], 1);
    assert_eq!(report["changesApplied"], 2);
    assert_eq!(report["conflictGroups"], 0);
    assert_eq!(report["resolutionRan"], false);

    assert_eq!(oracle.call_count(CallSite::AgentAction), 4);
    assert_eq!(oracle.call_count(CallSite::Adjudicate), 0);
    assert_eq!(oracle.call_count(CallSite::ResolveAgents), 0);
}

#[tokio::test]
async fn test_turn_without_key_is_bad_request() {
    let game_state = default_game_state().await;
    let (router, oracle) = router_with(knight_oracle());

    let response = router
        .oneshot(post("/api/turn", &json!({"gameState": game_state})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("API key"));
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_turn_with_empty_history_is_server_error() {
    let (router, _) = router_with(knight_oracle());
    let body = json!({
        "gameState": {"worldDescription": "nowhere", "history": [], "agents": []},
        "apiKey": "sk-test",
    });

    let response = router.oneshot(post("/api/turn", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("turn failed:"));
}

#[tokio::test]
async fn test_story() {
    let game_state = default_game_state().await;
    let (router, _) = router_with(
        ScriptedOracle::new().respond(CallSite::Story, "Deep in the forest, a knight kept watch."),
    );

    let response = router
        .oneshot(post("/api/story", &json!({"gameState": game_state, "apiKey": "sk-test"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["story"], "Deep in the forest, a knight kept watch.");
}

#[tokio::test]
async fn test_story_without_key_is_bad_request() {
    let game_state = default_game_state().await;
    let (router, _) = router_with(ScriptedOracle::new());

    let response = router
        .oneshot(post("/api/story", &json!({"gameState": game_state, "apiKey": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_scenario() {
    let mut grid = Grid::empty(15, 15);
    grid.set(2, 2, "<Captain> scans the horizon");
    grid.set(9, 4, "<Parrot> squawks from the mast");
    let scenario = json!({"grid": grid, "worldDescription": "A pirate ship at dawn"});
    let (router, oracle) =
        router_with(ScriptedOracle::new().respond(CallSite::Scenario, scenario.to_string()));

    let response = router
        .oneshot(post(
            "/api/scenario",
            &json!({"worldDescription": "pirates", "apiKey": "sk-test"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["gameState"]["worldDescription"], "A pirate ship at dawn");
    assert_eq!(json["gameState"]["history"][0]["description"], "Initial scenario setup");
    assert_eq!(json["gameState"]["agents"].as_array().unwrap().len(), 2);
    assert_eq!(oracle.calls()[0].context["userDescription"], "pirates");
}

#[tokio::test]
async fn test_generate_scenario_wrong_size_is_server_error() {
    let scenario = json!({"grid": Grid::empty(3, 3), "worldDescription": "tiny"});
    let (router, _) =
        router_with(ScriptedOracle::new().respond(CallSite::Scenario, scenario.to_string()));

    let response = router
        .oneshot(post(
            "/api/scenario",
            &json!({"worldDescription": "tiny", "apiKey": "sk-test"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 500);
    assert!(json["error"].as_str().unwrap().starts_with("scenario failed:"));
}
