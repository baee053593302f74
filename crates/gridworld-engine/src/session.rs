//! Headless sessions: advance a game state for a fixed number of turns and
//! write the result to disk.

use std::path::Path;

use gridworld_core::config::{SessionConfig, TurnConfig};
use gridworld_core::oracle::Oracle;
use gridworld_core::turn::advance_turn;
use gridworld_types::GameState;
use gridworld_world::starting_scenario;
use tracing::info;

use crate::error::EngineError;

/// Read a starting `GameState` from `path`, or the forest when unset.
pub fn load_start(path: Option<&Path>) -> Result<GameState, EngineError> {
    let Some(path) = path else {
        info!("No scenario path configured, starting in the forest");
        return Ok(starting_scenario());
    };
    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Scenario {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    serde_json::from_str(&contents).map_err(|e| EngineError::Scenario {
        message: format!("failed to parse {}: {e}", path.display()),
    })
}

/// Advance `game_state` by `session.turns` turns, then write it to
/// `session.output_path`.
pub async fn run_session<O: Oracle>(
    oracle: &O,
    turn_config: &TurnConfig,
    session: &SessionConfig,
    mut game_state: GameState,
    api_key: &str,
) -> Result<GameState, EngineError> {
    for _ in 0..session.turns {
        let outcome = advance_turn(oracle, turn_config, game_state, api_key).await?;
        info!(
            turn = outcome.report.turn_number,
            changes = outcome.report.changes_applied,
            conflicts = outcome.report.conflict_groups,
            "Turn complete"
        );
        game_state = outcome.game_state;
    }

    let json = serde_json::to_string_pretty(&game_state).map_err(|e| EngineError::Output {
        message: format!("failed to serialize game state: {e}"),
    })?;
    std::fs::write(&session.output_path, json).map_err(|e| EngineError::Output {
        message: format!("failed to write {}: {e}", session.output_path.display()),
    })?;
    info!(
        path = %session.output_path.display(),
        turns = game_state.turn_count(),
        "Session written"
    );
    Ok(game_state)
}
