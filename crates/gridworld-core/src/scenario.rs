//! Scenario generation from a user's description.
//!
//! Unlike the turn pipeline there is no fallback here: a scenario that is
//! missing, unparsable or the wrong shape is reported to the caller.

use gridworld_types::GameState;
use gridworld_world::{WorldError, new_session, validate_shape};
use serde_json::json;
use tracing::{info, warn};

use crate::oracle::{ApiKey, CallSite, Oracle, OracleError, OracleRequest};
use crate::parse::{ParseError, ScenarioPayload, parse_payload};

/// Why a scenario could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// No API key was supplied.
    #[error("an API key is required")]
    MissingCredential,

    /// The oracle call failed.
    #[error("scenario generation failed: {0}")]
    Oracle(#[from] OracleError),

    /// The oracle answered with something other than a scenario.
    #[error("scenario response was malformed: {0}")]
    Parse(#[from] ParseError),

    /// The generated grid has the wrong shape.
    #[error("generated grid is unusable: {0}")]
    Shape(#[from] WorldError),
}

/// Generate a `rows` x `cols` session from `user_description`.
///
/// The result has one setup turn and agents derived from the grid.
pub async fn generate_scenario<O: Oracle>(
    oracle: &O,
    user_description: &str,
    api_key: &str,
    rows: usize,
    cols: usize,
) -> Result<GameState, ScenarioError> {
    let credential = ApiKey::new(api_key).ok_or(ScenarioError::MissingCredential)?;
    let request = OracleRequest::new(
        CallSite::Scenario,
        json!({
            "userDescription": user_description,
            "rows": rows,
            "cols": cols,
        }),
    );
    let raw = oracle.request(&credential, request).await?;
    let payload: ScenarioPayload = parse_payload(&raw).inspect_err(|e| {
        warn!(
            site = %CallSite::Scenario,
            error = %e,
            raw_response = %raw,
            "unparsable scenario"
        );
    })?;
    validate_shape(&payload.grid, rows, cols)?;

    let state = new_session(&payload.world_description, payload.grid);
    info!(agents = state.agents.len(), "scenario generated");
    Ok(state)
}
