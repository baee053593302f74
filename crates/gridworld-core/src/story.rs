//! Whole-session storytelling.

use gridworld_types::GameState;
use gridworld_world::describe_world;
use serde_json::json;
use tracing::warn;

use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};
use crate::turn::TurnError;

/// Story used when the oracle cannot tell one.
pub const STORY_FALLBACK: &str = "The tale remains untold...";

/// Summary shown for turns without a description.
const NO_SUMMARY: &str = "No summary available";

/// Tell the session so far as a story.
///
/// # Errors
///
/// [`TurnError::MissingCredential`] for a blank key and
/// [`TurnError::EmptyHistory`] when there is nothing to tell. Oracle
/// failures yield [`STORY_FALLBACK`] instead.
pub async fn generate_story<O: Oracle>(
    oracle: &O,
    game_state: &GameState,
    api_key: &str,
) -> Result<String, TurnError> {
    let credential = ApiKey::new(api_key).ok_or(TurnError::MissingCredential)?;
    let latest = game_state.latest().ok_or(TurnError::EmptyHistory)?;

    let agents: Vec<String> = game_state
        .agents
        .iter()
        .map(|a| format!("{}: Located at {}. Current state: {}", a.name, a.location, a.current_state))
        .collect();
    let turns: Vec<serde_json::Value> = game_state
        .history
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let summary = if turn.description.trim().is_empty() {
                NO_SUMMARY
            } else {
                turn.description.as_str()
            };
            json!({
                "number": i.saturating_add(1),
                "world": describe_world(&turn.world),
                "summary": summary,
            })
        })
        .collect();

    let request = OracleRequest::new(
        CallSite::Story,
        json!({
            "worldDescription": game_state.world_description,
            "agents": agents,
            "world": describe_world(&latest.world),
            "turns": turns,
        }),
    );
    match oracle.request(&credential, request).await {
        Ok(story) if !story.trim().is_empty() => Ok(story.trim().to_owned()),
        Ok(_) => Ok(STORY_FALLBACK.to_owned()),
        Err(e) => {
            warn!(
                site = %CallSite::Story,
                error = %e,
                "oracle call failed, using fallback story"
            );
            Ok(STORY_FALLBACK.to_owned())
        }
    }
}
