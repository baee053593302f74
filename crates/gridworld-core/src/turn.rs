//! The session boundary: advance a game state by one turn.
//!
//! [`advance_turn`] takes the whole game state and the caller's credential,
//! narrates every agent, runs the engine once over the latest grid, and
//! returns the game state with one more history entry and a refreshed agent
//! list. Turns on one session must not overlap.

use chrono::Utc;
use gridworld_types::{GameState, TurnReport};
use gridworld_world::derive_agents;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::TurnConfig;
use crate::engine::resolve_turn;
use crate::narrate::{apply_history, narrate_agents};
use crate::oracle::{ApiKey, Oracle};
use crate::view::WorldView;

/// Errors that stop a turn before it starts.
///
/// Everything after these checks degrades to fallbacks instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// No API key was supplied.
    #[error("an API key is required")]
    MissingCredential,

    /// The game state has no turns to build on.
    #[error("game state has no history")]
    EmptyHistory,
}

/// The result of a successful turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The advanced game state.
    pub game_state: GameState,
    /// Diagnostics for the pass.
    pub report: TurnReport,
}

/// Advance `game_state` by exactly one turn.
///
/// # Errors
///
/// [`TurnError::MissingCredential`] when `api_key` is blank, checked before
/// any oracle call. [`TurnError::EmptyHistory`] when there is no turn to
/// start from.
pub async fn advance_turn<O: Oracle>(
    oracle: &O,
    config: &TurnConfig,
    mut game_state: GameState,
    api_key: &str,
) -> Result<TurnOutcome, TurnError> {
    let credential = ApiKey::new(api_key).ok_or(TurnError::MissingCredential)?;
    let prior = game_state
        .latest()
        .ok_or(TurnError::EmptyHistory)?
        .world
        .clone();

    let turn_number = game_state.turn_count();
    let turn_id = Uuid::now_v7();
    let span = info_span!("turn", turn = turn_number, turn_id = %turn_id);

    async move {
        let mut agents = derive_agents(&prior, &game_state.agents);
        let agents_acting = agents.len();
        let view = WorldView::new(&prior, &game_state.world_description);

        let narrations = narrate_agents(oracle, &credential, &view, &agents).await;
        let (intents, appends): (Vec<_>, Vec<_>) = narrations
            .into_iter()
            .map(|n| (n.intent, n.append))
            .unzip();
        apply_history(&mut agents, appends.into_iter().flatten());

        let resolution = resolve_turn(oracle, &credential, config, &view, &intents).await;

        game_state.agents = derive_agents(&resolution.turn_state.world, &agents);
        game_state.history.push(resolution.turn_state);

        let stats = resolution.stats;
        let report = TurnReport {
            turn_number,
            turn_id,
            agents_acting,
            proposals: stats.proposals,
            accepted: stats.accepted,
            conflict_groups: stats.conflict_groups,
            duplicated_agents: stats.duplicated_agents,
            missing_agents: stats.missing_agents,
            resolution_ran: stats.resolution_ran,
            unresolved_agents: stats.unresolved_agents,
            changes_applied: stats.changes_applied,
            out_of_bounds_dropped: stats.out_of_bounds_dropped,
            completed_at: Utc::now(),
        };
        info!(
            proposals = report.proposals,
            conflict_groups = report.conflict_groups,
            resolution_ran = report.resolution_ran,
            changes = report.changes_applied,
            agents = game_state.agents.len(),
            "turn complete"
        );

        Ok(TurnOutcome { game_state, report })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use gridworld_types::{Agent, Grid, Location, TurnState};
    use gridworld_world::new_session;

    use super::*;
    use crate::narrate::HESITATION;
    use crate::oracle::CallSite;
    use crate::scripted::ScriptedOracle;

    fn knight_session() -> GameState {
        let grid = Grid::from_rows(vec![
            vec![String::new(), "<Knight> guards".to_owned()],
            vec![String::new(), String::new()],
        ]);
        new_session("a bridge", grid)
    }

    fn moving_oracle() -> ScriptedOracle {
        ScriptedOracle::new()
            .respond(CallSite::AgentAction, "The knight walks south.")
            .respond(
                CallSite::TranslateAction,
                r#"{"changes":[{"row":0,"col":1,"newContent":""},{"row":1,"col":1,"newContent":"<Knight> moved"}],"explanation":"The knight moved south"}"#,
            )
            .respond(CallSite::Environmental, r#"{"environmentalActions":[]}"#)
            .respond(CallSite::Summarize, "The knight left the bridge.")
    }

    #[tokio::test]
    async fn missing_key_is_refused_before_any_call() {
        let oracle = moving_oracle();
        let err = advance_turn(&oracle, &TurnConfig::default(), knight_session(), "  ")
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::MissingCredential);
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_history_is_refused() {
        let state = GameState {
            world_description: String::new(),
            history: Vec::new(),
            agents: Vec::new(),
        };
        let err = advance_turn(&moving_oracle(), &TurnConfig::default(), state, "k")
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::EmptyHistory);
    }

    #[tokio::test]
    async fn turn_appends_history_and_moves_agent() {
        let outcome = advance_turn(&moving_oracle(), &TurnConfig::default(), knight_session(), "k")
            .await
            .unwrap();
        let state = outcome.game_state;

        assert_eq!(state.history.len(), 2);
        let latest = state.latest().unwrap();
        assert_eq!(latest.description, "The knight left the bridge.");
        assert_eq!(latest.world.cell(Location::new(1, 1)), Some("<Knight> moved"));

        assert_eq!(state.agents.len(), 1);
        let knight = &state.agents[0];
        assert_eq!(knight.location, Location::new(1, 1));
        assert_eq!(knight.current_state, "<Knight> moved");
        assert_eq!(knight.private_history.len(), 1);
        assert_eq!(knight.private_history[0].action, "The knight walks south.");
        assert_eq!(knight.private_history[0].location, Location::new(0, 1));

        assert_eq!(outcome.report.turn_number, 1);
        assert_eq!(outcome.report.agents_acting, 1);
        assert_eq!(outcome.report.changes_applied, 2);
    }

    #[tokio::test]
    async fn hesitating_agent_gets_no_history() {
        let oracle = ScriptedOracle::new()
            .respond(CallSite::Environmental, "{}")
            .respond_with(CallSite::TranslateAction, |ctx| {
                assert_eq!(ctx["action"], HESITATION);
                Ok(r#"{"changes":[],"explanation":"the knight hesitates"}"#.to_owned())
            });
        let outcome = advance_turn(&oracle, &TurnConfig::default(), knight_session(), "k")
            .await
            .unwrap();
        assert!(outcome.game_state.agents[0].private_history.is_empty());
        assert_eq!(outcome.game_state.history.len(), 2);
    }

    #[tokio::test]
    async fn stale_agent_list_is_rederived_first() {
        let mut state = knight_session();
        state.agents = vec![Agent::discovered("Ghost", "<Ghost>", Location::new(0, 0))];
        let oracle = moving_oracle();
        let outcome = advance_turn(&oracle, &TurnConfig::default(), state, "k").await.unwrap();
        assert_eq!(oracle.call_count(CallSite::AgentAction), 1);
        let names: Vec<&str> = outcome.game_state.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Knight"]);
    }

    #[tokio::test]
    async fn prior_turns_are_untouched() {
        let before = knight_session();
        let first: TurnState = before.history[0].clone();
        let outcome = advance_turn(&moving_oracle(), &TurnConfig::default(), before, "k")
            .await
            .unwrap();
        assert_eq!(outcome.game_state.history[0], first);
    }
}
