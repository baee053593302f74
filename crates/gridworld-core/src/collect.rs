//! Proposal Collector: translate every actor's intent into proposals.
//!
//! One translation call per narrated agent action and one environmental
//! call are dispatched together. The output keeps agent order, followed by
//! the environmental proposals in the order the oracle returned them. A call
//! that fails contributes an empty proposal instead of failing the turn.

use futures::future::{join, join_all};
use gridworld_types::ProposalResult;
use serde_json::json;
use tracing::{debug, warn};

use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};
use crate::parse::{EnvironmentalPayload, parse_payload};
use crate::view::WorldView;

/// One agent's narrated action, input to translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIntent {
    /// The acting agent.
    pub agent_name: String,
    /// Free-text narration of what the agent does.
    pub action: String,
}

/// Translate every intent and generate environmental actions, concurrently.
pub async fn collect_proposals<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    intents: &[AgentIntent],
) -> Vec<ProposalResult> {
    let translations = join_all(
        intents
            .iter()
            .map(|intent| translate_action(oracle, credential, view, intent)),
    );
    let environmental = environmental_actions(oracle, credential, view);

    let (mut proposals, environmental) = join(translations, environmental).await;
    debug!(
        agent_proposals = proposals.len(),
        environmental_proposals = environmental.len(),
        "proposals collected"
    );
    proposals.extend(environmental);
    proposals
}

/// Translate one narrated action into a proposal.
async fn translate_action<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    intent: &AgentIntent,
) -> ProposalResult {
    let request = OracleRequest::new(
        CallSite::TranslateAction,
        json!({
            "agentName": intent.agent_name,
            "action": intent.action,
            "worldDescription": view.world_description,
            "world": view.rendered,
        }),
    );
    let raw = match oracle.request(credential, request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                site = %CallSite::TranslateAction,
                agent = %intent.agent_name,
                error = %e,
                "oracle call failed, using empty proposal"
            );
            return translation_fallback(&intent.agent_name);
        }
    };
    match parse_payload::<ProposalResult>(&raw) {
        Ok(proposal) => proposal,
        Err(e) => {
            warn!(
                site = %CallSite::TranslateAction,
                agent = %intent.agent_name,
                error = %e,
                raw_response = %raw,
                "unparsable proposal, using empty proposal"
            );
            translation_fallback(&intent.agent_name)
        }
    }
}

fn translation_fallback(agent_name: &str) -> ProposalResult {
    ProposalResult::empty(format!(
        "{agent_name}'s action could not be translated, so nothing changed for them"
    ))
}

/// Ask for zero or more proposals from non-agent actors.
///
/// On failure the stage contributes a single empty proposal.
async fn environmental_actions<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
) -> Vec<ProposalResult> {
    let request = OracleRequest::new(
        CallSite::Environmental,
        json!({
            "worldDescription": view.world_description,
            "world": view.rendered,
        }),
    );
    let fallback = || vec![ProposalResult::empty("The environment stays still this turn")];
    let raw = match oracle.request(credential, request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                site = %CallSite::Environmental,
                error = %e,
                "oracle call failed, using empty proposal"
            );
            return fallback();
        }
    };
    match parse_payload::<EnvironmentalPayload>(&raw) {
        Ok(payload) => payload.environmental_actions,
        Err(e) => {
            warn!(
                site = %CallSite::Environmental,
                error = %e,
                raw_response = %raw,
                "unparsable environmental actions, using empty proposal"
            );
            fallback()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use gridworld_types::Grid;

    use super::*;
    use crate::oracle::OracleError;
    use crate::scripted::ScriptedOracle;

    fn key() -> ApiKey {
        ApiKey::new("k").unwrap()
    }

    fn intents(names: &[&str]) -> Vec<AgentIntent> {
        names
            .iter()
            .map(|n| AgentIntent {
                agent_name: (*n).to_owned(),
                action: format!("{n} acts"),
            })
            .collect()
    }

    fn by_agent(ctx: &serde_json::Value) -> Result<String, OracleError> {
        let name = ctx["agentName"].as_str().unwrap_or_default();
        match name {
            "Knight" => Ok(r#"{"changes":[{"row":0,"col":0,"newContent":"<Knight>"}],"explanation":"knight"}"#.to_owned()),
            "Fox" => Ok(r#"{"changes":[{"row":1,"col":1,"newContent":"<Fox>"}],"explanation":"fox"}"#.to_owned()),
            _ => Ok("not json at all".to_owned()),
        }
    }

    #[tokio::test]
    async fn agent_order_then_environmental() {
        let oracle = ScriptedOracle::new()
            .respond_with(CallSite::TranslateAction, by_agent)
            .respond(
                CallSite::Environmental,
                r#"{"environmentalActions":[{"changes":[],"explanation":"wind"},{"changes":[],"explanation":"rain"}]}"#,
            );
        let grid = Grid::empty(2, 2);
        let view = WorldView::new(&grid, "test");
        let proposals = collect_proposals(&oracle, &key(), &view, &intents(&["Knight", "Fox"])).await;
        let explanations: Vec<&str> = proposals.iter().map(|p| p.explanation.as_str()).collect();
        assert_eq!(explanations, vec!["knight", "fox", "wind", "rain"]);
        assert_eq!(oracle.call_count(CallSite::TranslateAction), 2);
        assert_eq!(oracle.call_count(CallSite::Environmental), 1);
    }

    #[tokio::test]
    async fn unparsable_translation_degrades_to_empty() {
        let oracle = ScriptedOracle::new()
            .respond_with(CallSite::TranslateAction, by_agent)
            .respond(CallSite::Environmental, r#"{"environmentalActions":[]}"#);
        let grid = Grid::empty(2, 2);
        let view = WorldView::new(&grid, "test");
        let proposals = collect_proposals(&oracle, &key(), &view, &intents(&["Knight", "Ghost"])).await;
        assert_eq!(proposals.len(), 2);
        assert!(proposals[1].is_empty());
        assert!(proposals[1].explanation.contains("Ghost"));
    }

    #[tokio::test]
    async fn environmental_failure_yields_one_empty_proposal() {
        let oracle = ScriptedOracle::new()
            .respond_with(CallSite::TranslateAction, by_agent)
            .fail(CallSite::Environmental, OracleError::Timeout { timeout_ms: 1 });
        let grid = Grid::empty(2, 2);
        let view = WorldView::new(&grid, "test");
        let proposals = collect_proposals(&oracle, &key(), &view, &intents(&["Fox"])).await;
        assert_eq!(proposals.len(), 2);
        assert!(proposals[1].is_empty());
    }

    #[tokio::test]
    async fn out_of_range_coordinate_keeps_the_rest_of_the_proposal() {
        let oracle = ScriptedOracle::new()
            .respond(
                CallSite::TranslateAction,
                r#"{"changes":[{"row":1,"col":1,"newContent":"<Knight> moved"},{"row":4294967296,"col":0,"newContent":"x"},{"row":0.0,"col":1.0,"newContent":""}],"explanation":"knight moved"}"#,
            )
            .respond(CallSite::Environmental, r#"{"environmentalActions":[]}"#);
        let grid = Grid::empty(2, 2);
        let view = WorldView::new(&grid, "test");
        let proposals = collect_proposals(&oracle, &key(), &view, &intents(&["Knight"])).await;
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].explanation, "knight moved");
        assert_eq!(proposals[0].changes.len(), 3);

        let applied = gridworld_world::apply_changes(&grid, &proposals[0].changes);
        assert_eq!(applied.grid.cell(gridworld_types::Location::new(1, 1)), Some("<Knight> moved"));
        assert_eq!(applied.dropped, 1);
    }

    #[tokio::test]
    async fn no_agents_still_asks_environment() {
        let oracle = ScriptedOracle::new().respond(CallSite::Environmental, "{}");
        let grid = Grid::empty(1, 1);
        let view = WorldView::new(&grid, "test");
        let proposals = collect_proposals(&oracle, &key(), &view, &[]).await;
        assert!(proposals.is_empty());
        assert_eq!(oracle.call_count(CallSite::Environmental), 1);
    }
}
