//! Agent action narration, the fan-out that precedes the engine.
//!
//! Each agent is asked, concurrently, what it does this turn. Calls never
//! touch the agent records: a successful call yields a [`HistoryAppend`]
//! which the orchestrator applies once every narration has finished.

use futures::future::join_all;
use gridworld_types::{Agent, HistoryEntry};
use serde_json::json;
use tracing::warn;

use crate::collect::AgentIntent;
use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};
use crate::view::WorldView;

/// Action used when an agent could not be narrated.
pub const HESITATION: &str = "The agent hesitates, unsure of what to do next.";

/// A history entry waiting to be appended to a named agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryAppend {
    /// The agent to append to.
    pub agent_name: String,
    /// The entry.
    pub entry: HistoryEntry,
}

/// One agent's narration outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// What the agent does, or [`HESITATION`].
    pub intent: AgentIntent,
    /// Present only when the oracle answered.
    pub append: Option<HistoryAppend>,
}

/// Narrate every agent concurrently, in agent order.
pub async fn narrate_agents<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    agents: &[Agent],
) -> Vec<Narration> {
    join_all(
        agents
            .iter()
            .map(|agent| narrate_agent(oracle, credential, view, agent)),
    )
    .await
}

async fn narrate_agent<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    agent: &Agent,
) -> Narration {
    let request = OracleRequest::new(
        CallSite::AgentAction,
        json!({
            "agent": agent,
            "worldDescription": view.world_description,
            "world": view.rendered,
        }),
    );
    let action = match oracle.request(credential, request).await {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Ok(_) => {
            warn!(
                site = %CallSite::AgentAction,
                agent = %agent.name,
                "empty narration, agent hesitates"
            );
            None
        }
        Err(e) => {
            warn!(
                site = %CallSite::AgentAction,
                agent = %agent.name,
                error = %e,
                "oracle call failed, agent hesitates"
            );
            None
        }
    };

    match action {
        Some(action) => Narration {
            append: Some(HistoryAppend {
                agent_name: agent.name.clone(),
                entry: HistoryEntry {
                    action: action.clone(),
                    agent_state: agent.current_state.clone(),
                    location: agent.location,
                },
            }),
            intent: AgentIntent {
                agent_name: agent.name.clone(),
                action,
            },
        },
        None => Narration {
            intent: AgentIntent {
                agent_name: agent.name.clone(),
                action: HESITATION.to_owned(),
            },
            append: None,
        },
    }
}

/// Append each entry to the agent it names. Unknown names are ignored.
pub fn apply_history(agents: &mut [Agent], appends: impl IntoIterator<Item = HistoryAppend>) {
    for append in appends {
        if let Some(agent) = agents.iter_mut().find(|a| a.name == append.agent_name) {
            agent.private_history.push(append.entry);
        }
    }
}
