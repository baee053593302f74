//! Agent Conflict Resolver orchestration.
//!
//! When the validator reports duplicated or missing agents, one oracle call
//! receives the full prior grid and the report and returns a corrective
//! proposal. The proposal is applied after everything else, so it wins any
//! remaining collision. A clean report makes no call at all.

use gridworld_types::ProposalResult;
use gridworld_world::describe_full_grid;
use serde_json::json;
use tracing::{info, warn};

use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};
use crate::parse::parse_payload;
use crate::validate::AgentConflictReport;
use crate::view::WorldView;

/// Explanation used when the resolver could not be consulted.
pub const RESOLUTION_FALLBACK: &str = "Agent conflicts were left unresolved";

/// Ask the oracle to repair the agents in `report`.
///
/// Returns `None` without calling the oracle when the report is clean.
pub async fn resolve_agent_conflicts<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    report: &AgentConflictReport,
) -> Option<ProposalResult> {
    if report.is_clean() {
        return None;
    }

    info!(
        duplicated = report.duplicated_agents.len(),
        missing = report.missing_agents.len(),
        "agent conflicts detected, requesting resolution"
    );

    let request = OracleRequest::new(
        CallSite::ResolveAgents,
        json!({
            "worldDescription": view.world_description,
            "world": describe_full_grid(view.grid),
            "duplicatedAgents": report.duplicated_agents,
            "missingAgents": report.missing_agents,
        }),
    );

    let raw = match oracle.request(credential, request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                site = %CallSite::ResolveAgents,
                error = %e,
                "oracle call failed, leaving agent conflicts"
            );
            return Some(ProposalResult::empty(RESOLUTION_FALLBACK));
        }
    };
    let resolution = match parse_payload::<ProposalResult>(&raw) {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!(
                site = %CallSite::ResolveAgents,
                error = %e,
                raw_response = %raw,
                "unparsable resolution, leaving agent conflicts"
            );
            ProposalResult::empty(RESOLUTION_FALLBACK)
        }
    };
    info!(
        changes = resolution.changes.len(),
        explanation = %resolution.explanation,
        "agent conflicts resolved"
    );
    Some(resolution)
}
