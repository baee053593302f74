//! Per-turn diagnostics returned alongside the new game state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// What happened inside one pass of the turn pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TurnReport {
    /// Index of the new history entry. The setup turn is 0.
    pub turn_number: usize,
    /// Unique id of this pass, also on every log line it emits.
    pub turn_id: Uuid,
    /// Agents narrated this turn.
    pub agents_acting: usize,
    /// Proposals collected, agent and environmental.
    pub proposals: usize,
    /// Proposals accepted without adjudication.
    pub accepted: usize,
    /// Conflict groups sent to adjudication.
    pub conflict_groups: usize,
    /// Agents found in more than one cell before resolution.
    pub duplicated_agents: usize,
    /// Agents found in no cell before resolution.
    pub missing_agents: usize,
    /// Whether the agent-conflict resolver was consulted.
    pub resolution_ran: bool,
    /// Violations left after resolution, when re-validation is on.
    pub unresolved_agents: Option<usize>,
    /// Changes in the merged list.
    pub changes_applied: usize,
    /// Changes dropped as out of range.
    pub out_of_bounds_dropped: usize,
    /// When the pass finished.
    pub completed_at: DateTime<Utc>,
}
