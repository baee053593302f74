//! Agent Invariant Validator.
//!
//! Every agent on the prior grid must still be on the next grid, exactly
//! once. The validator simulates the merge and reports agents that now
//! occupy several cells or none. Names appearing for the first time are
//! never flagged.

use std::collections::BTreeMap;

use gridworld_types::{Change, Grid, Location};
use gridworld_world::{agent_locations, apply_changes, scan_agents};
use serde::Serialize;

/// An agent found in more than one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatedAgent {
    /// Agent name.
    pub name: String,
    /// Every cell carrying the name, row-major.
    pub locations: Vec<Location>,
}

/// An agent present before the turn and absent after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingAgent {
    /// Agent name.
    pub name: String,
    /// Where the agent stood before the turn.
    pub original_location: Location,
}

/// The validator's findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConflictReport {
    /// Agents in more than one cell, by name.
    pub duplicated_agents: Vec<DuplicatedAgent>,
    /// Agents in no cell, by name.
    pub missing_agents: Vec<MissingAgent>,
}

impl AgentConflictReport {
    /// Whether the invariant holds.
    pub fn is_clean(&self) -> bool {
        self.duplicated_agents.is_empty() && self.missing_agents.is_empty()
    }

    /// Total number of offending agents.
    pub fn violation_count(&self) -> usize {
        self.duplicated_agents
            .len()
            .saturating_add(self.missing_agents.len())
    }
}

/// Check `changes` applied to `prior` for duplicated and missing agents.
pub fn detect_agent_conflicts(prior: &Grid, changes: &[Change]) -> AgentConflictReport {
    // A name seen twice on the prior grid keeps its last location.
    let original: BTreeMap<&str, Location> = scan_agents(prior)
        .into_iter()
        .map(|s| (s.name, s.location))
        .collect();

    let next = apply_changes(prior, changes).grid;
    let now = agent_locations(&next);

    let duplicated_agents = now
        .iter()
        .filter(|(_, locations)| locations.len() > 1)
        .map(|(name, locations)| DuplicatedAgent {
            name: name.clone(),
            locations: locations.clone(),
        })
        .collect();

    let missing_agents = original
        .into_iter()
        .filter(|(name, _)| !now.contains_key(*name))
        .map(|(name, original_location)| MissingAgent {
            name: name.to_owned(),
            original_location,
        })
        .collect();

    AgentConflictReport {
        duplicated_agents,
        missing_agents,
    }
}
