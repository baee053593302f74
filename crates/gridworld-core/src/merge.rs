//! Merge & Apply.
//!
//! Accepted proposals, then adjudicated results, then the agent-conflict
//! resolution are flattened into one change list in that fixed order and
//! applied to a fresh copy of the prior grid. Later changes win.

use gridworld_types::{Change, Grid, ProposalResult};
use gridworld_world::{Applied, apply_changes};

/// The proposals that survive a turn, in merge order.
#[derive(Debug, Clone, Default)]
pub struct MergePlan<'a> {
    /// Conflict-free proposals.
    pub accepted: Vec<&'a ProposalResult>,
    /// One result per conflict group.
    pub adjudicated: &'a [ProposalResult],
    /// The agent-conflict resolution, when one ran.
    pub resolution: Option<&'a ProposalResult>,
}

impl<'a> MergePlan<'a> {
    /// Every proposal, in merge order.
    pub fn ordered(&self) -> impl Iterator<Item = &'a ProposalResult> + '_ {
        self.accepted
            .iter()
            .copied()
            .chain(self.adjudicated.iter())
            .chain(self.resolution)
    }

    /// Accepted and adjudicated changes, the list the validator checks.
    pub fn pre_resolution_changes(&self) -> Vec<Change> {
        self.accepted
            .iter()
            .copied()
            .chain(self.adjudicated.iter())
            .flat_map(|p| p.changes.iter().cloned())
            .collect()
    }

    /// Every change, in merge order.
    pub fn changes(&self) -> Vec<Change> {
        self.ordered()
            .flat_map(|p| p.changes.iter().cloned())
            .collect()
    }

    /// Every explanation, in merge order. Blank ones are skipped.
    pub fn explanations(&self) -> Vec<String> {
        self.ordered()
            .map(|p| p.explanation.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Apply the merged change list to a copy of `prior`.
pub fn merge_and_apply(prior: &Grid, plan: &MergePlan<'_>) -> Applied {
    apply_changes(prior, &plan.changes())
}
