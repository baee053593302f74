//! Proposals, turn states and the session-level game state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::agent::Agent;
use crate::grid::{Change, Grid};

/// A candidate set of cell mutations plus a human-readable explanation.
///
/// This is the output of every structured oracle call in the turn pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProposalResult {
    /// Ordered cell mutations.
    pub changes: Vec<Change>,
    /// What the changes mean.
    #[serde(default)]
    pub explanation: String,
}

impl ProposalResult {
    /// A proposal with no changes.
    pub fn empty(explanation: impl Into<String>) -> Self {
        Self {
            changes: Vec::new(),
            explanation: explanation.into(),
        }
    }

    /// Whether the proposal changes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Target coordinates in change order, duplicates included.
    pub fn targets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.changes.iter().map(Change::target)
    }
}

/// One completed turn. Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TurnState {
    /// The grid after the turn.
    pub world: Grid,
    /// Narrated summary of the turn.
    #[serde(default)]
    pub description: String,
}

/// A whole session as exchanged with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// The setting, as written by the user.
    pub world_description: String,
    /// Every completed turn, oldest first.
    pub history: Vec<TurnState>,
    /// Agents as of the latest turn.
    #[serde(default)]
    pub agents: Vec<Agent>,
}

impl GameState {
    /// The most recent turn, if any.
    pub fn latest(&self) -> Option<&TurnState> {
        self.history.last()
    }

    /// Number of completed turns, counting the initial setup.
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}
