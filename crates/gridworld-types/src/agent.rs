//! Agents and agent-name extraction.
//!
//! An agent is never asserted directly. It is whatever name appears in angle
//! brackets inside a grid cell, e.g. `<Knight> guards the bridge`. The text
//! around the tag is the agent's narrative state.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grid::Location;

/// Colour assigned to agents when they first appear.
pub const DEFAULT_AGENT_COLOR: &str = "red";

static AGENT_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<([^<>]+)>").ok());

/// Extract the first `<Name>` tag from a cell, without the brackets.
///
/// Returns `None` for empty cells and cells without a tag.
pub fn agent_name(cell: &str) -> Option<&str> {
    if cell.is_empty() {
        return None;
    }
    let re = AGENT_TAG.as_ref()?;
    re.captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// One entry of an agent's private history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HistoryEntry {
    /// The narrated action the agent chose.
    pub action: String,
    /// The agent's cell text at the time it chose.
    pub agent_state: String,
    /// Where the agent stood at the time it chose.
    pub location: Location,
}

/// A cached projection of one agent tag on the grid plus its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Unique name, the text inside the angle brackets.
    pub name: String,
    /// Display colour.
    #[serde(default = "default_color")]
    pub color: String,
    /// The full text of the agent's cell.
    pub current_state: String,
    /// The agent's cell.
    pub location: Location,
    /// Append-only record of the agent's own choices.
    #[serde(default)]
    pub private_history: Vec<HistoryEntry>,
}

fn default_color() -> String {
    DEFAULT_AGENT_COLOR.to_owned()
}

impl Agent {
    /// A newly discovered agent with an empty history.
    pub fn discovered(name: &str, current_state: &str, location: Location) -> Self {
        Self {
            name: name.to_owned(),
            color: default_color(),
            current_state: current_state.to_owned(),
            location,
            private_history: Vec::new(),
        }
    }
}
