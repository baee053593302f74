//! Shared type definitions for the Gridworld turn engine.
//!
//! Every crate in the workspace speaks these types, and the presentation
//! layer receives them as camelCase JSON. `TypeScript` bindings are generated
//! through `ts-rs`.
//!
//! # Modules
//!
//! - [`grid`] -- The world grid, locations and single-cell changes
//! - [`agent`] -- Agents, their history, and `<Name>` tag extraction
//! - [`turn`] -- Proposals, turn states and the game state
//! - [`report`] -- Per-turn diagnostics

pub mod agent;
pub mod grid;
pub mod report;
pub mod turn;

pub use agent::{Agent, DEFAULT_AGENT_COLOR, HistoryEntry, agent_name};
pub use grid::{Change, DEFAULT_COLS, DEFAULT_ROWS, Grid, Location};
pub use report::TurnReport;
pub use turn::{GameState, ProposalResult, TurnState};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        // Exporting writes into `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::grid::Location::export_all();
        let _ = crate::grid::Change::export_all();
        let _ = crate::grid::Grid::export_all();
        let _ = crate::agent::HistoryEntry::export_all();
        let _ = crate::agent::Agent::export_all();
        let _ = crate::turn::ProposalResult::export_all();
        let _ = crate::turn::TurnState::export_all();
        let _ = crate::turn::GameState::export_all();
        let _ = crate::report::TurnReport::export_all();
    }
}
