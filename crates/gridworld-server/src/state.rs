//! Shared application state for the HTTP API.
//!
//! Sessions live in the client: every request carries the full
//! `GameState`, so the server holds only the oracle and configuration.

use std::sync::Arc;

use gridworld_core::config::{TurnConfig, WorldConfig};
use gridworld_core::oracle::Oracle;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState<O> {
    /// The oracle every endpoint consults.
    pub oracle: Arc<O>,
    /// Turn pipeline options.
    pub turn: TurnConfig,
    /// Grid size for generated scenarios.
    pub world: WorldConfig,
}

impl<O: Oracle> AppState<O> {
    /// Create the state with default turn and world settings.
    pub fn new(oracle: Arc<O>) -> Self {
        Self::with_config(oracle, TurnConfig::default(), WorldConfig::default())
    }

    /// Create the state with explicit settings.
    pub const fn with_config(oracle: Arc<O>, turn: TurnConfig, world: WorldConfig) -> Self {
        Self { oracle, turn, world }
    }
}
