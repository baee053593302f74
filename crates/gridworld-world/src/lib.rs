//! Grid mechanics for the Gridworld turn engine.
//!
//! # Modules
//!
//! - [`apply`] -- Bounds-checked, last-write-wins application of change lists.
//! - [`agents`] -- Agent scans and re-derivation of the agent list from a grid.
//! - [`error`] -- Grid shape errors.
//! - [`render`] -- Text renderings of a grid for oracle prompts.
//! - [`scenario`] -- Shape validation, session setup and the forest start.

pub mod agents;
pub mod apply;
pub mod error;
pub mod render;
pub mod scenario;

pub use agents::{Sighting, agent_locations, derive_agents, scan_agents};
pub use apply::{Applied, apply_changes};
pub use error::WorldError;
pub use render::{EMPTY_WORLD, describe_full_grid, describe_world};
pub use scenario::{INITIAL_TURN_DESCRIPTION, new_session, starting_scenario, validate_shape};
