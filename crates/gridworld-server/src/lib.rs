//! HTTP API for the Gridworld turn engine.
//!
//! An Axum server the browser front end talks to. It is stateless between
//! requests: each call carries the session's `GameState` and the caller's
//! API key, and gets the updated state back.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
