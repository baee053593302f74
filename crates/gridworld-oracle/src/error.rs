//! Error types for the LLM oracle.
//!
//! These cover building the oracle. Failures of individual calls are
//! reported as [`gridworld_core::oracle::OracleError`] so the turn pipeline
//! can fall back without knowing which backend is in use.

/// Errors that can occur while setting up the oracle.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// A prompt template could not be loaded or compiled.
    #[error("template error: {0}")]
    Template(String),

    /// Rendering a prompt failed.
    #[error("template render error: {0}")]
    Render(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
}
