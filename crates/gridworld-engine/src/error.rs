//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode during startup, serving and headless runs.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gridworld_core::config::ConfigError,
    },

    /// The oracle could not be built.
    #[error("oracle error: {source}")]
    Oracle {
        /// The underlying oracle setup error.
        #[from]
        source: gridworld_oracle::LlmError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: gridworld_server::ServerError,
    },

    /// A turn could not be advanced.
    #[error("turn error: {source}")]
    Turn {
        /// The underlying turn error.
        #[from]
        source: gridworld_core::turn::TurnError,
    },

    /// The starting scenario could not be read.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the failure.
        message: String,
    },

    /// The session could not be written.
    #[error("output error: {message}")]
    Output {
        /// Description of the failure.
        message: String,
    },

    /// The command line was not understood.
    #[error("usage: gridworld-engine [serve | run]; got {message}")]
    Usage {
        /// The offending argument.
        message: String,
    },
}
