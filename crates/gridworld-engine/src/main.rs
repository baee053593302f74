//! Gridworld engine binary.
//!
//! Wires configuration, logging and the LLM oracle together, then either
//! serves the HTTP API or runs a headless session.
//!
//! # Usage
//!
//! - `gridworld-engine serve` (default) -- start the HTTP server.
//! - `gridworld-engine run` -- advance the configured scenario for
//!   `session.turns` turns using `GRIDWORLD_API_KEY`, and write the result
//!   to `session.output_path`.

mod error;
mod session;

use std::sync::Arc;

use gridworld_core::config::{GridworldConfig, LoggingConfig};
use gridworld_oracle::LlmOracle;
use gridworld_server::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable holding the credential for headless runs.
const API_KEY_ENV: &str = "GRIDWORLD_API_KEY";

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Run,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Result<Self, EngineError> {
        match arg {
            None | Some("serve") => Ok(Self::Serve),
            Some("run") => Ok(Self::Run),
            Some(other) => Err(EngineError::Usage {
                message: other.to_owned(),
            }),
        }
    }
}

/// Application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mode = Mode::from_arg(std::env::args().nth(1).as_deref())?;
    let config = GridworldConfig::load().map_err(EngineError::from)?;
    init_logging(&config.logging);

    info!(
        mode = ?mode,
        backend = %config.llm.backend,
        model = %config.llm.model,
        grouping = ?config.turn.grouping,
        "gridworld-engine starting"
    );

    let oracle = LlmOracle::from_config(&config.llm).map_err(EngineError::from)?;
    info!(backend = oracle.backend_name(), "Oracle ready");

    match mode {
        Mode::Serve => {
            let state = Arc::new(AppState::with_config(
                Arc::new(oracle),
                config.turn.clone(),
                config.world.clone(),
            ));
            gridworld_server::start_server(&config.server, state)
                .await
                .map_err(EngineError::from)?;
        }
        Mode::Run => {
            let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
            let start = session::load_start(config.session.scenario_path.as_deref())?;
            let finished =
                session::run_session(&oracle, &config.turn, &config.session, start, &api_key).await?;
            info!(turns = finished.turn_count(), "Headless session complete");
        }
    }

    info!("gridworld-engine shutdown complete");
    Ok(())
}

/// Initialize structured logging. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
