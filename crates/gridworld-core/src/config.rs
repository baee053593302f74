//! Configuration loading and typed config structures.
//!
//! The configuration lives in `gridworld.yaml` (or the path in
//! `GRIDWORLD_CONFIG`). Every section and field has a default, so an empty
//! or missing file yields a working setup against the public `OpenRouter`
//! endpoint.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::conflict::GroupingStrategy;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GRIDWORLD_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "gridworld.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration. Mirrors `gridworld.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridworldConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub world: WorldConfig,

    /// Turn pipeline options.
    #[serde(default)]
    pub turn: TurnConfig,

    /// Oracle backend settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless session options.
    #[serde(default)]
    pub session: SessionConfig,
}

impl GridworldConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `$GRIDWORLD_CONFIG`, falling back to `gridworld.yaml`.
    ///
    /// A missing file is not an error: defaults plus environment overrides
    /// are returned instead.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        if path.exists() {
            Self::from_file(&path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Override selected values from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override selected values from `lookup`:
    /// - `GRIDWORLD_API_URL` overrides `llm.api_url`
    /// - `GRIDWORLD_MODEL` overrides `llm.model`
    /// - `GRIDWORLD_BACKEND` overrides `llm.backend`
    /// - `GRIDWORLD_PORT` overrides `server.port` when it parses
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GRIDWORLD_API_URL") {
            self.llm.api_url = val;
        }
        if let Some(val) = lookup("GRIDWORLD_MODEL") {
            self.llm.model = val;
        }
        if let Some(val) = lookup("GRIDWORLD_BACKEND") {
            self.llm.backend = val;
        }
        if let Some(port) = lookup("GRIDWORLD_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }
}

/// Grid dimensions for generated scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Row count.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Column count.
    #[serde(default = "default_cols")]
    pub cols: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

/// Turn pipeline options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TurnConfig {
    /// How contested cells are grouped for adjudication.
    #[serde(default)]
    pub grouping: GroupingStrategy,

    /// Re-run the agent validator after the resolver and log leftovers.
    #[serde(default)]
    pub revalidate_after_resolution: bool,
}

/// Oracle backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmConfig {
    /// Backend wire format: `openai` (any OpenAI-compatible endpoint) or
    /// `anthropic`.
    #[serde(default = "default_llm_backend")]
    pub backend: String,

    /// Base URL of the model-serving endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Retries after the first attempt for transport failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Per-attempt timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum oracle calls in flight at once.
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,

    /// Completion token cap for call sites without their own.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Directory of `.j2` templates overriding the built-in prompts.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            api_url: default_api_url(),
            model: default_model(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrent_calls: default_max_concurrent_calls(),
            max_tokens: default_max_tokens(),
            templates_dir: None,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Headless session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Turns to advance.
    #[serde(default = "default_turns")]
    pub turns: u32,

    /// `GameState` JSON to start from. The forest scenario when unset.
    #[serde(default)]
    pub scenario_path: Option<PathBuf>,

    /// Where the final `GameState` is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turns: default_turns(),
            scenario_path: None,
            output_path: default_output_path(),
        }
    }
}

const fn default_rows() -> usize {
    gridworld_types::DEFAULT_ROWS
}

const fn default_cols() -> usize {
    gridworld_types::DEFAULT_COLS
}

fn default_llm_backend() -> String {
    "openai".to_owned()
}

fn default_api_url() -> String {
    "https://openrouter.ai/api/v1".to_owned()
}

fn default_model() -> String {
    "google/gemini-2.5-flash".to_owned()
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_retry_base_delay_ms() -> u64 {
    250
}

const fn default_request_timeout_ms() -> u64 {
    60_000
}

const fn default_max_concurrent_calls() -> usize {
    16
}

const fn default_max_tokens() -> u32 {
    2000
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_turns() -> u32 {
    1
}

fn default_output_path() -> PathBuf {
    PathBuf::from("gridworld-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_isolated(yaml: &str) -> GridworldConfig {
        let mut config: GridworldConfig = serde_yml::from_str(yaml).unwrap_or_default();
        config.apply_overrides_from(|_| None);
        config
    }

    #[test]
    fn default_config_is_valid() {
        let config = GridworldConfig::default();
        assert_eq!(config.world.rows, 15);
        assert_eq!(config.world.cols, 15);
        assert_eq!(config.turn.grouping, GroupingStrategy::PerCell);
        assert!(!config.turn.revalidate_after_resolution);
        assert_eq!(config.llm.api_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.llm.model, "google/gemini-2.5-flash");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.turns, 1);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  rows: 10
  cols: 12

turn:
  grouping: merged
  revalidate_after_resolution: true

llm:
  backend: "anthropic"
  api_url: "https://api.anthropic.com/v1"
  model: "claude-test"
  max_retries: 4
  retry_base_delay_ms: 100
  request_timeout_ms: 5000
  max_concurrent_calls: 4
  max_tokens: 512
  templates_dir: "prompts"

server:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
  json: true

session:
  turns: 5
  scenario_path: "start.json"
  output_path: "out.json"
"#;
        let config = parse_isolated(yaml);
        assert_eq!(config.world.rows, 10);
        assert_eq!(config.turn.grouping, GroupingStrategy::Merged);
        assert!(config.turn.revalidate_after_resolution);
        assert_eq!(config.llm.backend, "anthropic");
        assert_eq!(config.llm.max_concurrent_calls, 4);
        assert_eq!(config.llm.templates_dir, Some(PathBuf::from("prompts")));
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.logging.json);
        assert_eq!(config.session.turns, 5);
        assert_eq!(config.session.output_path, PathBuf::from("out.json"));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = parse_isolated("turn:\n  grouping: per_cell\n");
        assert_eq!(config.turn.grouping, GroupingStrategy::PerCell);
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(serde_yml::from_str::<GridworldConfig>("").is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = GridworldConfig::default();
        config.apply_overrides_from(|key| match key {
            "GRIDWORLD_MODEL" => Some("local/model".to_owned()),
            "GRIDWORLD_PORT" => Some("3000".to_owned()),
            _ => None,
        });
        assert_eq!(config.llm.model, "local/model");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.api_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn unparsable_port_is_ignored() {
        let mut config = GridworldConfig::default();
        config.apply_overrides_from(|key| (key == "GRIDWORLD_PORT").then(|| "abc".to_owned()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("gridworld.yaml");
        if path.exists() {
            let config = GridworldConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            assert_eq!(parse_isolated(&contents), GridworldConfig::default());
        }
    }
}
