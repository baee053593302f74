//! The oracle contract.
//!
//! The oracle turns a natural-language context into free text or a JSON
//! payload. Every call site in the turn pipeline shares the one [`Oracle`]
//! trait and differs only in its [`CallSite`] and context. Oracle output is
//! untrusted: callers parse it with [`crate::parse`] and substitute a
//! fallback on any failure.

use core::fmt;

use serde::Serialize;

/// The places in the pipeline that consult the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallSite {
    /// Narrate what one agent does this turn (free text).
    AgentAction,
    /// Translate one narrated action into a proposal (JSON).
    TranslateAction,
    /// Propose changes by non-agent actors (JSON).
    Environmental,
    /// Reconcile one conflict group into a single proposal (JSON).
    Adjudicate,
    /// Fix duplicated and missing agents (JSON).
    ResolveAgents,
    /// Narrate the turn from its explanations (free text).
    Summarize,
    /// Tell the whole session as a story (free text).
    Story,
    /// Build a new scenario grid (JSON).
    Scenario,
}

impl CallSite {
    /// Every call site, in pipeline order.
    pub const ALL: [Self; 8] = [
        Self::AgentAction,
        Self::TranslateAction,
        Self::Environmental,
        Self::Adjudicate,
        Self::ResolveAgents,
        Self::Summarize,
        Self::Story,
        Self::Scenario,
    ];

    /// Stable name, also the prompt template stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgentAction => "agent_action",
            Self::TranslateAction => "translate_action",
            Self::Environmental => "environmental",
            Self::Adjudicate => "adjudicate",
            Self::ResolveAgents => "resolve_agents",
            Self::Summarize => "summarize",
            Self::Story => "story",
            Self::Scenario => "scenario",
        }
    }

    /// Whether the response must be a JSON object.
    pub const fn expects_json(self) -> bool {
        matches!(
            self,
            Self::TranslateAction
                | Self::Environmental
                | Self::Adjudicate
                | Self::ResolveAgents
                | Self::Scenario
        )
    }

    /// Sampling temperature, `None` for the backend default.
    pub const fn temperature(self) -> Option<f32> {
        match self {
            Self::AgentAction | Self::TranslateAction | Self::Environmental | Self::Adjudicate => {
                Some(0.7)
            }
            Self::ResolveAgents => Some(0.3),
            Self::Story | Self::Scenario => Some(0.8),
            Self::Summarize => None,
        }
    }

    /// Completion token cap, `None` for the configured default.
    pub const fn max_tokens(self) -> Option<u32> {
        match self {
            Self::AgentAction | Self::Story => Some(1000),
            Self::Scenario => Some(2000),
            _ => None,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One oracle call: where it comes from and what it should know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleRequest {
    /// The requesting call site.
    pub site: CallSite,
    /// Template context. Keys are camelCase.
    pub context: serde_json::Value,
}

impl OracleRequest {
    /// Build a request.
    pub const fn new(site: CallSite, context: serde_json::Value) -> Self {
        Self { site, context }
    }
}

/// The caller-supplied credential, forwarded verbatim to the endpoint.
///
/// Construction fails for blank input so that an absent key is refused
/// before any oracle call is made. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, or `None` when it is empty or whitespace.
    pub fn new(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_owned()))
        }
    }

    /// The raw key for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Failures while obtaining an oracle response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The request did not finish in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The per-attempt timeout.
        timeout_ms: u64,
    },

    /// The response carried no content.
    #[error("empty response")]
    Empty,

    /// The prompt could not be built.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// No response was scripted for this call site.
    #[error("no scripted response for {0}")]
    Unscripted(CallSite),
}

impl OracleError {
    /// Whether another attempt could succeed.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Empty | Self::Prompt(_) | Self::Unscripted(_) => false,
        }
    }
}

/// A source of generated text.
///
/// Implementations must be shareable across the concurrent calls of one
/// fan-out stage. The returned text is raw: JSON call sites may still wrap
/// their payload in prose or code fences.
pub trait Oracle: Send + Sync {
    /// Answer one request.
    fn request(
        &self,
        credential: &ApiKey,
        request: OracleRequest,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_refused() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
    }

    #[test]
    fn key_is_kept_verbatim() {
        let key = ApiKey::new(" sk-1 ").unwrap();
        assert_eq!(key.expose(), " sk-1 ");
    }

    #[test]
    fn key_is_not_printed() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{key:?}"), "Some(ApiKey(***))");
    }

    #[test]
    fn json_sites() {
        let json: Vec<CallSite> = CallSite::ALL
            .into_iter()
            .filter(|s| s.expects_json())
            .collect();
        assert_eq!(
            json,
            vec![
                CallSite::TranslateAction,
                CallSite::Environmental,
                CallSite::Adjudicate,
                CallSite::ResolveAgents,
                CallSite::Scenario,
            ]
        );
    }

    #[test]
    fn resolver_runs_cooler() {
        assert_eq!(CallSite::ResolveAgents.temperature(), Some(0.3));
        assert_eq!(CallSite::Summarize.temperature(), None);
    }

    #[test]
    fn retryable_errors() {
        assert!(OracleError::Transport("reset".to_owned()).is_retryable());
        assert!(OracleError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(OracleError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(OracleError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!OracleError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!OracleError::Empty.is_retryable());
    }
}
