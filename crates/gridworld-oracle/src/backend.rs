//! LLM backend abstraction and implementations.
//!
//! Enum dispatch over the two supported wire formats: OpenAI-compatible
//! chat completions (OpenAI, OpenRouter, `DeepSeek`, Ollama) and the Anthropic
//! Messages API. Both talk HTTP via `reqwest`. The key travels with each call
//! because it belongs to the caller, not to the process.

use gridworld_core::config::LlmConfig;
use gridworld_core::oracle::{ApiKey, CallSite, OracleError};
use serde_json::{Map, Value, json};

use crate::error::LlmError;
use crate::prompt::RenderedPrompt;

/// Longest error body kept in [`OracleError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    /// Parse a configured backend name.
    pub fn parse(name: &str) -> Result<Self, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "openrouter" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(LlmError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    /// Sampling temperature, omitted from the request when `None`.
    pub temperature: Option<f32>,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Ask for a JSON object response where the backend supports it.
    pub json: bool,
}

impl CompletionParams {
    /// Parameters for `site`, falling back to `default_max_tokens`.
    pub fn for_site(site: CallSite, default_max_tokens: u32) -> Self {
        Self {
            temperature: site.temperature(),
            max_tokens: site.max_tokens().unwrap_or(default_max_tokens),
            json: site.expects_json(),
        }
    }
}

/// An LLM backend that turns a rendered prompt into response text.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Build the backend named in `config`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;
        let api_url = config.api_url.trim_end_matches('/').to_owned();
        let model = config.model.clone();
        Ok(match BackendType::parse(&config.backend)? {
            BackendType::OpenAi => Self::OpenAi(OpenAiBackend { client, api_url, model }),
            BackendType::Anthropic => Self::Anthropic(AnthropicBackend { client, api_url, model }),
        })
    }

    /// Send a prompt and return the response text.
    pub async fn complete(
        &self,
        credential: &ApiKey,
        prompt: &RenderedPrompt,
        params: CompletionParams,
    ) -> Result<String, OracleError> {
        match self {
            Self::OpenAi(backend) => backend.complete(credential, prompt, params).await,
            Self::Anthropic(backend) => backend.complete(credential, prompt, params).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl OpenAiBackend {
    async fn complete(
        &self,
        credential: &ApiKey,
        prompt: &RenderedPrompt,
        params: CompletionParams,
    ) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&openai_body(&self.model, prompt, params))
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("OpenAI request failed: {e}")))?;
        let json = read_json(response).await?;
        extract_openai_content(&json)
    }
}

/// Backend for the Anthropic Messages API.
///
/// Differs from `OpenAI` in three ways: `x-api-key` instead of a bearer
/// token, a top-level `system` field, and `content[0].text` in the response.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl AnthropicBackend {
    async fn complete(
        &self,
        credential: &ApiKey,
        prompt: &RenderedPrompt,
        params: CompletionParams,
    ) -> Result<String, OracleError> {
        let url = format!("{}/messages", self.api_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", credential.expose())
            .header("anthropic-version", "2023-06-01")
            .json(&anthropic_body(&self.model, prompt, params))
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("Anthropic request failed: {e}")))?;
        let json = read_json(response).await?;
        extract_anthropic_content(&json)
    }
}

/// Check the status and decode the body.
async fn read_json(response: reqwest::Response) -> Result<Value, OracleError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(OracleError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }
    response
        .json()
        .await
        .map_err(|e| OracleError::Transport(format!("response body was not JSON: {e}")))
}

fn openai_body(model: &str, prompt: &RenderedPrompt, params: CompletionParams) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": prompt.user}));

    let mut body = Map::new();
    body.insert("model".to_owned(), json!(model));
    body.insert("messages".to_owned(), Value::Array(messages));
    body.insert("max_tokens".to_owned(), json!(params.max_tokens));
    if let Some(temperature) = params.temperature {
        body.insert("temperature".to_owned(), json!(temperature));
    }
    if params.json {
        body.insert("response_format".to_owned(), json!({"type": "json_object"}));
    }
    Value::Object(body)
}

fn anthropic_body(model: &str, prompt: &RenderedPrompt, params: CompletionParams) -> Value {
    let mut body = Map::new();
    body.insert("model".to_owned(), json!(model));
    body.insert("max_tokens".to_owned(), json!(params.max_tokens));
    body.insert(
        "messages".to_owned(),
        json!([{"role": "user", "content": prompt.user}]),
    );
    if let Some(system) = &prompt.system {
        body.insert("system".to_owned(), json!(system));
    }
    if let Some(temperature) = params.temperature {
        body.insert("temperature".to_owned(), json!(temperature));
    }
    Value::Object(body)
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &Value) -> Result<String, OracleError> {
    non_empty(
        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str),
    )
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &Value) -> Result<String, OracleError> {
    non_empty(
        json.get("content")
            .and_then(|c| c.get(0))
            .and_then(|b| b.get("text"))
            .and_then(Value::as_str),
    )
}

fn non_empty(text: Option<&str>) -> Result<String, OracleError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_owned()),
        _ => Err(OracleError::Empty),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn prompt(system: Option<&str>) -> RenderedPrompt {
        RenderedPrompt {
            system: system.map(ToOwned::to_owned),
            user: "What happens next?".to_owned(),
        }
    }

    #[test]
    fn extract_openai_content_valid() {
        let json = json!({"choices": [{"message": {"content": "{\"changes\": []}"}}]});
        assert_eq!(extract_openai_content(&json).unwrap(), "{\"changes\": []}");
    }

    #[test]
    fn extract_openai_content_missing_or_blank() {
        assert_eq!(
            extract_openai_content(&json!({"error": "rate_limit"})),
            Err(OracleError::Empty)
        );
        let blank = json!({"choices": [{"message": {"content": "  "}}]});
        assert_eq!(extract_openai_content(&blank), Err(OracleError::Empty));
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = json!({"content": [{"type": "text", "text": "The fox sleeps."}]});
        assert_eq!(extract_anthropic_content(&json).unwrap(), "The fox sleeps.");
        assert_eq!(
            extract_anthropic_content(&json!({"content": []})),
            Err(OracleError::Empty)
        );
    }

    #[test]
    fn openai_body_for_json_site() {
        let params = CompletionParams::for_site(CallSite::ResolveAgents, 1024);
        let body = openai_body("m", &prompt(Some("be exact")), params);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What happens next?");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 1024);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn openai_body_for_summary_omits_temperature_and_format() {
        let params = CompletionParams::for_site(CallSite::Summarize, 1024);
        let body = openai_body("m", &prompt(None), params);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("temperature").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn anthropic_body_puts_system_on_top() {
        let params = CompletionParams::for_site(CallSite::Scenario, 1024);
        let body = anthropic_body("m", &prompt(Some("game master")), params);
        assert_eq!(body["system"], "game master");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn backend_type_parsing() {
        assert_eq!(BackendType::parse("OpenRouter").unwrap(), BackendType::OpenAi);
        assert_eq!(BackendType::parse("claude").unwrap(), BackendType::Anthropic);
        assert!(BackendType::parse("carrier-pigeon").is_err());
    }

    #[test]
    fn from_config_dispatches_correctly() {
        let mut config = LlmConfig::default();
        assert_eq!(LlmBackend::from_config(&config).unwrap().name(), "openai-compatible");
        config.backend = "anthropic".to_owned();
        assert_eq!(LlmBackend::from_config(&config).unwrap().name(), "anthropic");
    }
}
