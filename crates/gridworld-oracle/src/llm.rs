//! The production [`Oracle`]: prompt rendering, a concurrency limit,
//! per-attempt timeouts and bounded retry with jittered exponential backoff.
//!
//! Only transport-level failures are retried (see
//! [`OracleError::is_retryable`]). A response that arrives but cannot be
//! parsed is the caller's problem and falls back immediately.

use std::time::Duration;

use gridworld_core::config::LlmConfig;
use gridworld_core::oracle::{ApiKey, Oracle, OracleError, OracleRequest};
use rand::Rng;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::backend::{CompletionParams, LlmBackend};
use crate::error::LlmError;
use crate::prompt::{PromptEngine, RenderedPrompt};

/// Upper bound on the backoff exponent.
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// An oracle backed by a remote language model.
pub struct LlmOracle {
    backend: LlmBackend,
    prompts: PromptEngine,
    limiter: Semaphore,
    max_retries: u32,
    retry_base_delay_ms: u64,
    request_timeout: Duration,
    default_max_tokens: u32,
}

impl LlmOracle {
    /// Build the oracle described by `config`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.max_concurrent_calls == 0 {
            return Err(LlmError::Config("max_concurrent_calls must be at least 1".to_owned()));
        }
        let prompts = match &config.templates_dir {
            Some(dir) => PromptEngine::with_overrides(dir)?,
            None => PromptEngine::builtin()?,
        };
        Ok(Self {
            backend: LlmBackend::from_config(config)?,
            prompts,
            limiter: Semaphore::new(config.max_concurrent_calls),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            default_max_tokens: config.max_tokens,
        })
    }

    /// Name of the backend in use.
    pub const fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// One attempt: wait for a slot, then call the backend under the timeout.
    async fn attempt(
        &self,
        credential: &ApiKey,
        prompt: &RenderedPrompt,
        params: CompletionParams,
    ) -> Result<String, OracleError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| OracleError::Transport(format!("call limiter closed: {e}")))?;
        match timeout(self.request_timeout, self.backend.complete(credential, prompt, params)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                timeout_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

impl Oracle for LlmOracle {
    fn request(
        &self,
        credential: &ApiKey,
        request: OracleRequest,
    ) -> impl Future<Output = Result<String, OracleError>> + Send {
        async move {
            let site = request.site;
            let prompt = self
                .prompts
                .render(site, &request.context)
                .map_err(|e| OracleError::Prompt(e.to_string()))?;
            let params = CompletionParams::for_site(site, self.default_max_tokens);

            let mut attempt: u32 = 0;
            loop {
                match self.attempt(credential, &prompt, params).await {
                    Ok(text) => {
                        debug!(
                            site = %site,
                            attempt,
                            chars = text.len(),
                            "oracle call succeeded"
                        );
                        return Ok(text);
                    }
                    Err(e) if e.is_retryable() && attempt < self.max_retries => {
                        let delay = backoff_delay(self.retry_base_delay_ms, attempt);
                        warn!(
                            site = %site,
                            attempt,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %e,
                            "oracle call failed, retrying"
                        );
                        sleep(delay).await;
                        attempt = attempt.saturating_add(1);
                    }
                    Err(e) => {
                        warn!(site = %site, attempt, error = %e, "oracle call failed");
                        return Err(e);
                    }
                }
            }
        }
    }
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt` plus up to
/// `base` of random jitter.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2_u64.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT));
    let jitter = rand::rng().random_range(0..=base_ms);
    Duration::from_millis(base_ms.saturating_mul(factor).saturating_add(jitter))
}
