//! LLM-backed oracle for the Gridworld turn engine.
//!
//! Implements [`gridworld_core::oracle::Oracle`] over HTTP. The caller's API
//! key is forwarded on every request and never stored.
//!
//! # Modules
//!
//! - [`backend`] -- OpenAI-compatible and Anthropic wire formats.
//! - [`error`] -- Setup errors.
//! - [`llm`] -- [`LlmOracle`] with concurrency limit, timeouts and retry.
//! - [`prompt`] -- Built-in `minijinja` prompt templates per call site.
//!
//! [`LlmOracle`]: llm::LlmOracle

pub mod backend;
pub mod error;
pub mod llm;
pub mod prompt;

pub use error::LlmError;
pub use llm::LlmOracle;
