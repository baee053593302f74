//! Turn Summarizer.

use serde_json::json;
use tracing::warn;

use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};

/// Description used when the summary call fails or returns nothing.
pub const SUMMARY_FALLBACK: &str = "No changes occurred this turn.";

/// Narrate a turn from its ordered explanations in one oracle call.
///
/// The response is used verbatim apart from trimming.
pub async fn summarize_turn<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    world_description: &str,
    explanations: &[String],
) -> String {
    let request = OracleRequest::new(
        CallSite::Summarize,
        json!({
            "worldDescription": world_description,
            "explanations": explanations,
        }),
    );
    match oracle.request(credential, request).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
        Ok(_) => {
            warn!(site = %CallSite::Summarize, "empty summary, using fallback");
            SUMMARY_FALLBACK.to_owned()
        }
        Err(e) => {
            warn!(
                site = %CallSite::Summarize,
                error = %e,
                "oracle call failed, using fallback summary"
            );
            SUMMARY_FALLBACK.to_owned()
        }
    }
}
