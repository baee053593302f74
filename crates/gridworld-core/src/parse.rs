//! Parsing untrusted oracle payloads into typed values.
//!
//! The oracle is asked for JSON but often wraps it in prose or a markdown
//! fence, or leaves a trailing comma behind. [`parse_payload`] tries a few
//! recovery strategies before giving up with a [`ParseError`]. Callers never
//! propagate the error; they log it and substitute their fallback.

use gridworld_types::{Grid, ProposalResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Why a payload could not be turned into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing but whitespace.
    #[error("empty payload")]
    Empty,

    /// Every strategy failed. Carries the error from the direct attempt.
    #[error("payload does not match the expected schema: {0}")]
    Invalid(String),
}

/// The environmental call site's response envelope.
///
/// A missing `environmentalActions` key means no environmental actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalPayload {
    /// Zero or more proposals.
    #[serde(default)]
    pub environmental_actions: Vec<ProposalResult>,
}

/// The scenario call site's response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPayload {
    /// The generated grid. Shape is checked separately.
    pub grid: Grid,
    /// The generated setting.
    pub world_description: String,
}

/// Parse `raw` as `T`.
///
/// Strategies, in order:
/// 1. Direct deserialization
/// 2. The body of a markdown code block
/// 3. Trailing commas stripped
/// 4. Code block body with trailing commas stripped
/// 5. The outermost `{ ... }` span
pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    // Strategy 1: direct parse
    let direct = match serde_json::from_str::<T>(trimmed) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => e,
    };

    // Strategy 2: extract from markdown code block
    let block = extract_json_from_codeblock(trimmed);
    if let Some(json_str) = block
        && let Ok(parsed) = serde_json::from_str::<T>(json_str)
    {
        return Ok(parsed);
    }

    // Strategy 3: strip trailing commas and retry
    if let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(trimmed)) {
        return Ok(parsed);
    }

    // Strategy 4: code block then strip commas
    if let Some(json_str) = block
        && let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(json_str))
    {
        return Ok(parsed);
    }

    // Strategy 5: outermost object embedded in prose
    if let Some(object) = extract_outer_object(trimmed)
        && let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(object))
    {
        return Ok(parsed);
    }

    Err(ParseError::Invalid(direct.to_string()))
}

/// Extract JSON from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let fence = text.find("```")?;
    let after_fence = text.get(fence.checked_add(3)?..)?;
    // Skip the info string (e.g. `json`) up to the end of the fence line.
    let body = after_fence
        .find('\n')
        .and_then(|nl| after_fence.get(nl.checked_add(1)?..))
        .unwrap_or(after_fence);
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets.
///
/// Commas inside string literals are left alone.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            ',' => {
                let rest = chars.clone().find(|n| !n.is_whitespace());
                if !matches!(rest, Some('}' | ']')) {
                    result.push(c);
                }
            }
            _ => result.push(c),
        }
    }

    result
}

/// The span from the first `{` to the last `}`.
fn extract_outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}
