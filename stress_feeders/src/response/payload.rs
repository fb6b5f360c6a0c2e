//! Agent response payloads and category tags.

use serde::{Deserialize, Serialize};

/// A chat response as delivered by the conversational agent.
///
/// Only `action` matters for stress; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub action: Option<String>,
}

impl ChatResponse {
    /// Parse a JSON payload from the agent.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// The category tag carried by this response, if any.
    pub fn category(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// How a response moves stress beyond the base cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCategory {
    /// Matched the reduce tag.
    Positive,
    /// Matched the increase tag.
    Negative,
    /// Missing, empty, or any other tag.
    Neutral,
}

/// Compare a raw tag against a configured one, ignoring surrounding
/// whitespace and ASCII case. Empty tags never match.
pub fn tag_matches(raw: &str, expected: &str) -> bool {
    let raw = raw.trim();
    !raw.is_empty() && raw.eq_ignore_ascii_case(expected.trim())
}
