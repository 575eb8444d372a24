use serde::{Deserialize, Serialize};

use crate::types::turn::null_as_default;
use crate::types::{Turn, Usage};

/// A single candidate reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    /// The reply itself.
    pub message: Turn,
}

/// Body of a successful chat-completion response.
///
/// Providers send many more fields; only the ones the session uses are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Candidate replies, possibly empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,

    /// Token accounting for the call.
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: Usage,
}

impl ChatResponse {
    /// Consume the response, returning the first choice and the usage.
    pub fn into_first(self) -> (Option<Turn>, Usage) {
        let reply = self.choices.into_iter().next().map(|choice| choice.message);
        (reply, self.usage)
    }
}
