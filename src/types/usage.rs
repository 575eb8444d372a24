use serde::{Deserialize, Serialize};

use crate::types::turn::null_as_default;

/// Token accounting reported with each reply.
///
/// Informational only; it is displayed per call and never accumulated.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens consumed by the request.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_tokens: u64,

    /// Tokens produced by the reply.
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_tokens: u64,
}

impl Usage {
    /// Create a new `Usage` with the given prompt and completion tokens.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json, to_value};

    #[test]
    fn usage_wire_shape() {
        let usage = Usage::new(50, 100);
        assert_eq!(
            to_value(usage).unwrap(),
            json!({
                "prompt_tokens": 50,
                "completion_tokens": 100
            })
        );
    }

    #[test]
    fn usage_missing_fields_default_to_zero() {
        let usage: Usage = from_value(json!({"prompt_tokens": 7})).unwrap();
        assert_eq!(usage, Usage::new(7, 0));
    }

    #[test]
    fn usage_null_fields_default_to_zero() {
        let usage: Usage =
            from_value(json!({"prompt_tokens": null, "completion_tokens": 3})).unwrap();
        assert_eq!(usage, Usage::new(0, 3));
    }
}
