use serde::Serialize;

use crate::types::Turn;

/// Body of a chat-completion request.
///
/// Borrows the conversation so that the running history is never copied
/// just to be serialized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    /// The model to use.
    pub model: &'a str,

    /// Sampling temperature.
    pub temperature: f32,

    /// The full, ordered conversation.
    pub messages: &'a [Turn],
}

impl<'a> ChatRequest<'a> {
    /// Create a new request.
    pub fn new(model: &'a str, temperature: f32, messages: &'a [Turn]) -> Self {
        Self {
            model,
            temperature,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_wire_shape() {
        let messages = vec![Turn::system("be brief"), Turn::user("ping")];
        let request = ChatRequest::new("org/model-7b", 0.5, &messages);
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "model": "org/model-7b",
                "temperature": 0.5,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "ping"}
                ]
            })
        );
    }

    #[test]
    fn request_with_empty_history() {
        let request = ChatRequest::new("m", 0.0, &[]);
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"model": "m", "temperature": 0.0, "messages": []})
        );
    }
}
