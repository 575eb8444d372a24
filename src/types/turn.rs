use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Role;

/// Deserializes a field that may be absent or `null` into its default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One role-tagged message of the conversation.
///
/// This is the unit sent to the remote endpoint and written to transcripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Who authored the turn.
    pub role: Role,

    /// The text of the turn.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl Turn {
    /// Create a new `Turn`.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One entry of the conversation seed file.
///
/// A record carries inline `content`, a `file` reference to a prompt file, or
/// neither.  The file reference only applies to system records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawInputRecord {
    /// Who authored the turn.
    pub role: Role,

    /// Inline text of the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Prompt file name, relative to the prompts directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl RawInputRecord {
    /// Create a record with inline content.
    pub fn inline(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            file: None,
        }
    }

    /// Create a system record backed by a prompt file.
    pub fn system_file(file: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: None,
            file: Some(file.into()),
        }
    }

    /// Returns the prompt file to read for this record, if any.
    ///
    /// Only system records with a non-empty file name qualify.
    pub fn prompt_file(&self) -> Option<&str> {
        match (self.role, self.file.as_deref()) {
            (Role::System, Some(file)) if !file.is_empty() => Some(file),
            _ => None,
        }
    }

    /// Convert into a turn by copying the role and inline content.
    pub fn into_turn(self) -> Turn {
        Turn {
            role: self.role,
            content: self.content.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json, to_value};

    #[test]
    fn turn_wire_shape() {
        let turn = Turn::user("hello");
        assert_eq!(
            to_value(&turn).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }

    #[test]
    fn null_content_is_empty() {
        let turn: Turn = from_value(json!({"role": "assistant", "content": null})).unwrap();
        assert_eq!(turn, Turn::assistant(""));
    }

    #[test]
    fn record_with_file() {
        let record: RawInputRecord =
            from_value(json!({"role": "system", "file": "persona.txt"})).unwrap();
        assert_eq!(record, RawInputRecord::system_file("persona.txt"));
        assert_eq!(record.prompt_file(), Some("persona.txt"));
    }

    #[test]
    fn file_only_applies_to_system() {
        let record: RawInputRecord =
            from_value(json!({"role": "user", "content": "hi", "file": "x.txt"})).unwrap();
        assert_eq!(record.prompt_file(), None);
        assert_eq!(record.into_turn(), Turn::user("hi"));
    }

    #[test]
    fn empty_file_name_is_ignored() {
        let record: RawInputRecord =
            from_value(json!({"role": "system", "content": "inline", "file": ""})).unwrap();
        assert_eq!(record.prompt_file(), None);
    }

    #[test]
    fn record_without_content_becomes_empty_turn() {
        let record: RawInputRecord = from_value(json!({"role": "assistant"})).unwrap();
        assert_eq!(record.into_turn(), Turn::assistant(""));
    }
}
