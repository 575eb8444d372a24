use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a turn in the conversation.
///
/// The set is closed: a record naming any other role is rejected when the
/// conversation is loaded or a reply is decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,

    /// The human at the prompt.
    User,

    /// The remote model.
    Assistant,
}

impl Role {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json, to_value};

    #[test]
    fn role_wire_names() {
        assert_eq!(to_value(Role::System).unwrap(), json!("system"));
        assert_eq!(to_value(Role::User).unwrap(), json!("user"));
        assert_eq!(to_value(Role::Assistant).unwrap(), json!("assistant"));
    }

    #[test]
    fn role_rejects_unknown() {
        assert!(from_value::<Role>(json!("tool")).is_err());
        assert!(from_value::<Role>(json!("User")).is_err());
    }

    #[test]
    fn role_display_matches_wire_name() {
        for role in [Role::System, Role::User, Role::Assistant] {
            assert_eq!(to_value(role).unwrap(), json!(role.to_string()));
        }
    }
}
