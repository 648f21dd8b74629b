//! Conversation turn model

use serde::{Deserialize, Serialize};

/// Speaker role for a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Role name on the generateContent wire. The backend only accepts
    /// "user" and "model" inside `contents`, so the system instruction is
    /// carried as a user content.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::User | Self::System => "user",
            Self::Assistant => "model",
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// A system-instruction turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Turn::user("halo")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"halo"}"#);

        let turn: Turn = serde_json::from_str(r#"{"role":"system","content":"x"}"#).unwrap();
        assert_eq!(turn.role, Role::System);
    }

    #[test]
    fn wire_names_collapse_system_to_user() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::System.wire_name(), "user");
        assert_eq!(Role::Assistant.wire_name(), "model");
    }
}
