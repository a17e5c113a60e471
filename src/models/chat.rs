use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// A single entry of the conversation log. Never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingCredential,
    Loading,
    ErrorDisplayed,
}

/// Read-only snapshot of a conversation, handed to whatever renders it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub awaiting_credential: bool,
}

impl ConversationState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.awaiting_credential {
            Phase::AwaitingCredential
        } else if self.error.is_some() {
            Phase::ErrorDisplayed
        } else {
            Phase::Idle
        }
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Suggestion chips stay visible until the user has sent something.
    pub fn shows_suggestions(&self) -> bool {
        !self.messages.iter().any(|m| m.role == Role::User)
    }

    /// Feature cards are only shown while the greeting is the sole message.
    pub fn shows_feature_highlights(&self) -> bool {
        self.messages.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(messages: Vec<ChatMessage>) -> ConversationState {
        ConversationState {
            messages,
            is_loading: false,
            error: None,
            awaiting_credential: false,
        }
    }

    #[test]
    fn test_phase_priority() {
        let mut s = state(vec![ChatMessage::assistant("hi")]);
        assert_eq!(s.phase(), Phase::Idle);

        s.error = Some("boom".to_string());
        assert_eq!(s.phase(), Phase::ErrorDisplayed);

        s.awaiting_credential = true;
        assert_eq!(s.phase(), Phase::AwaitingCredential);

        s.is_loading = true;
        assert_eq!(s.phase(), Phase::Loading);
    }

    #[test]
    fn test_visibility_rules() {
        let greeting_only = state(vec![ChatMessage::assistant("hi")]);
        assert!(greeting_only.shows_suggestions());
        assert!(greeting_only.shows_feature_highlights());

        let after_send = state(vec![ChatMessage::assistant("hi"), ChatMessage::user("market?")]);
        assert!(!after_send.shows_suggestions());
        assert!(!after_send.shows_feature_highlights());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("x")).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
    }
}
