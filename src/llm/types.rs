//! Message types for LLM communication.
//!
//! Defines the chat message shape sent to completion backends.

/// Role of a message in a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System message providing context and instructions.
    System,
    /// User message (human input).
    User,
}

impl Role {
    /// Returns the role as a string for API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A single message in a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}
