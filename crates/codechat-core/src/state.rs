//! UI-agnostic conversation types
//!
//! Shared by any display surface. The conversation only lives as long as the surface does.

use serde::{Deserialize, Serialize};

/// Shown by a surface when it opens, before anything was asked.
pub const GREETING: &str =
    "👋 Hi! I'm your AI code assistant. Ask me anything about code, errors, or best practices.";

/// A chat message in the conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}
