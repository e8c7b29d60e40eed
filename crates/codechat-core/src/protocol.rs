//! Messages exchanged between a display surface and the message bridge.
//!
//! Both directions are plain JSON objects tagged by `command`, so a webview or any other
//! surface can speak the protocol with `serde_json` alone.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Surface-assigned number pairing an `ask` with its `response`.
pub type RequestId = u64;

/// Surface → bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ChatRequest {
    /// Submit a prompt. Empty text is still a valid prompt.
    Ask {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RequestId>,
    },
    /// Any command the bridge does not understand.
    #[serde(other)]
    Unknown,
}

impl ChatRequest {
    pub fn ask(text: &str, id: Option<RequestId>) -> Self {
        ChatRequest::Ask {
            text: text.to_string(),
            id,
        }
    }
}

/// Bridge → surface. `text` is the answer, or the failure prefixed with `"Error: "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename = "response")]
pub struct ChatResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl ChatResponse {
    pub fn answer(text: String, id: Option<RequestId>) -> Self {
        Self { text, id }
    }

    pub fn error(err: impl Display, id: Option<RequestId>) -> Self {
        Self {
            text: format!("Error: {}", err),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ask_parses_with_and_without_id() {
        let plain: ChatRequest =
            serde_json::from_value(json!({ "command": "ask", "text": "What is a mutex?" })).unwrap();
        assert_eq!(plain, ChatRequest::ask("What is a mutex?", None));

        let tagged: ChatRequest =
            serde_json::from_value(json!({ "command": "ask", "text": "", "id": 7 })).unwrap();
        assert_eq!(tagged, ChatRequest::ask("", Some(7)));
    }

    #[test]
    fn other_commands_are_unknown() {
        let request: ChatRequest =
            serde_json::from_value(json!({ "command": "clear", "text": "ignored" })).unwrap();
        assert_eq!(request, ChatRequest::Unknown);
    }

    #[test]
    fn response_shape() {
        let response = ChatResponse::answer("A mutual-exclusion lock.".to_string(), None);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "command": "response", "text": "A mutual-exclusion lock." })
        );

        let response = ChatResponse::error("connection refused", Some(3));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "command": "response", "text": "Error: connection refused", "id": 3 })
        );
    }
}
