use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Returned instead of an error when the service answers without any content.
pub const NO_RESPONSE: &str = "No response from Groq API.";

/// Failure of a single completion call. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The service answered with a non-success status.
    #[error("Groq API error: {body}")]
    Rejected { status: StatusCode, body: String },
    /// Connection, timeout or body read failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The success body was not the JSON shape we expect.
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct GroqMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: Option<GroqResponseMessage>,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Option<Vec<GroqChoice>>,
}

impl GroqResponse {
    fn into_answer(self) -> String {
        self.choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string())
    }
}

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl GroqClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: GROQ_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config, api_key: &str) -> Self {
        Self::new(api_key)
            .with_endpoint(&config.endpoint)
            .with_model(&config.model)
            .with_max_tokens(config.max_tokens)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as the only user turn and returns the trimmed answer.
    ///
    /// A success response that carries no answer text yields [`NO_RESPONSE`] rather than an
    /// error. Nothing is retried.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GroqRequest {
            model: &self.model,
            messages: vec![GroqMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!(%status, "completion service rejected the request");
            return Err(CompletionError::Rejected { status, body });
        }

        let body = response.text().await?;
        let groq_response: GroqResponse = serde_json::from_str(&body)?;
        let answer = groq_response.into_answer();
        debug!(%status, answer_len = answer.len(), "completion received");
        Ok(answer)
    }
}
