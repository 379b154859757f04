//! Remote chat endpoint client
//!
//! One POST per submitted message. The endpoint answers with a JSON
//! object carrying a `message` field; a missing or blank `message` is
//! a failure no matter what the `error` field says.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Endpoint used when the config does not override it.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/chat";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat endpoint returned status {status}")]
    Api { status: u16 },

    #[error("chat endpoint returned no usable message")]
    EmptyReply,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn query(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&ChatRequest { message: prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status().as_u16(),
            });
        }

        let reply: ChatReply = response.json().await?;
        extract_reply(reply)
    }
}

fn extract_reply(reply: ChatReply) -> Result<String, LlmError> {
    match reply.message {
        Some(message) if !message.trim().is_empty() => Ok(message),
        _ => Err(LlmError::EmptyReply),
    }
}
