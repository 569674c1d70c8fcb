//! Model endpoint client.
//!
//! The [`ModelClient`] trait decouples the update pipeline from the actual
//! endpoint; tests use scripted clients that return canned responses. The
//! production client speaks the OpenAI chat-completions protocol over a
//! blocking HTTP connection and is constructed per run; there is no global
//! state.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::io::config::ModelConfig;

/// Environment variables consulted for the API key, in order.
const API_KEY_VARS: [&str; 2] = ["SITEUP_API_KEY", "OPENAI_API_KEY"];
/// Environment variable overriding the configured base URL.
const BASE_URL_VAR: &str = "SITEUP_BASE_URL";

/// Abstraction over the completion endpoint.
pub trait ModelClient {
    /// Send one prompt and return the raw response text.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_output_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Build a client from config, reading the API key from the environment.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| {
            anyhow!(
                "no API key found: set {} or {}",
                API_KEY_VARS[0],
                API_KEY_VARS[1]
            )
        })?;
        let base_url = std::env::var(BASE_URL_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| config.base_url.clone());
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_output_tokens,
        };

        info!(prompt_bytes = prompt.len(), "sending completion request");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .context("send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            match status.as_u16() {
                401 | 403 => bail!("endpoint rejected credentials ({status}): {body}"),
                429 => bail!("endpoint rate limit or quota exhausted ({status}): {body}"),
                _ => bail!("endpoint returned {status}: {body}"),
            }
        }

        let parsed: ChatResponse = response.json().context("parse completion response")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("completion response contained no choices"))?;
        debug!(
            response_bytes = choice.message.content.len(),
            "received completion"
        );
        Ok(choice.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
