use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::client::{ChatClient, ChatRequest, ClientError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Chat-completion client for the OpenRouter HTTP API.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    response_format: Value,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<Value>,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, api_base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::Other(anyhow!("OpenRouter API key is required")));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Checks the key against the `/key` endpoint.
    pub async fn healthcheck(&self) -> anyhow::Result<()> {
        self.http
            .get(format!("{}/key", self.api_base))
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()
            .context("Failed to validate API key with OpenRouter")?;
        Ok(())
    }

    fn completion_body<'a>(request: &'a ChatRequest<'_>) -> CompletionBody<'a> {
        let config = request.config;
        CompletionBody {
            model: &config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &config.system_message,
                },
                Message {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: config.sampling.temperature,
            top_p: config.sampling.top_p,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": config.response_format.name,
                    "strict": true,
                    "schema": config.response_format.schema,
                }
            }),
        }
    }
}

fn error_from_body(body: &str) -> Option<ClientError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let code = envelope.error.code.map(|code| match code {
        Value::String(s) => s,
        other => other.to_string(),
    });
    Some(ClientError::api(envelope.error.message, code))
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn send_chat_message(&self, request: &ChatRequest<'_>) -> Result<String, ClientError> {
        let body = Self::completion_body(request);
        debug!(model = body.model, "sending chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ClientError::api("Request timed out", Some("TIMEOUT".to_string()))
                } else {
                    let err = anyhow::Error::new(err).context("Failed to reach OpenRouter");
                    ClientError::Other(err)
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read OpenRouter response")?;

        // OpenRouter reports some failures with a 200 status and an error body.
        if let Some(err) = error_from_body(&text) {
            return Err(match err {
                ClientError::Api {
                    message,
                    code: None,
                } if !status.is_success() => {
                    ClientError::api(message, Some(status.as_u16().to_string()))
                }
                err => err,
            });
        }

        if !status.is_success() {
            return Err(ClientError::api(
                format!("Unexpected response from OpenRouter: {text}"),
                Some(status.as_u16().to_string()),
            ));
        }

        let completion: CompletionResponse =
            serde_json::from_str(&text).context("Failed to parse OpenRouter response")?;

        completion
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ClientError::api("No content returned from model", None))
    }
}
