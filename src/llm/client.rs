use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
        }
    }
}

/// Named JSON schema the model output must conform to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: Value,
}

/// Everything about a chat request except the user message. Built once and
/// shared by every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub model: String,
    pub sampling: Sampling,
    pub system_message: String,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub config: &'a ChatConfig,
    pub user_message: String,
}

impl<'a> ChatRequest<'a> {
    pub fn new(config: &'a ChatConfig) -> Self {
        Self {
            config,
            user_message: String::new(),
        }
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = message.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Failure reported by the AI service itself.
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    pub fn api(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Api {
            message: message.into(),
            code,
        }
    }
}

/// A chat-completion backend. Returns the raw text of the model reply.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_chat_message(&self, request: &ChatRequest<'_>) -> Result<String, ClientError>;
}
