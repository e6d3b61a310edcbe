use async_trait::async_trait;
use serde_json::json;

use super::client::{ChatClient, ChatRequest, ClientError};

/// Offline stand-in for the live client. Always answers with the same five
/// flashcards, whatever the prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockChatClient;

#[async_trait]
impl ChatClient for MockChatClient {
    async fn send_chat_message(&self, _request: &ChatRequest<'_>) -> Result<String, ClientError> {
        let response = json!({
            "flashcards": [
                {
                    "front": "What is Astro?",
                    "back": "A web framework for building content-driven websites."
                },
                {
                    "front": "What is Supabase?",
                    "back": "An open source Firebase alternative."
                },
                {
                    "front": "What is Tailwind CSS?",
                    "back": "A utility-first CSS framework."
                },
                {
                    "front": "What is React?",
                    "back": "A JavaScript library for building user interfaces."
                },
                {
                    "front": "What is TypeScript?",
                    "back": "A typed superset of JavaScript that compiles to plain JavaScript."
                }
            ]
        });
        Ok(response.to_string())
    }
}
