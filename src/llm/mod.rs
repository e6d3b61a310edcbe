pub mod client;
pub mod mock;
pub mod openrouter;
pub mod prompt;
pub mod secrets;

pub use client::{ChatClient, ChatConfig, ChatRequest, ClientError, ResponseFormat, Sampling};
pub use mock::MockChatClient;
pub use openrouter::OpenRouterClient;
pub use prompt::{flashcard_chat_config, flashcard_user_prompt};
pub use secrets::{clear_api_key, resolve_api_key, store_api_key};
