use serde_json::json;

use super::client::{ChatConfig, ResponseFormat, Sampling};

const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in creating high-quality flashcards from provided text.
Generate concise, clear, and effective flashcards that capture key concepts and knowledge.
Each flashcard should have a front (question/prompt) and back (answer/explanation).
Focus on important facts, definitions, concepts, and relationships.";

const USER_PROMPT_HEADER: &str = "Generate flashcards from the following text:\n\n";

const RESPONSE_FORMAT_NAME: &str = "flashcards";

pub fn flashcard_chat_config(model: &str, sampling: Sampling) -> ChatConfig {
    ChatConfig {
        model: model.to_string(),
        sampling,
        system_message: SYSTEM_PROMPT.to_string(),
        response_format: ResponseFormat {
            name: RESPONSE_FORMAT_NAME.to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "flashcards": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "front": { "type": "string" },
                                "back": { "type": "string" }
                            },
                            "required": ["front", "back"]
                        }
                    }
                },
                "required": ["flashcards"]
            }),
        },
    }
}

pub fn flashcard_user_prompt(source_text: &str) -> String {
    format!("{USER_PROMPT_HEADER}{source_text}")
}
