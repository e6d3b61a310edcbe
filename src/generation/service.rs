use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::hash::content_hash;
use super::store::GenerationStore;
use super::types::{FlashcardProposal, GenerationResult, NewGeneration, NewGenerationError};
use crate::error::GenerationError;
use crate::llm::{ChatClient, ChatConfig, ChatRequest, ClientError, flashcard_user_prompt};
use crate::utils::text_length;

/// Runs one text-to-flashcards generation per call and records the outcome.
///
/// Holds no per-call state, so a single instance can serve concurrent callers.
#[derive(Clone)]
pub struct GenerationService {
    client: Arc<dyn ChatClient>,
    store: Arc<dyn GenerationStore>,
    config: ChatConfig,
}

impl GenerationService {
    pub fn new(
        client: Arc<dyn ChatClient>,
        store: Arc<dyn GenerationStore>,
        config: ChatConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generates proposals for `source_text` on behalf of `user_id`.
    ///
    /// Exactly one record is written: a generation on success, an error log
    /// entry otherwise. The returned error is the one that caused the failure;
    /// a failure to write the error log is only reported through tracing.
    pub async fn generate_flashcards(
        &self,
        user_id: &str,
        source_text: &str,
    ) -> Result<GenerationResult, GenerationError> {
        let source_text_hash = content_hash(source_text);
        let source_text_length = text_length(source_text);

        match self
            .run(user_id, source_text, &source_text_hash, source_text_length)
            .await
        {
            Ok(result) => {
                info!(
                    generation_id = result.generation_id,
                    generated_count = result.generated_count,
                    hash = %source_text_hash,
                    "generated flashcards"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    code = err.error_code(),
                    hash = %source_text_hash,
                    "generation failed: {err}"
                );
                let record = NewGenerationError {
                    user_id: user_id.to_string(),
                    error_code: err.error_code().to_string(),
                    error_message: err.to_string(),
                    model: self.config.model.clone(),
                    source_text_hash,
                    source_text_length,
                };
                if let Err(log_err) = self.store.log_generation_error(&record).await {
                    error!("failed to record generation error: {log_err:#}");
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        user_id: &str,
        source_text: &str,
        source_text_hash: &str,
        source_text_length: i64,
    ) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();

        let proposals = self.call_ai_service(source_text).await?;

        let duration_ms = started.elapsed().as_millis() as i64;
        let generated_count = proposals.len();

        let generation_id = self
            .store
            .save_generation(&NewGeneration {
                user_id: user_id.to_string(),
                source_text_hash: source_text_hash.to_string(),
                source_text_length,
                generated_count: generated_count as i64,
                duration_ms,
                model: self.config.model.clone(),
            })
            .await
            .map_err(GenerationError::Persistence)?;

        Ok(GenerationResult {
            generation_id,
            flashcards_proposals: proposals,
            generated_count,
        })
    }

    async fn call_ai_service(
        &self,
        source_text: &str,
    ) -> Result<Vec<FlashcardProposal>, GenerationError> {
        let request =
            ChatRequest::new(&self.config).with_user_message(flashcard_user_prompt(source_text));
        debug!(model = %self.config.model, "requesting flashcards");

        let response = self
            .client
            .send_chat_message(&request)
            .await
            .map_err(|err| match err {
                ClientError::Api { message, code } => GenerationError::AiService { message, code },
                ClientError::Other(err) => GenerationError::Upstream(err),
            })?;

        parse_proposals(&response)
    }
}

/// Reads the `flashcards` array out of a model reply.
fn parse_proposals(response: &str) -> Result<Vec<FlashcardProposal>, GenerationError> {
    let data: Value =
        serde_json::from_str(response).map_err(|_| GenerationError::InvalidResponse)?;
    let cards = data
        .get("flashcards")
        .and_then(Value::as_array)
        .ok_or(GenerationError::InvalidResponse)?;

    cards
        .iter()
        .map(|card| {
            let front = card.get("front").and_then(Value::as_str);
            let back = card.get("back").and_then(Value::as_str);
            match (front, back) {
                (Some(front), Some(back)) => Ok(FlashcardProposal::ai_full(front, back)),
                // A malformed entry reports the same fixed format message as a missing array.
                _ => Err(GenerationError::InvalidResponse),
            }
        })
        .collect()
}
