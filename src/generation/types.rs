use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalSource {
    #[serde(rename = "ai-full")]
    AiFull,
}

/// A generated flashcard awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardProposal {
    pub front: String,
    pub back: String,
    pub source: ProposalSource,
}

impl FlashcardProposal {
    pub fn ai_full(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            source: ProposalSource::AiFull,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub generation_id: i64,
    pub flashcards_proposals: Vec<FlashcardProposal>,
    pub generated_count: usize,
}

/// Metadata of a successful generation, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneration {
    pub user_id: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
    pub generated_count: i64,
    pub duration_ms: i64,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGenerationError {
    pub user_id: String,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn proposal_source_serializes_as_tag() {
        let proposal = FlashcardProposal::ai_full("Q1", "A1");
        assert_eq!(
            serde_json::to_value(&proposal).unwrap(),
            json!({ "front": "Q1", "back": "A1", "source": "ai-full" })
        );
    }

    #[test]
    fn result_uses_snake_case_fields() {
        let result = GenerationResult {
            generation_id: 7,
            flashcards_proposals: vec![],
            generated_count: 0,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["generation_id"], 7);
        assert_eq!(value["generated_count"], 0);
        assert!(value["flashcards_proposals"].is_array());
    }
}
