pub mod hash;
pub mod service;
pub mod store;
pub mod types;

pub use hash::content_hash;
pub use service::GenerationService;
pub use store::GenerationStore;
pub use types::{
    FlashcardProposal, GenerationResult, NewGeneration, NewGenerationError, ProposalSource,
};
