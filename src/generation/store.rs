use anyhow::Result;
use async_trait::async_trait;

use super::types::{NewGeneration, NewGenerationError};

/// Where generation outcomes are recorded. Both operations are single inserts.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Inserts a success record and returns its id.
    async fn save_generation(&self, generation: &NewGeneration) -> Result<i64>;

    async fn log_generation_error(&self, error: &NewGenerationError) -> Result<()>;
}
