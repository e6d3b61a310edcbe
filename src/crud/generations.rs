use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;

use crate::generation::{GenerationStore, NewGeneration, NewGenerationError};

use super::DB;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GenerationRow {
    pub id: i64,
    pub user_id: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
    pub generated_count: i64,
    pub generation_duration: i64,
    pub model: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GenerationErrorRow {
    pub id: i64,
    pub user_id: String,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl GenerationStore for DB {
    async fn save_generation(&self, generation: &NewGeneration) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
        INSERT INTO generations (
            user_id,
            source_text_hash,
            source_text_length,
            generated_count,
            generation_duration,
            model,
            created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(&generation.user_id)
        .bind(&generation.source_text_hash)
        .bind(generation.source_text_length)
        .bind(generation.generated_count)
        .bind(generation.duration_ms)
        .bind(&generation.model)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn log_generation_error(&self, error: &NewGenerationError) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
        INSERT INTO generation_error_logs (
            user_id,
            error_code,
            error_message,
            model,
            source_text_hash,
            source_text_length,
            created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(&error.user_id)
        .bind(&error.error_code)
        .bind(&error.error_message)
        .bind(&error.model)
        .bind(&error.source_text_hash)
        .bind(error.source_text_length)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl DB {
    /// Most recent generations for `user_id`, newest first.
    pub async fn recent_generations(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<GenerationRow>> {
        let mut rows = sqlx::query_as::<_, GenerationRow>(
            r#"
            SELECT
                id,
                user_id,
                source_text_hash,
                source_text_length,
                generated_count,
                generation_duration,
                model,
                created_at
            FROM generations
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch(&self.pool);

        let mut generations = Vec::new();
        while let Some(row) = rows.try_next().await? {
            generations.push(row);
        }
        Ok(generations)
    }

    pub async fn recent_generation_errors(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<GenerationErrorRow>> {
        let mut rows = sqlx::query_as::<_, GenerationErrorRow>(
            r#"
            SELECT
                id,
                user_id,
                error_code,
                error_message,
                model,
                source_text_hash,
                source_text_length,
                created_at
            FROM generation_error_logs
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch(&self.pool);

        let mut errors = Vec::new();
        while let Some(row) = rows.try_next().await? {
            errors.push(row);
        }
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::generation::{GenerationService, content_hash};
    use crate::llm::{MockChatClient, Sampling, flashcard_chat_config};

    fn new_generation(user_id: &str, hash: &str, count: i64) -> NewGeneration {
        NewGeneration {
            user_id: user_id.to_string(),
            source_text_hash: hash.to_string(),
            source_text_length: 42,
            generated_count: count,
            duration_ms: 1200,
            model: "openai/gpt-4o-mini".to_string(),
        }
    }

    #[tokio::test]
    async fn save_generation_assigns_increasing_ids() {
        let db = DB::new_in_memory().await.unwrap();

        let first = db
            .save_generation(&new_generation("u1", "h1", 3))
            .await
            .unwrap();
        let second = db
            .save_generation(&new_generation("u1", "h2", 5))
            .await
            .unwrap();
        assert!(second > first);

        let rows = db.recent_generations("u1", 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second);
        assert_eq!(rows[0].source_text_hash, "h2");
        assert_eq!(rows[0].generated_count, 5);
        assert_eq!(rows[0].generation_duration, 1200);
        assert_eq!(rows[1].source_text_length, 42);
    }

    #[tokio::test]
    async fn history_is_scoped_by_user_and_limited() {
        let db = DB::new_in_memory().await.unwrap();
        for i in 0..3 {
            db.save_generation(&new_generation("u1", &format!("h{i}"), i))
                .await
                .unwrap();
        }
        db.save_generation(&new_generation("u2", "other", 1))
            .await
            .unwrap();

        let rows = db.recent_generations("u1", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.user_id == "u1"));
        assert_eq!(rows[0].source_text_hash, "h2");

        assert_eq!(db.recent_generations("u3", 10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn error_log_round_trip() {
        let db = DB::new_in_memory().await.unwrap();
        db.log_generation_error(&NewGenerationError {
            user_id: "u1".to_string(),
            error_code: "ValidationError".to_string(),
            error_message: "Invalid response format: missing flashcards array".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            source_text_hash: "abc".to_string(),
            source_text_length: 12,
        })
        .await
        .unwrap();

        let errors = db.recent_generation_errors("u1", 10).await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_code, "ValidationError");
        assert_eq!(errors[0].source_text_length, 12);
        assert!(db.recent_generations("u1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pipeline_writes_one_generation_record() {
        let db = Arc::new(DB::new_in_memory().await.unwrap());
        let service = GenerationService::new(
            Arc::new(MockChatClient),
            db.clone(),
            flashcard_chat_config("openai/gpt-4o-mini", Sampling::default()),
        );

        let source_text = "Astro, Supabase and friends.";
        let result = service
            .generate_flashcards("demo", source_text)
            .await
            .unwrap();

        let rows = db.recent_generations("demo", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, result.generation_id);
        assert_eq!(rows[0].generated_count, 5);
        assert_eq!(rows[0].source_text_hash, content_hash(source_text));
        assert!(db.recent_generation_errors("demo", 10).await.unwrap().is_empty());
    }
}
