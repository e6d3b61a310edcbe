use std::hint::black_box;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use flashgen::generation::{
    GenerationService, GenerationStore, NewGeneration, NewGenerationError, content_hash,
};
use flashgen::llm::{MockChatClient, Sampling, flashcard_chat_config};
use tokio::runtime::Runtime;

struct DiscardStore;

#[async_trait]
impl GenerationStore for DiscardStore {
    async fn save_generation(&self, _generation: &NewGeneration) -> anyhow::Result<i64> {
        Ok(1)
    }

    async fn log_generation_error(&self, _error: &NewGenerationError) -> anyhow::Result<()> {
        Ok(())
    }
}

fn source_text() -> String {
    "Ownership is a set of rules that govern how a Rust program manages memory. ".repeat(200)
}

fn bench_content_hash(c: &mut Criterion) {
    let text = source_text();
    c.bench_function("content_hash", |b| b.iter(|| content_hash(black_box(&text))));
}

fn bench_generate_flashcards(c: &mut Criterion) {
    let rt = Runtime::new().expect("failed to build Tokio runtime");
    let service = GenerationService::new(
        Arc::new(MockChatClient),
        Arc::new(DiscardStore),
        flashcard_chat_config("openai/gpt-4o-mini", Sampling::default()),
    );
    let text = source_text();

    c.bench_function("generate_flashcards_mock", |b| {
        b.to_async(&rt).iter(|| async {
            let result = service
                .generate_flashcards("bench", &text)
                .await
                .expect("generation failed");
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_content_hash, bench_generate_flashcards);
criterion_main!(benches);
