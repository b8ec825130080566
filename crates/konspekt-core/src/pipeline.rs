use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::warn;

use crate::{
    error::{KonspektError, Result},
    generate::Generator,
    prompts,
    segment::chunk_text,
    types::ChunkAnalysis,
};

/// Tuning knobs for the detailed summarization path.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    /// Soft upper bound on chunk size, in characters.
    pub max_chunk_len: usize,
    /// Maximum number of in-flight generation calls during the map stage.
    pub workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_chunk_len: 3000,
            workers: 3,
        }
    }
}

/// Observer for map-stage completion. Called once per resolved chunk, in
/// completion order; `done` only ever grows.
pub trait Progress: Send + Sync {
    fn completed(&self, done: usize, total: usize);
}

/// Progress sink that ignores all updates.
pub struct NoProgress;

impl Progress for NoProgress {
    fn completed(&self, _done: usize, _total: usize) {}
}

/// Map stage: analyze every chunk independently with at most
/// `options.workers` generation calls in flight.
///
/// A failed chunk is dropped from the aggregate rather than aborting the
/// batch. Whatever the completion order, the returned analyses are sorted
/// back to chunk-index order; dropping the future aborts in-flight calls.
pub async fn analyze_chunks(
    generator: Arc<dyn Generator>,
    chunks: Vec<String>,
    options: &PipelineOptions,
    progress: &dyn Progress,
) -> Vec<ChunkAnalysis> {
    let total = chunks.len();
    if total == 0 {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut tasks = JoinSet::new();
    for (index, chunk) in chunks.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        index,
                        Err(KonspektError::Generation {
                            reason: "worker pool closed".to_string(),
                        }),
                    );
                }
            };
            let result = generator.generate(&chunk, prompts::CHUNK_INSTRUCTION).await;
            (index, result)
        });
    }

    let mut analyses = Vec::with_capacity(total);
    let mut done = 0;
    while let Some(joined) = tasks.join_next().await {
        done += 1;
        progress.completed(done, total);
        match joined {
            Ok((index, Ok(text))) => analyses.push(ChunkAnalysis { index, text }),
            Ok((index, Err(error))) => warn!(chunk = index, %error, "chunk analysis dropped"),
            Err(error) => warn!(%error, "chunk task failed to run"),
        }
    }

    analyses.sort_by_key(|analysis| analysis.index);
    analyses
}

/// Reduce stage: join the analyses with blank lines, in chunk order, and
/// issue the single synthesis call.
pub async fn synthesize(
    generator: &dyn Generator,
    analyses: &[ChunkAnalysis],
    instruction: &str,
) -> Result<String> {
    if analyses.is_empty() {
        return Err(KonspektError::EmptyInput);
    }
    let combined = analyses
        .iter()
        .map(|analysis| analysis.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    generator.generate(&combined, instruction).await
}

/// Fast path: one generation call over the transcript, or over the fallback
/// text when the transcript is empty. Never touches the segmenter.
pub async fn fast_summarize(
    generator: &dyn Generator,
    primary: &str,
    fallback: &str,
    instruction: &str,
) -> Result<String> {
    let context = if !primary.trim().is_empty() {
        primary
    } else if !fallback.trim().is_empty() {
        fallback
    } else {
        prompts::NO_SOURCE_CONTEXT
    };
    generator.generate(context, instruction).await
}

/// Detailed path: segment the transcript, run the map stage, then synthesize
/// one comprehensive summary.
pub async fn summarize_transcript(
    generator: Arc<dyn Generator>,
    transcript: &str,
    options: &PipelineOptions,
    progress: &dyn Progress,
) -> Result<String> {
    let chunks = chunk_text(transcript, options.max_chunk_len);
    let analyses = analyze_chunks(Arc::clone(&generator), chunks, options, progress).await;
    synthesize(generator.as_ref(), &analyses, prompts::FINAL_INSTRUCTION).await
}
