//! Konspekt Core Library
//!
//! Core functionality for fetching YouTube captions and producing
//! comprehensive summaries through a chunked map-reduce over an AI text
//! generation backend, with a single-call fast path and follow-up
//! question answering.

pub mod cache;
pub mod error;
pub mod export;
pub mod format;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod segment;
pub mod session;
pub mod transcript;
pub mod types;
pub mod url;

// Re-export commonly used items at crate root
pub use cache::{
    get_cache_dir, get_root_cache_dir, get_summary_path, get_transcript_path, load_segments,
    load_summary, save_segments, save_summary,
};
pub use error::{KonspektError, Result};
pub use export::markdown_document;
pub use format::{format_timestamp, format_transcript};
pub use generate::{Generator, HttpGenerator, RetryPolicy, normalize_output};
pub use pipeline::{
    NoProgress, PipelineOptions, Progress, analyze_chunks, fast_summarize, summarize_transcript,
    synthesize,
};
pub use provider::{Provider, ProviderConfig};
pub use segment::{chunk_text, split_sentences};
pub use session::Session;
pub use transcript::{TranscriptSource, YtDlpSource, fetch_metadata};
pub use types::{ChunkAnalysis, QaEntry, TranscriptSegment, VideoMeta};
pub use url::extract_video_id;
