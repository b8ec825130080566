use serde::{Deserialize, Serialize};

/// One timed caption line as delivered by the transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Offset from the start of the video, in seconds.
    pub start: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMeta {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl VideoMeta {
    /// Placeholder metadata when the video is unreachable.
    pub fn fallback(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Video ID: {id}"),
            description: String::new(),
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }
}

/// One answered follow-up question. Entries are append-only for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

/// Map-stage output for a single chunk, tagged with the chunk's position so
/// the reduce stage can restore transcript order.
#[derive(Debug, Clone)]
pub struct ChunkAnalysis {
    pub index: usize,
    pub text: String,
}
