use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{KonspektError, Result},
    generate::Generator,
    pipeline::{self, PipelineOptions, Progress},
    prompts,
    types::{QaEntry, VideoMeta},
};

/// Working state for one video. A new video id always gets a fresh session,
/// so results from a superseded in-flight run can never land in it.
pub struct Session {
    pub id: Uuid,
    pub video: VideoMeta,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    qa_history: Vec<QaEntry>,
}

impl Session {
    pub fn new(video: VideoMeta) -> Self {
        Self {
            id: Uuid::new_v4(),
            video,
            transcript: None,
            summary: None,
            qa_history: Vec::new(),
        }
    }

    pub fn qa_history(&self) -> &[QaEntry] {
        &self.qa_history
    }

    /// Detailed map-reduce summary. Requires a loaded transcript; replaces
    /// any previous summary on success.
    pub async fn summarize_detailed(
        &mut self,
        generator: Arc<dyn Generator>,
        options: &PipelineOptions,
        progress: &dyn Progress,
    ) -> Result<String> {
        let transcript = self.transcript.clone().ok_or_else(|| {
            KonspektError::TranscriptUnavailable {
                video_id: self.video.id.clone(),
                reason: "no transcript loaded".to_string(),
            }
        })?;
        let summary =
            pipeline::summarize_transcript(generator, &transcript, options, progress).await?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Single-call executive summary. Falls back to title plus description
    /// when no transcript is available; replaces any previous summary on
    /// success.
    pub async fn summarize_fast(&mut self, generator: &dyn Generator) -> Result<String> {
        let fallback = format!("{}\n{}", self.video.title, self.video.description);
        let summary = pipeline::fast_summarize(
            generator,
            self.transcript.as_deref().unwrap_or(""),
            &fallback,
            prompts::FAST_INSTRUCTION,
        )
        .await?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Answer a follow-up question against the stored summary and
    /// transcript. The QA history grows only when generation succeeds.
    pub async fn ask(&mut self, generator: &dyn Generator, question: &str) -> Result<String> {
        let context = prompts::qa_context(
            question,
            self.summary.as_deref().unwrap_or(""),
            self.transcript.as_deref().unwrap_or(""),
        );
        let answer = generator.generate(&context, prompts::QA_INSTRUCTION).await?;
        self.qa_history.push(QaEntry {
            question: question.to_string(),
            answer: answer.clone(),
        });
        Ok(answer)
    }
}
