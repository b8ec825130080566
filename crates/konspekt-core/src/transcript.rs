use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{fs, process::Command, time::sleep};
use tracing::debug;

use crate::{
    error::{KonspektError, Result},
    generate::RetryPolicy,
    types::{TranscriptSegment, VideoMeta},
};

/// Source of timed caption segments for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Caption fetcher backed by yt-dlp's json3 subtitle output. Prefers
/// uploaded captions, falls back to auto-generated ones.
pub struct YtDlpSource {
    work_dir: PathBuf,
    retry: RetryPolicy,
}

impl YtDlpSource {
    pub fn new(work_dir: PathBuf, retry: RetryPolicy) -> Self {
        Self { work_dir, retry }
    }

    async fn fetch_once(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        fs::create_dir_all(&self.work_dir).await?;
        let output_template = self.work_dir.join("captions");
        let output = Command::new("yt-dlp")
            .arg(watch_url(video_id))
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg("en.*,en")
            .arg("--sub-format")
            .arg("json3")
            .arg("-o")
            .arg(&output_template)
            .output()
            .await?;

        if !output.status.success() {
            return Err(KonspektError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let Some(caption_file) = find_caption_file(&self.work_dir) else {
            return Err(KonspektError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: "no caption track found".to_string(),
            });
        };

        let raw = fs::read_to_string(&caption_file).await?;
        parse_json3(&raw)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let mut last_error = None;
        for attempt in 1..=self.retry.max_attempts.max(1) {
            if attempt > 1 {
                sleep(self.retry.delay_after(attempt - 1)).await;
            }
            match self.fetch_once(video_id).await {
                Ok(segments) => return Ok(segments),
                Err(error) => {
                    debug!(attempt, %error, "transcript fetch attempt failed");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or(KonspektError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: "no fetch attempts were made".to_string(),
        }))
    }
}

/// Fetch title and description with yt-dlp. Falls back to placeholder
/// metadata when the video is unreachable, never fails.
pub async fn fetch_metadata(video_id: &str) -> VideoMeta {
    let output = Command::new("yt-dlp")
        .arg(watch_url(video_id))
        .arg("--skip-download")
        .arg("--print")
        .arg("title")
        .arg("--print")
        .arg("description")
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let mut lines = stdout.lines();
            let title = lines.next().unwrap_or_default().trim().to_string();
            // --print emits one line per field; descriptions keep their own
            // line breaks, so everything after the title belongs to it.
            let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
            if title.is_empty() {
                VideoMeta::fallback(video_id)
            } else {
                VideoMeta {
                    id: video_id.to_string(),
                    title,
                    description,
                }
            }
        }
        _ => VideoMeta::fallback(video_id),
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn find_caption_file(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json3") {
            return Some(path);
        }
    }
    None
}

#[derive(Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Deserialize)]
struct Json3Event {
    #[serde(default, rename = "tStartMs")]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

fn parse_json3(raw: &str) -> Result<Vec<TranscriptSegment>> {
    let track: Json3Track = serde_json::from_str(raw)?;
    let segments = track
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start: event.t_start_ms as f64 / 1000.0,
                text,
            })
        })
        .collect();
    Ok(segments)
}
