use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{error::Result, provider::Provider, types::TranscriptSegment};

/// Root cache directory shared by all videos
pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("konspekt")
}

/// Per-video cache directory. Video ids are filesystem-safe, so they are
/// used directly.
pub fn get_cache_dir(video_id: &str) -> PathBuf {
    get_root_cache_dir().join(video_id)
}

/// Path for the cached transcript segments
pub fn get_transcript_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("transcript.json")
}

/// Path for the cached summary (provider aware)
pub fn get_summary_path(cache_dir: &Path, provider: &Provider) -> PathBuf {
    cache_dir.join(format!("summary_{}.md", provider.name().to_lowercase()))
}

pub async fn load_segments(path: &Path) -> Result<Vec<TranscriptSegment>> {
    let json_content = fs::read_to_string(path).await?;
    let segments: Vec<TranscriptSegment> = serde_json::from_str(&json_content)?;
    Ok(segments)
}

pub async fn save_segments(segments: &[TranscriptSegment], path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(segments)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

pub async fn load_summary(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path).await?)
}

pub async fn save_summary(summary: &str, path: &Path) -> Result<()> {
    fs::write(path, summary).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn segments_round_trip_through_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_transcript_path(dir.path());
        let segments = vec![
            TranscriptSegment {
                start: 0.0,
                text: "first".to_string(),
            },
            TranscriptSegment {
                start: 12.5,
                text: "second".to_string(),
            },
        ];

        save_segments(&segments, &path).await.unwrap();
        let loaded = load_segments(&path).await.unwrap();
        assert_eq!(loaded, segments);
    }

    #[tokio::test]
    async fn summary_round_trips_through_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_summary_path(dir.path(), &Provider::Grok);
        assert!(path.ends_with("summary_grok.md"));

        save_summary("## Summary\n\ntext", &path).await.unwrap();
        assert_eq!(load_summary(&path).await.unwrap(), "## Summary\n\ntext");
    }

    #[tokio::test]
    async fn missing_summary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_summary_path(dir.path(), &Provider::Openai);
        assert!(load_summary(&path).await.is_err());
    }
}
