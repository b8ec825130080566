use crate::types::TranscriptSegment;

/// Format seconds as HH:MM:SS timestamp. Hours grow past 24 without
/// wrapping.
pub fn format_timestamp(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Format transcript segments with timestamps, joined into one line
pub fn format_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start as u64), seg.text.trim()))
        .collect::<Vec<_>>()
        .join(" ")
}
