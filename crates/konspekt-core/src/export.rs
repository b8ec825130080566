use crate::types::{QaEntry, VideoMeta};

/// Render the summary and QA history as a standalone markdown document.
pub fn markdown_document(summary: &str, video: &VideoMeta, qa_history: &[QaEntry]) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Video Summary: {}\n\n", video.title));
    output.push_str(&format!("Video Link: {}\n\n", video.watch_url()));
    output.push_str(summary.trim_end());
    output.push('\n');

    if !qa_history.is_empty() {
        output.push_str("\n## Questions & Answers\n\n");
        for qa in qa_history {
            output.push_str(&format!("**Q: {}**\n\nA: {}\n\n", qa.question, qa.answer));
        }
    }

    output.push_str("\n---\nGenerated with konspekt\n");
    output
}
