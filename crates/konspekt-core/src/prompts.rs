//! Instruction text sent to the generation backend.

/// Per-chunk analysis directive for the map stage.
pub static CHUNK_INSTRUCTION: &str = r#"Analyze this portion of the video transcript and provide:
1. Key points
2. Notable quotes with timestamps
3. Technical data or statistics
4. Important concepts
5. Brief summary"#;

/// Cross-chunk synthesis directive for the reduce stage.
pub static FINAL_INSTRUCTION: &str = r#"Based on all sections, provide a comprehensive summary with:
1. Main Topic
2. Executive Summary (200 words)
3. Key Points (10-20)
4. Detailed Analysis (2000 words)
5. Notable Quotes
6. Technical Data
7. Key Terms
8. Concepts & Frameworks
9. Timeline & Structure
10. Practical Applications"#;

/// Single-call executive summary directive.
pub static FAST_INSTRUCTION: &str = "Provide a concise executive summary of the video transcript \
(200-500 words). Skip detailed quotes or technical terms.";

/// Directive for follow-up questions.
pub static QA_INSTRUCTION: &str = "Answer the question using only the summary and transcript \
provided. If the material does not contain the answer, say so.";

/// Context substituted when neither a transcript nor a description exists.
pub static NO_SOURCE_CONTEXT: &str = "No transcript or video description could be retrieved for \
this video. State that no source material was available and add a short disclaimer that no \
content-based summary can be given.";

/// Combined context for a follow-up question, in the order the backend sees
/// it.
pub fn qa_context(question: &str, summary: &str, transcript: &str) -> String {
    format!("Question: {question}\n\nSummary:\n{summary}\n\nTranscript:\n{transcript}")
}
