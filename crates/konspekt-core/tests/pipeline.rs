use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use konspekt_core::{
    ChunkAnalysis, Generator, KonspektError, NoProgress, PipelineOptions, Result, Session,
    VideoMeta, analyze_chunks, chunk_text, fast_summarize, prompts, summarize_transcript,
    synthesize,
};

/// Scripted generator double: the responder decides, per call, how long the
/// call takes and what it returns. Tracks call counts, recorded contexts,
/// and the in-flight high-water mark.
struct FakeGenerator {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    contexts: Mutex<Vec<String>>,
    respond: Box<dyn Fn(&str, &str) -> (Duration, Result<String>) + Send + Sync>,
}

impl FakeGenerator {
    fn new(
        respond: impl Fn(&str, &str) -> (Duration, Result<String>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn echo() -> Arc<Self> {
        Self::new(|context, _| (Duration::ZERO, Ok(format!("analysis of [{context}]"))))
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn recorded_contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, context: &str, instruction: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let (delay, result) = (self.respond)(context, instruction);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn generation_error() -> KonspektError {
    KonspektError::Generation {
        reason: "scripted failure".to_string(),
    }
}

/// Progress sink that records every (done, total) event.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(usize, usize)>>,
}

impl konspekt_core::Progress for Recorder {
    fn completed(&self, done: usize, total: usize) {
        self.events.lock().unwrap().push((done, total));
    }
}

#[tokio::test]
async fn map_stage_preserves_chunk_order_and_drops_failures() {
    // Later chunks finish first; chunks two and four fail outright.
    let generator = FakeGenerator::new(|context, _| {
        if context.contains("two") || context.contains("four") {
            return (Duration::ZERO, Err(generation_error()));
        }
        let delay = if context.contains("one") {
            Duration::from_millis(60)
        } else if context.contains("three") {
            Duration::from_millis(30)
        } else {
            Duration::from_millis(5)
        };
        (delay, Ok(format!("summary of {context}")))
    });

    let chunks: Vec<String> = ["one.", "two.", "three.", "four.", "five."]
        .iter()
        .map(|s| format!("chunk {s}"))
        .collect();
    let options = PipelineOptions {
        max_chunk_len: 3000,
        workers: 5,
    };

    let recorder = Recorder::default();
    let analyses = analyze_chunks(
        Arc::clone(&generator) as Arc<dyn Generator>,
        chunks,
        &options,
        &recorder,
    )
    .await;

    let indices: Vec<usize> = analyses.iter().map(|a| a.index).collect();
    assert_eq!(indices, vec![0, 2, 4]);
    assert_eq!(analyses[0].text, "summary of chunk one.");
    assert_eq!(analyses[1].text, "summary of chunk three.");
    assert_eq!(analyses[2].text, "summary of chunk five.");

    // Progress fires once per resolved chunk, counting every chunk,
    // failures included.
    let events = recorder.events.lock().unwrap();
    assert_eq!(*events, (1..=5).map(|done| (done, 5)).collect::<Vec<_>>());
}

#[tokio::test]
async fn map_stage_concurrency_never_exceeds_worker_bound() {
    let generator =
        FakeGenerator::new(|_, _| (Duration::from_millis(30), Ok("done".to_string())));
    let chunks: Vec<String> = (0..8).map(|n| format!("chunk number {n}.")).collect();
    let options = PipelineOptions {
        max_chunk_len: 3000,
        workers: 3,
    };

    let analyses = analyze_chunks(
        Arc::clone(&generator) as Arc<dyn Generator>,
        chunks,
        &options,
        &NoProgress,
    )
    .await;

    assert_eq!(analyses.len(), 8);
    assert_eq!(generator.call_count(), 8);
    assert!(generator.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn map_stage_with_no_chunks_makes_no_calls() {
    let generator = FakeGenerator::echo();
    let analyses = analyze_chunks(
        Arc::clone(&generator) as Arc<dyn Generator>,
        Vec::new(),
        &PipelineOptions::default(),
        &NoProgress,
    )
    .await;

    assert!(analyses.is_empty());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn synthesize_of_nothing_fails_without_a_backend_call() {
    let generator = FakeGenerator::echo();
    let result = synthesize(generator.as_ref(), &[], prompts::FINAL_INSTRUCTION).await;

    assert!(matches!(result, Err(KonspektError::EmptyInput)));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn synthesize_joins_analyses_in_order_with_blank_lines() {
    let generator = FakeGenerator::echo();
    let analyses = vec![
        ChunkAnalysis {
            index: 0,
            text: "first".to_string(),
        },
        ChunkAnalysis {
            index: 2,
            text: "third".to_string(),
        },
        ChunkAnalysis {
            index: 4,
            text: "fifth".to_string(),
        },
    ];

    synthesize(generator.as_ref(), &analyses, prompts::FINAL_INSTRUCTION)
        .await
        .unwrap();

    assert_eq!(generator.call_count(), 1);
    assert_eq!(generator.recorded_contexts(), vec!["first\n\nthird\n\nfifth"]);
}

#[tokio::test]
async fn detailed_path_dispatches_three_chunks_and_one_reduce() {
    let sentence = "This sentence pads the transcript with plausible spoken words. ";
    let mut transcript = String::new();
    while transcript.len() < 8000 {
        transcript.push_str(sentence);
    }
    let transcript = transcript.trim_end().to_string();

    let options = PipelineOptions {
        max_chunk_len: 3000,
        workers: 3,
    };
    let chunks = chunk_text(&transcript, options.max_chunk_len);
    assert_eq!(chunks.len(), 3);

    let generator = FakeGenerator::new(|context, instruction| {
        if instruction == prompts::FINAL_INSTRUCTION {
            (Duration::ZERO, Ok("the final summary".to_string()))
        } else {
            let tag = format!("<{} chars>", context.len());
            (Duration::from_millis(10), Ok(tag))
        }
    });

    let summary = summarize_transcript(
        Arc::clone(&generator) as Arc<dyn Generator>,
        &transcript,
        &options,
        &NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(summary, "the final summary");
    assert_eq!(generator.call_count(), 4);
    assert!(generator.max_in_flight.load(Ordering::SeqCst) <= 3);

    let expected_reduce_input = chunks
        .iter()
        .map(|chunk| format!("<{} chars>", chunk.len()))
        .collect::<Vec<_>>()
        .join("\n\n");
    let contexts = generator.recorded_contexts();
    assert_eq!(contexts.last().unwrap(), &expected_reduce_input);
}

#[tokio::test]
async fn all_chunks_failing_surfaces_empty_input_not_generation_error() {
    let generator = FakeGenerator::new(|context, instruction| {
        if instruction == prompts::FINAL_INSTRUCTION {
            panic!("reduce must not run with no analyses: {context}");
        }
        (Duration::ZERO, Err(generation_error()))
    });

    let result = summarize_transcript(
        Arc::clone(&generator) as Arc<dyn Generator>,
        "One sentence. Another sentence.",
        &PipelineOptions::default(),
        &NoProgress,
    )
    .await;

    assert!(matches!(result, Err(KonspektError::EmptyInput)));
}

#[tokio::test]
async fn fast_path_uses_fallback_when_transcript_is_empty() {
    let generator = FakeGenerator::echo();
    fast_summarize(
        generator.as_ref(),
        "",
        "Title X\nDescription Y",
        prompts::FAST_INSTRUCTION,
    )
    .await
    .unwrap();

    assert_eq!(generator.call_count(), 1);
    assert_eq!(generator.recorded_contexts(), vec!["Title X\nDescription Y"]);
}

#[tokio::test]
async fn fast_path_with_nothing_at_all_uses_the_placeholder() {
    let generator = FakeGenerator::echo();
    fast_summarize(generator.as_ref(), "  ", "", prompts::FAST_INSTRUCTION)
        .await
        .unwrap();

    assert_eq!(
        generator.recorded_contexts(),
        vec![prompts::NO_SOURCE_CONTEXT.to_string()]
    );
}

#[tokio::test]
async fn qa_appends_history_only_on_success() {
    let mut session = Session::new(VideoMeta::fallback("dQw4w9WgXcQ"));
    session.transcript = Some("[00:00:00] the transcript".to_string());
    session.summary = Some("the summary".to_string());

    let ok = FakeGenerator::new(|_, _| (Duration::ZERO, Ok("an answer".to_string())));
    let answer = session.ask(ok.as_ref(), "what is discussed?").await.unwrap();
    assert_eq!(answer, "an answer");
    assert_eq!(session.qa_history().len(), 1);

    let failing = FakeGenerator::new(|_, _| (Duration::ZERO, Err(generation_error())));
    let result = session.ask(failing.as_ref(), "and then?").await;
    assert!(result.is_err());
    assert_eq!(session.qa_history().len(), 1);

    session.ask(ok.as_ref(), "one more?").await.unwrap();
    let questions: Vec<&str> = session
        .qa_history()
        .iter()
        .map(|qa| qa.question.as_str())
        .collect();
    assert_eq!(questions, vec!["what is discussed?", "one more?"]);
}

#[tokio::test]
async fn qa_context_carries_question_summary_and_transcript() {
    let mut session = Session::new(VideoMeta::fallback("dQw4w9WgXcQ"));
    session.transcript = Some("spoken words".to_string());
    session.summary = Some("short summary".to_string());

    let generator = FakeGenerator::echo();
    session.ask(generator.as_ref(), "why?").await.unwrap();

    let context = generator.recorded_contexts().remove(0);
    assert!(context.contains("Question: why?"));
    assert!(context.contains("short summary"));
    assert!(context.contains("spoken words"));
}

#[tokio::test]
async fn detailed_summary_requires_a_transcript() {
    let mut session = Session::new(VideoMeta::fallback("dQw4w9WgXcQ"));
    let generator = FakeGenerator::echo();

    let result = session
        .summarize_detailed(
            Arc::clone(&generator) as Arc<dyn Generator>,
            &PipelineOptions::default(),
            &NoProgress,
        )
        .await;

    assert!(matches!(
        result,
        Err(KonspektError::TranscriptUnavailable { .. })
    ));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn a_new_summary_replaces_the_previous_one() {
    let mut session = Session::new(VideoMeta::fallback("dQw4w9WgXcQ"));
    session.transcript = Some("One sentence. Another one.".to_string());

    let counter = AtomicUsize::new(0);
    let generator = FakeGenerator::new(move |_, _| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        (Duration::ZERO, Ok(format!("summary v{n}")))
    });

    session.summarize_fast(generator.as_ref()).await.unwrap();
    assert_eq!(session.summary.as_deref(), Some("summary v0"));

    session.summarize_fast(generator.as_ref()).await.unwrap();
    assert_eq!(session.summary.as_deref(), Some("summary v1"));
}
