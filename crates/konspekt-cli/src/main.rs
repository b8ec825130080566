use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use konspekt_core::{
    Generator, HttpGenerator, PipelineOptions, Progress, Provider, RetryPolicy, Session,
    TranscriptSource, YtDlpSource, extract_video_id, fetch_metadata, format_transcript,
    get_cache_dir, get_summary_path, get_transcript_path, load_segments, load_summary,
    markdown_document, save_segments, save_summary,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "konspekt")]
#[command(about = "Summarize YouTube videos from their captions with AI-powered map-reduce analysis")]
struct Cli {
    /// Video URL or bare video id
    url: String,

    /// AI provider for summarization
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// Generate the single-call executive summary instead of detailed notes
    #[arg(long)]
    fast: bool,

    /// Ask a follow-up question after summarizing (repeatable)
    #[arg(short, long)]
    ask: Vec<String>,

    /// Maximum chunk size in characters for the detailed path
    #[arg(long, default_value_t = 3000)]
    max_chunk_len: usize,

    /// Concurrent generation calls during chunk analysis
    #[arg(short, long, default_value_t = 3)]
    workers: usize,

    /// Write the exported markdown document to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-processing even if cached files exist
    #[arg(short, long)]
    force: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Routes map-stage completion into an indicatif bar.
struct BarProgress(ProgressBar);

impl Progress for BarProgress {
    fn completed(&self, done: usize, total: usize) {
        self.0.set_length(total as u64);
        self.0.set_position(done as u64);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();

    let Some(video_id) = extract_video_id(&cli.url) else {
        eprintln!(
            "{} no video id found in {:?}",
            style("Error:").red().bold(),
            cli.url
        );
        std::process::exit(1);
    };

    // Validate API key early
    let generator = match HttpGenerator::new(provider, RetryPolicy::default()) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // Setup cache directory
    let cache_dir = get_cache_dir(&video_id);
    fs::create_dir_all(&cache_dir).await?;

    println!(
        "\n{}  {}\n",
        style("konspekt").cyan().bold(),
        style("Video Summarizer").dim()
    );

    // Step 1: Video metadata
    let spinner = create_spinner("Fetching video info...");
    let video = fetch_metadata(&video_id).await;
    spinner.finish_with_message(format!(
        "{} {}",
        style("✓").green().bold(),
        style(&video.title).yellow()
    ));

    let mut session = Session::new(video);

    // Step 2: Transcript (check cache)
    let transcript_path = get_transcript_path(&cache_dir);
    let segments = if !cli.force && transcript_path.exists() {
        let segments = load_segments(&transcript_path).await?;
        println!(
            "{} Transcript: {} segments {}",
            style("✓").green().bold(),
            segments.len(),
            style("(cached)").dim()
        );
        Some(segments)
    } else {
        let spinner = create_spinner("Fetching transcript...");
        let source = YtDlpSource::new(cache_dir.clone(), RetryPolicy::default());
        match source.fetch(&video_id).await {
            Ok(segments) => {
                save_segments(&segments, &transcript_path).await?;
                spinner.finish_with_message(format!(
                    "{} Transcript: {} segments",
                    style("✓").green().bold(),
                    segments.len()
                ));
                Some(segments)
            }
            Err(error) => {
                spinner.finish_with_message(format!(
                    "{} {}",
                    style("!").yellow().bold(),
                    style("Transcript not available, using title and description").yellow()
                ));
                tracing::warn!(%error, "transcript fetch failed");
                None
            }
        }
    };

    if let Some(segments) = &segments {
        session.transcript = Some(format_transcript(segments));
    }

    // Step 3: Summary (check cache with provider)
    let summary_path = get_summary_path(&cache_dir, &provider);
    let use_detailed = !cli.fast && session.transcript.is_some();
    if !cli.force && summary_path.exists() {
        let summary = load_summary(&summary_path).await?;
        session.summary = Some(summary);
        println!(
            "{} Summary generated ({}) {}",
            style("✓").green().bold(),
            provider.name(),
            style("(cached)").dim()
        );
    } else if use_detailed {
        let bar = ProgressBar::new(1);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Analyzing chunks {bar:30.cyan} {pos}/{len}")
                .unwrap(),
        );
        let options = PipelineOptions {
            max_chunk_len: cli.max_chunk_len,
            workers: cli.workers,
        };
        let summary = session
            .summarize_detailed(
                Arc::clone(&generator) as Arc<dyn Generator>,
                &options,
                &BarProgress(bar.clone()),
            )
            .await?;
        bar.finish_and_clear();
        save_summary(&summary, &summary_path).await?;
        println!(
            "{} Detailed summary generated ({})",
            style("✓").green().bold(),
            provider.name()
        );
    } else {
        let spinner = create_spinner("Generating fast summary...");
        let summary = session.summarize_fast(generator.as_ref()).await?;
        save_summary(&summary, &summary_path).await?;
        spinner.finish_with_message(format!(
            "{} Fast summary generated ({})",
            style("✓").green().bold(),
            provider.name()
        ));
    }

    println!("{}", style("─".repeat(60)).dim());
    if let Some(summary) = &session.summary {
        println!("{summary}");
    }

    // Step 4: Follow-up questions
    for question in &cli.ask {
        let spinner = create_spinner(&format!("Answering: {question}"));
        match session.ask(generator.as_ref(), question).await {
            Ok(answer) => {
                spinner.finish_with_message(format!(
                    "{} {}",
                    style("Q:").cyan().bold(),
                    style(question).bold()
                ));
                println!("{answer}\n");
            }
            Err(error) => {
                spinner.finish_with_message(format!("{} {}", style("✗").red().bold(), error));
            }
        }
    }

    // Step 5: Export markdown document
    let document = markdown_document(
        session.summary.as_deref().unwrap_or(""),
        &session.video,
        session.qa_history(),
    );
    let output_path = cli
        .output
        .unwrap_or_else(|| cache_dir.join(format!("{video_id}.md")));
    fs::write(&output_path, &document).await?;

    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(output_path.display()).cyan()
    );

    Ok(())
}
