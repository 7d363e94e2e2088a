use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

use podscan::{Config, KeywordSet, Pipeline, ProgressTracker};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Podcast Keyword Finder")
        .version("0.1.0")
        .about("Locates spoken keyword occurrences in podcast audio")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Path to the podcast audio file"),
        )
        .arg(
            Arg::new("keywords")
                .short('k')
                .long("keywords")
                .value_name("WORD")
                .num_args(1..)
                .help("Keywords to search for (space-separated)"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Matching granularity: segment or word"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("NAME")
                .help("Whisper model to use (tiny, base, small, ...)"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for saved reports"),
        )
        .arg(
            Arg::new("save-report")
                .long("save-report")
                .help("Write the rendered report to the output directory")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("word-fallback")
                .long("word-fallback")
                .help("In word mode, match segments without word timestamps at segment level")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "podscan=debug,info"
        } else {
            "podscan=info,warn"
        })
        .init();

    // Load configuration, then layer env and CLI overrides on top
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_env();

    if let Some(model) = matches.get_one::<String>("model") {
        config.transcription.model = model.clone();
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.matching.mode = mode.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(dir);
    }
    if matches.get_flag("save-report") {
        config.output.save_report = true;
    }
    if matches.get_flag("word-fallback") {
        config.matching.word_fallback = true;
    }
    config.validate()?;

    // Resolve the input file, falling back to a file-selection dialog
    let input_path = match matches.get_one::<String>("file") {
        Some(path) => PathBuf::from(path),
        None => {
            info!("Please select your podcast file...");
            match select_podcast_file() {
                Some(path) => path,
                None => {
                    info!("No file selected. Exiting...");
                    return Ok(());
                }
            }
        }
    };

    if !input_path.exists() {
        error!("Input file not found: {}", input_path.display());
        return Err(anyhow::anyhow!("Input file not found"));
    }

    // Resolve keywords: CLI > keywords file > configured defaults
    let keywords = if let Some(values) = matches.get_many::<String>("keywords") {
        KeywordSet::new(values.map(|s| s.as_str()))
    } else if let Some(file) = &config.matching.keywords_file {
        KeywordSet::from_file(file).await?
    } else {
        KeywordSet::new(config.matching.default_keywords.iter())
    };

    if keywords.is_empty() {
        warn!("Keyword list is empty after trimming; the report will contain no matches");
    }
    let short = keywords.short_keywords(3);
    if !short.is_empty() {
        warn!(
            "⚠️  Short keywords match inside longer words ('ai' matches 'said'): {}",
            short.join(", ")
        );
    }

    info!("🎙️ Podcast Keyword Finder starting...");
    info!("📁 Input file: {}", input_path.display());
    info!("🔎 Searching for keywords: {}", keywords);
    info!("⚙️  Match mode: {}, model: {}", config.matching.mode, config.transcription.model);

    let (progress, mut progress_rx) = ProgressTracker::new();

    // single-threaded status sink for the pipeline's ordered progress events
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            info!("⏳ [{:>3}%] {}", event.percent, event.message);
        }
    });

    // ctrl-c requests cooperative cancellation between stages
    let cancel_handle = progress.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, stopping at the next stage boundary...");
            cancel_handle.cancel();
        }
    });

    let pipeline = Pipeline::new(config);
    let result = pipeline.run(&input_path, &keywords, &progress).await?;
    printer.abort();

    info!(
        "🎉 Done in {:.1}s: {} segments scanned, {} occurrence(s)",
        result.processing_time.as_secs_f64(),
        result.segment_count,
        result.matches.len()
    );

    println!("\n{}", result.report);

    if let Some(path) = &result.report_path {
        info!("💾 Report saved to: {}", path.display());
    }

    Ok(())
}

/// Open a native file-selection dialog for the podcast file.
fn select_podcast_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Podcast File")
        .add_filter("Audio Files", &["mp3", "wav", "m4a", "aac"])
        .add_filter("All Files", &["*"])
        .pick_file()
}
