use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use crate::audio::{AudioConverter, AudioInfo};
use crate::config::Config;
use crate::keywords::{KeywordMatcher, KeywordSet, MatchRecord};
use crate::progress::{PipelineStage, ProgressTracker};
use crate::report::ReportGenerator;
use crate::transcription::whisper::{TranscriptionProvider, WhisperTranscriber};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub audio_info: AudioInfo,
    pub segment_count: usize,
    pub word_count: usize,
    pub matches: Vec<MatchRecord>,
    pub report: String,
    pub report_path: Option<PathBuf>,
    pub processing_time: Duration,
}

/// Runs the conversion, transcription, matching and reporting stages for a
/// single podcast file.
///
/// Cancellation is cooperative: the shared flag on the progress tracker is
/// checked between stages. The matcher call is fast enough that it is not a
/// cancellation point.
pub struct Pipeline {
    config: Config,
    converter: AudioConverter,
    provider: Box<dyn TranscriptionProvider>,
    matcher: KeywordMatcher,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let provider = WhisperTranscriber::new(config.transcription.clone());
        let matcher = KeywordMatcher::new(config.matching.mode)
            .with_word_fallback(config.matching.word_fallback);

        Self {
            config,
            converter: AudioConverter::new(),
            provider: Box::new(provider),
            matcher,
        }
    }

    /// Substitute the transcription provider (used by tests).
    pub fn with_provider(mut self, provider: Box<dyn TranscriptionProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub async fn run(
        &self,
        input_path: &Path,
        keywords: &KeywordSet,
        progress: &ProgressTracker,
    ) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!("🚀 Processing podcast: {}", input_path.display());
        info!("🔎 Keywords: {}", keywords);

        self.check_cancelled(progress, "before audio conversion")?;

        // keep backend artifacts in a throwaway dir unless asked to retain them
        let (work_dir, _work_dir_guard) = if self.config.audio.cleanup_temp_files {
            let temp = tempfile::Builder::new().prefix("podscan").tempdir()?;
            (temp.path().to_path_buf(), Some(temp))
        } else {
            let dir = self.config.output.base_dir.join("work");
            tokio::fs::create_dir_all(&dir).await?;
            (dir, None)
        };

        progress
            .update(PipelineStage::Conversion, 10, "Converting audio...")
            .await;
        let audio_info = self
            .converter
            .convert_for_transcription(input_path, &work_dir)
            .await?;

        self.check_cancelled(progress, "after audio conversion")?;

        progress
            .update(
                PipelineStage::Transcription,
                40,
                "Transcribing audio (this may take several minutes)...",
            )
            .await;
        let transcript = self.provider.transcribe(&audio_info, &work_dir).await?;

        self.check_cancelled(progress, "after transcription")?;

        progress
            .update(PipelineStage::Matching, 80, "Finding keywords...")
            .await;
        let matches = self.matcher.find_keywords(&transcript, keywords);
        info!(
            "🎯 Found {} keyword occurrence(s) across {} segments",
            matches.len(),
            transcript.len()
        );

        progress
            .update(PipelineStage::Reporting, 90, "Rendering results...")
            .await;
        let mut generator = ReportGenerator::new().with_context(self.config.output.include_context);
        generator.add_records(matches.iter().cloned());
        let report = generator.generate();

        let report_path = if self.config.output.save_report {
            let path = self.report_path(input_path);
            tokio::fs::create_dir_all(&self.config.output.base_dir).await?;
            generator.save_to_file(&path, input_path, keywords).await?;
            info!("💾 Report saved to: {}", path.display());
            Some(path)
        } else {
            None
        };

        progress
            .update(PipelineStage::Completed, 100, "Processing complete!")
            .await;

        Ok(PipelineResult {
            segment_count: transcript.len(),
            word_count: transcript.word_count(),
            audio_info,
            matches,
            report,
            report_path,
            processing_time: start_time.elapsed(),
        })
    }

    fn report_path(&self, input_path: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "podcast".to_string());
        self.config.output.base_dir.join(format!("{}_keywords.txt", stem))
    }

    fn check_cancelled(&self, progress: &ProgressTracker, at: &str) -> Result<()> {
        if progress.is_cancelled() {
            return Err(anyhow!("Processing cancelled {}", at));
        }
        Ok(())
    }
}
