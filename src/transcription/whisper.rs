use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::audio::AudioInfo;
use crate::config::TranscriptionConfig;
use super::transcript::Transcript;

/// Anything that can turn normalized audio into a timestamped transcript.
///
/// The pipeline only talks to this trait, so tests can substitute a canned
/// transcript for the external Whisper process.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn transcribe(&self, audio: &AudioInfo, work_dir: &Path) -> Result<Transcript>;
}

/// Available Whisper command-line backends, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhisperBackend {
    /// whisper.cpp via Homebrew (fastest)
    Cli,
    /// whisper.cpp
    Cpp,
    /// Python OpenAI Whisper (fallback, but the only one with word timestamps)
    Python,
}

impl WhisperBackend {
    const ALL: [WhisperBackend; 3] = [WhisperBackend::Cli, WhisperBackend::Cpp, WhisperBackend::Python];

    fn command(&self) -> &'static str {
        match self {
            WhisperBackend::Cli => "whisper-cli",
            WhisperBackend::Cpp => "whisper-cpp",
            WhisperBackend::Python => "whisper",
        }
    }

    fn is_cpp(&self) -> bool {
        !matches!(self, WhisperBackend::Python)
    }
}

/// Whisper transcriber shelling out to the first available backend.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Transcribe a converted audio file, writing backend output under
    /// `work_dir`.
    pub async fn transcribe_audio(&self, audio: &AudioInfo, work_dir: &Path) -> Result<Transcript> {
        let start_time = std::time::Instant::now();

        info!("🎤 Starting Whisper transcription for: {}", audio.path.display());
        info!(
            "📊 Audio: {}Hz, {} channel(s), {:.1}s, {:.1} MB",
            audio.sample_rate,
            audio.channels,
            audio.duration.as_secs_f64(),
            audio.file_size as f64 / 1_000_000.0
        );

        let backend = Self::detect_backend()
            .await
            .ok_or_else(|| anyhow!("No Whisper backend found. Please install whisper.cpp or openai-whisper"))?;
        info!("✅ Using {} backend, model: {}", backend.command(), self.config.model);

        tokio::fs::create_dir_all(work_dir).await?;

        let cmd = if backend.is_cpp() {
            self.build_cpp_command(backend, &audio.path, work_dir)?
        } else {
            self.build_python_command(&audio.path, work_dir)?
        };

        let json_path = self.execute(cmd, work_dir, backend.command()).await?;

        let json_content = tokio::fs::read_to_string(&json_path)
            .await
            .with_context(|| format!("failed to read Whisper output {}", json_path.display()))?;
        let value: Value = serde_json::from_str(&json_content)
            .with_context(|| format!("Whisper output is not valid JSON: {}", json_path.display()))?;

        let transcript = self.parse_output(&value)?;

        info!(
            "🎉 Transcription completed in {:.1}s: {} segments, {} word timestamps",
            start_time.elapsed().as_secs_f64(),
            transcript.len(),
            transcript.word_count()
        );
        if !transcript.has_word_timestamps() {
            warn!("⚠️  Backend produced no word-level timestamps; word-mode matching will find nothing unless the segment fallback is enabled");
        }

        Ok(transcript)
    }

    /// Probe for the first available backend.
    async fn detect_backend() -> Option<WhisperBackend> {
        for backend in WhisperBackend::ALL {
            debug!("Checking for {} command", backend.command());
            if Self::check_command_available(backend.command()).await {
                return Some(backend);
            }
        }
        None
    }

    /// Human-readable availability summary for diagnostics.
    pub async fn check_availability() -> Result<String> {
        match Self::detect_backend().await {
            Some(backend) => Ok(format!("Whisper backend available: {}", backend.command())),
            None => Err(anyhow!(
                "No Whisper backend found. Install whisper.cpp (whisper-cli) or openai-whisper"
            )),
        }
    }

    /// Model names the Python backend understands; whisper.cpp uses the same
    /// names for its ggml model files.
    pub fn available_models() -> &'static [&'static str] {
        &["tiny", "base", "small", "medium", "large"]
    }

    fn build_cpp_command(
        &self,
        backend: WhisperBackend,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<Command> {
        let base_name = audio_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let output_file = work_dir.join(&base_name);

        let mut cmd = Command::new(backend.command());
        cmd.arg("-f")
            .arg(audio_path)
            .arg("-oj") // JSON output
            .arg("-of")
            .arg(&output_file)
            .arg("-tp")
            .arg(format!("{:.1}", self.config.temperature));

        if let Some(model_path) = self.find_cpp_model() {
            cmd.arg("-m").arg(model_path);
        } else {
            warn!("⚠️  No ggml model file found for '{}', relying on backend default", self.config.model);
        }

        if let Some(language) = &self.config.language {
            cmd.arg("-l").arg(language);
        }

        Ok(cmd)
    }

    fn find_cpp_model(&self) -> Option<PathBuf> {
        let candidates = [
            format!("models/ggml-{}.bin", self.config.model),
            format!("/usr/local/share/whisper-cpp/ggml-{}.bin", self.config.model),
            format!("/opt/homebrew/share/whisper-cpp/ggml-{}.bin", self.config.model),
        ];

        candidates
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn build_python_command(&self, audio_path: &Path, work_dir: &Path) -> Result<Command> {
        let mut cmd = Command::new("whisper");
        cmd.arg(audio_path)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output_dir")
            .arg(work_dir)
            .arg("--output_format")
            .arg("json")
            .arg("--verbose")
            .arg("False")
            .arg("--fp16")
            .arg("False")
            .arg("--temperature")
            .arg(format!("{:.1}", self.config.temperature))
            .arg("--best_of")
            .arg(self.config.best_of.to_string())
            .arg("--beam_size")
            .arg(self.config.beam_size.to_string());

        if self.config.word_timestamps {
            cmd.arg("--word_timestamps").arg("True");
        }

        if let Some(language) = &self.config.language {
            cmd.arg("--language").arg(language);
        }

        Ok(cmd)
    }

    /// Run the backend with a timeout and locate its JSON output file.
    async fn execute(&self, mut cmd: Command, work_dir: &Path, backend_name: &str) -> Result<PathBuf> {
        let timeout = Duration::from_secs(self.config.timeout);
        debug!("Executing command: {:?}", cmd);

        cmd.kill_on_drop(true);
        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| anyhow!("{} timed out after {} seconds", backend_name, self.config.timeout))?
            .map_err(|e| anyhow!("failed to spawn {}: {}", backend_name, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} failed with exit code {}: {}",
                backend_name,
                output.status,
                stderr.trim()
            ));
        }

        let json_path = Self::find_json_output(work_dir)
            .await?
            .ok_or_else(|| anyhow!("No {} JSON output found in {}", backend_name, work_dir.display()))?;

        debug!("Found JSON output: {}", json_path.display());
        Ok(json_path)
    }

    async fn find_json_output(work_dir: &Path) -> Result<Option<PathBuf>> {
        let mut entries = tokio::fs::read_dir(work_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Normalize backend JSON into a validated transcript.
    ///
    /// whisper.cpp emits a `transcription` array with string timestamps; the
    /// Python backend emits the canonical `segments` shape, which goes
    /// through full shape validation.
    fn parse_output(&self, value: &Value) -> Result<Transcript> {
        if let Some(raw_segments) = value.get("transcription").and_then(|t| t.as_array()) {
            debug!("Parsing whisper.cpp output format with {} segments", raw_segments.len());
            return self.parse_cpp_output(value, raw_segments);
        }

        debug!("Parsing canonical Whisper output format");
        Transcript::from_json(value).map_err(|e| anyhow!("invalid transcription from backend: {}", e))
    }

    fn parse_cpp_output(&self, value: &Value, raw_segments: &[Value]) -> Result<Transcript> {
        let mut segments = Vec::with_capacity(raw_segments.len());

        for raw in raw_segments {
            let text = raw
                .get("text")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("whisper.cpp segment is missing 'text'"))?
                .trim()
                .to_string();

            // prefer millisecond offsets; fall back to "HH:MM:SS,mmm" strings
            let (start, end) = if let Some(offsets) = raw.get("offsets") {
                let from = offsets.get("from").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let to = offsets.get("to").and_then(|v| v.as_f64()).unwrap_or(from);
                (from / 1000.0, to / 1000.0)
            } else {
                let timestamps = raw
                    .get("timestamps")
                    .ok_or_else(|| anyhow!("whisper.cpp segment has neither 'offsets' nor 'timestamps'"))?;
                let from = timestamps.get("from").and_then(|v| v.as_str()).unwrap_or("00:00:00,000");
                let to = timestamps.get("to").and_then(|v| v.as_str()).unwrap_or(from);
                (parse_timestamp(from)?, parse_timestamp(to)?)
            };

            segments.push(super::transcript::TranscriptSegment {
                start,
                end,
                text,
                words: Vec::new(), // whisper.cpp JSON carries no word entries
            });
        }

        let language = value
            .get("result")
            .and_then(|r| r.get("language"))
            .or_else(|| value.get("language"))
            .and_then(|l| l.as_str())
            .map(|l| l.to_string());

        Ok(Transcript { segments, language })
    }

    async fn check_command_available(cmd_name: &str) -> bool {
        Command::new(cmd_name)
            .arg("--help")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, audio: &AudioInfo, work_dir: &Path) -> Result<Transcript> {
        self.transcribe_audio(audio, work_dir).await
    }
}

/// Parse a "HH:MM:SS,mmm" timestamp to seconds.
fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let (time_part, millis_part) = timestamp
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid timestamp format: {}", timestamp))?;

    let milliseconds: f64 = millis_part.parse::<f64>()? / 1000.0;

    let components: Vec<&str> = time_part.split(':').collect();
    if components.len() != 3 {
        return Err(anyhow!("Invalid time format: {}", time_part));
    }

    let hours: f64 = components[0].parse()?;
    let minutes: f64 = components[1].parse()?;
    let seconds: f64 = components[2].parse()?;

    Ok(hours * 3600.0 + minutes * 60.0 + seconds + milliseconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transcriber() -> WhisperTranscriber {
        WhisperTranscriber::new(TranscriptionConfig::default())
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:00,000").unwrap(), 0.0);
        assert_eq!(parse_timestamp("00:01:23,456").unwrap(), 83.456);
        assert_eq!(parse_timestamp("01:00:00,500").unwrap(), 3600.5);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("12:34").is_err());
        assert!(parse_timestamp("not a timestamp").is_err());
    }

    #[test]
    fn test_parse_canonical_output() {
        let value = json!({
            "language": "en",
            "segments": [
                {
                    "start": 0.0,
                    "end": 3.5,
                    "text": "we discussed AI policy today",
                    "words": [{"word": "we", "start": 0.0, "end": 0.2}]
                }
            ]
        });

        let transcript = transcriber().parse_output(&value).unwrap();
        assert_eq!(transcript.len(), 1);
        assert!(transcript.has_word_timestamps());
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_cpp_output_with_offsets() {
        let value = json!({
            "transcription": [
                {
                    "text": " Hello world.",
                    "offsets": {"from": 0, "to": 2500},
                    "timestamps": {"from": "00:00:00,000", "to": "00:00:02,500"}
                }
            ],
            "result": {"language": "en"}
        });

        let transcript = transcriber().parse_output(&value).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.segments[0].start, 0.0);
        assert_eq!(transcript.segments[0].end, 2.5);
        assert_eq!(transcript.segments[0].text, "Hello world.");
        assert!(!transcript.has_word_timestamps());
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_cpp_output_timestamp_fallback() {
        let value = json!({
            "transcription": [
                {
                    "text": "no offsets here",
                    "timestamps": {"from": "00:01:00,000", "to": "00:01:05,000"}
                }
            ]
        });

        let transcript = transcriber().parse_output(&value).unwrap();
        assert_eq!(transcript.segments[0].start, 60.0);
        assert_eq!(transcript.segments[0].end, 65.0);
    }

    #[test]
    fn test_parse_output_rejects_malformed_canonical_shape() {
        let value = json!({"segments": "not an array"});
        assert!(transcriber().parse_output(&value).is_err());
    }
}
