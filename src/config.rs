use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::keywords::MatchMode;

/// Configuration for the podcast keyword finder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Audio conversion settings
    pub audio: AudioConfig,

    /// Transcription backend settings
    pub transcription: TranscriptionConfig,

    /// Keyword matching settings
    pub matching: MatchingConfig,

    /// Output and reporting settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate for transcription
    pub target_sample_rate: u32,

    /// Target audio format
    pub target_format: String,

    /// Remove converted WAV files after the run
    pub cleanup_temp_files: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Whisper model to use
    pub model: String,

    /// Language hint; None lets the backend auto-detect
    pub language: Option<String>,

    /// Timeout for the transcription subprocess (seconds)
    pub timeout: u64,

    /// Request word-level timestamps from the backend
    pub word_timestamps: bool,

    /// Temperature setting (0.0 = deterministic)
    pub temperature: f32,

    /// Best-of setting for Whisper quality
    pub best_of: u32,

    /// Beam size for Whisper search
    pub beam_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Matching granularity
    pub mode: MatchMode,

    /// In word mode, match segments without word entries in segment mode
    /// instead of skipping them
    pub word_fallback: bool,

    /// Keywords used when none are supplied on the command line
    pub default_keywords: Vec<String>,

    /// Optional keywords file, one keyword per line
    pub keywords_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory for reports and working files
    pub base_dir: PathBuf,

    /// Write the rendered report to a file
    pub save_report: bool,

    /// Include context lines in the rendered report
    pub include_context: bool,

    /// Log level for the env filter default
    pub log_level: String,
}

impl Config {
    /// Load configuration from the first readable config file.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "podscan.toml",
            "config/podscan.toml",
            "~/.config/podscan/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply environment variable overrides on top of this config.
    pub fn apply_env(&mut self) {
        if let Ok(model) = std::env::var("PODSCAN_MODEL") {
            self.transcription.model = model;
        }

        if let Ok(sample_rate) = std::env::var("PODSCAN_SAMPLE_RATE") {
            if let Ok(sample_rate) = sample_rate.parse() {
                self.audio.target_sample_rate = sample_rate;
            }
        }

        if let Ok(output_dir) = std::env::var("PODSCAN_OUTPUT_DIR") {
            self.output.base_dir = PathBuf::from(output_dir);
        }

        if let Ok(log_level) = std::env::var("PODSCAN_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        if let Ok(mode) = std::env::var("PODSCAN_MATCH_MODE") {
            match mode.parse() {
                Ok(mode) => self.matching.mode = mode,
                Err(e) => tracing::warn!("Ignoring PODSCAN_MATCH_MODE: {}", e),
            }
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.audio.target_sample_rate == 0 {
            return Err(anyhow!("target_sample_rate must be greater than 0"));
        }

        if self.transcription.timeout == 0 {
            return Err(anyhow!("transcription timeout must be greater than 0"));
        }

        if self.transcription.model.trim().is_empty() {
            return Err(anyhow!("transcription model must not be empty"));
        }

        Ok(())
    }

    /// Runtime configuration summary for startup logging.
    pub fn summary(&self) -> String {
        format!(
            "Podscan Configuration:\n\
            - Whisper Model: {}\n\
            - Audio Sample Rate: {}Hz\n\
            - Match Mode: {}\n\
            - Word Fallback: {}\n\
            - Output Directory: {}\n\
            - Save Report: {}",
            self.transcription.model,
            self.audio.target_sample_rate,
            self.matching.mode,
            self.matching.word_fallback,
            self.output.base_dir.display(),
            self.output.save_report,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            transcription: TranscriptionConfig::default(),
            matching: MatchingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // optimal for Whisper
            target_format: "wav".to_string(),
            cleanup_temp_files: true,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: None,
            timeout: 3600, // large episodes take a while
            word_timestamps: true,
            temperature: 0.0,
            best_of: 3,
            beam_size: 5,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Segment,
            word_fallback: false,
            default_keywords: vec![
                "technology".to_string(),
                "AI".to_string(),
                "economy".to_string(),
            ],
            keywords_file: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            save_report: false,
            include_context: true,
            log_level: "info".to_string(),
        }
    }
}

/// Builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.transcription.model = model.into();
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.config.matching.mode = mode;
        self
    }

    pub fn with_word_fallback(mut self, enable: bool) -> Self {
        self.config.matching.word_fallback = enable;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.audio.target_sample_rate = sample_rate;
        self
    }

    pub fn save_report(mut self, enable: bool) -> Self {
        self.config.output.save_report = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
