use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Audio file information gathered via ffprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub path: PathBuf,
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u32,
    pub format: String,
    pub bitrate: Option<u32>,
    pub file_size: u64,
}

/// Converts podcast audio into the normalized format Whisper expects.
#[derive(Debug, Clone)]
pub struct AudioConverter {
    /// Target sample rate for transcription (Whisper optimal)
    pub target_sample_rate: u32,
    /// Target audio format
    pub target_format: String,
}

impl AudioConverter {
    pub fn new() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz optimal for Whisper
            target_format: "wav".to_string(),
        }
    }

    /// Output path for the converted copy of `input_path` under `output_dir`.
    pub fn converted_path(&self, input_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "converted_podcast".to_string());
        output_dir.join(format!("{}.{}", stem, self.target_format))
    }

    /// Convert the input audio to 16-bit mono PCM WAV at the target sample
    /// rate, the format the transcription backends expect.
    pub async fn convert_for_transcription(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<AudioInfo> {
        let output_path = self.converted_path(input_path, output_dir);

        info!("🎵 Converting audio for transcription: {}", input_path.display());

        tokio::fs::create_dir_all(output_dir).await?;

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i",
                input_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Input path is not valid UTF-8: {}", input_path.display()))?,
                "-vn", // drop any video stream (video podcasts)
                "-acodec",
                "pcm_s16le", // 16-bit PCM
                "-ar",
                &self.target_sample_rate.to_string(),
                "-ac",
                "1", // mono
                "-f",
                "wav",
                "-y", // overwrite existing
                output_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Output path is not valid UTF-8: {}", output_path.display()))?,
            ])
            .status()
            .await
            .map_err(|e| anyhow!("Failed to run ffmpeg (is it installed?): {}", e))?;

        if !status.success() {
            return Err(anyhow!("Audio conversion failed for {}", input_path.display()));
        }

        let audio_info = self.probe(&output_path).await?;

        info!(
            "✅ Audio converted: {} ({:.1}s, {}Hz)",
            audio_info.path.display(),
            audio_info.duration.as_secs_f64(),
            audio_info.sample_rate
        );

        Ok(audio_info)
    }

    /// Inspect an audio file with ffprobe.
    pub async fn probe(&self, audio_path: &Path) -> Result<AudioInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "a:0", // first audio stream
                audio_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Audio path is not valid UTF-8: {}", audio_path.display()))?,
            ])
            .output()
            .await
            .map_err(|e| anyhow!("Failed to run ffprobe (is it installed?): {}", e))?;

        if !output.status.success() {
            return Err(anyhow!("ffprobe failed for {}", audio_path.display()));
        }

        let json_str = String::from_utf8(output.stdout)?;
        let ffprobe_data: serde_json::Value = serde_json::from_str(&json_str)?;

        let format = &ffprobe_data["format"];
        let audio_stream = ffprobe_data["streams"]
            .as_array()
            .and_then(|streams| streams.first())
            .ok_or_else(|| anyhow!("No audio stream found in {}", audio_path.display()))?;

        let duration_seconds: f64 = format["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        let file_size = tokio::fs::metadata(audio_path).await?.len();

        Ok(AudioInfo {
            path: audio_path.to_path_buf(),
            duration: Duration::from_secs_f64(duration_seconds),
            sample_rate: audio_stream["sample_rate"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(self.target_sample_rate),
            channels: audio_stream["channels"].as_u64().unwrap_or(1) as u32,
            format: audio_stream["codec_name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            bitrate: audio_stream["bit_rate"].as_str().and_then(|s| s.parse().ok()),
            file_size,
        })
    }

    /// Remove leftover converted WAV files from a working directory.
    pub async fn cleanup_temp_files(&self, temp_dir: &Path) -> Result<()> {
        let mut entries = tokio::fs::read_dir(temp_dir).await?;
        let mut cleaned = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "wav" || ext == "tmp") {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove temp file {}: {}", path.display(), e);
                } else {
                    cleaned += 1;
                }
            }
        }

        if cleaned > 0 {
            info!("🧹 Cleaned up {} temporary audio files", cleaned);
        }

        Ok(())
    }
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new()
    }
}
