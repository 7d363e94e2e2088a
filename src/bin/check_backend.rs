use anyhow::Result;
use podscan::{Config, WhisperTranscriber};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("check_backend=info,podscan=info")
        .init();

    info!("🔍 Checking transcription backend availability...");

    match WhisperTranscriber::check_availability().await {
        Ok(backend_info) => {
            info!("✅ {}", backend_info);
        }
        Err(e) => {
            info!("❌ {}", e);
            info!("💡 Recommendation: Install whisper.cpp for best performance:");
            info!("   git clone https://github.com/ggerganov/whisper.cpp.git");
            info!("   cd whisper.cpp && make -j");
            info!("   # Download models: ./models/download-ggml-model.sh base");
            return Ok(());
        }
    }

    let config = Config::default();
    let transcriber = WhisperTranscriber::new(config.transcription.clone());
    info!("🎤 Transcriber ready with model: {}", transcriber.model());
    info!("   - Word timestamps requested: {}", config.transcription.word_timestamps);
    info!("   - Subprocess timeout: {}s", config.transcription.timeout);

    info!("📋 Known Whisper models:");
    for model in WhisperTranscriber::available_models() {
        info!("   - {}", model);
    }

    info!("🎉 Transcription components ready!");
    info!("💡 To scan a podcast: cargo run -- --file episode.mp3 --keywords technology AI economy");

    Ok(())
}
