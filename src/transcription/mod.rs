pub mod transcript;
pub mod whisper;

pub use transcript::{Transcript, TranscriptError, TranscriptSegment, WordEntry};
pub use whisper::{TranscriptionProvider, WhisperTranscriber};
