/// Podcast Keyword Finder
///
/// Locates spoken keyword occurrences in podcast audio: ffmpeg normalizes
/// the input, a Whisper backend transcribes it, and a pure matcher scans the
/// timestamped transcript for user-supplied keywords.

pub mod audio;
pub mod config;
pub mod keywords;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod transcription;

// Re-export main types for easy access
pub use crate::audio::{AudioConverter, AudioInfo};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::keywords::{KeywordMatcher, KeywordSet, MatchMode, MatchRecord};
pub use crate::pipeline::{Pipeline, PipelineResult};
pub use crate::progress::{PipelineStage, ProgressEvent, ProgressTracker};
pub use crate::report::{format_time, ReportGenerator};
pub use crate::transcription::{
    Transcript, TranscriptError, TranscriptSegment, TranscriptionProvider, WhisperTranscriber,
    WordEntry,
};
