use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while validating provider output into a [`Transcript`].
///
/// `MissingField` covers absent or mis-shaped container fields, so callers
/// can tell "bad transcription input" apart from "no keywords found".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("transcription is missing required field '{field}'")]
    MissingField { field: String },

    #[error("transcription field '{field}' has the wrong type, expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },
}

/// A single word with its own timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    /// The word text as emitted by the transcription backend
    pub word: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, when the backend provides one
    pub end: Option<f64>,
}

/// One transcribed segment with optional word-level timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text for the whole segment
    pub text: String,
    /// Word-level entries; empty when the backend did not emit them
    #[serde(default)]
    pub words: Vec<WordEntry>,
}

/// Complete timestamped transcription, time-ascending by segment.
///
/// Created once per run by the transcription provider and read-only to the
/// matcher afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    /// Detected language, when the backend reports one
    pub language: Option<String>,
}

impl Transcript {
    /// Validate a raw provider JSON value into a typed transcript.
    ///
    /// Accepts the canonical Whisper output shape: a `segments` array whose
    /// entries carry `start`, `end`, `text` and an optional `words` array of
    /// `{word, start, end?}` objects. Fails on the first missing field or
    /// type mismatch, naming the offending field.
    pub fn from_json(value: &Value) -> Result<Self, TranscriptError> {
        let segments_value = value.get("segments").ok_or(TranscriptError::MissingField {
            field: "segments".to_string(),
        })?;

        let raw_segments = segments_value.as_array().ok_or(TranscriptError::TypeMismatch {
            field: "segments".to_string(),
            expected: "array",
        })?;

        let mut segments = Vec::with_capacity(raw_segments.len());
        for (i, raw) in raw_segments.iter().enumerate() {
            segments.push(Self::parse_segment(raw, i)?);
        }

        let language = match value.get("language") {
            None | Some(Value::Null) => None,
            Some(Value::String(lang)) => Some(lang.clone()),
            Some(_) => {
                return Err(TranscriptError::TypeMismatch {
                    field: "language".to_string(),
                    expected: "string",
                })
            }
        };

        Ok(Self { segments, language })
    }

    fn parse_segment(raw: &Value, index: usize) -> Result<TranscriptSegment, TranscriptError> {
        let path = format!("segments[{}]", index);
        let obj = raw.as_object().ok_or(TranscriptError::TypeMismatch {
            field: path.clone(),
            expected: "object",
        })?;

        let start = require_number(obj, &path, "start")?;
        let end = require_number(obj, &path, "end")?;
        let text = require_string(obj, &path, "text")?;

        let words = match obj.get("words") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(raw_words)) => {
                let mut words = Vec::with_capacity(raw_words.len());
                for (j, raw_word) in raw_words.iter().enumerate() {
                    words.push(Self::parse_word(raw_word, &path, j)?);
                }
                words
            }
            Some(_) => {
                return Err(TranscriptError::TypeMismatch {
                    field: format!("{}.words", path),
                    expected: "array",
                })
            }
        };

        Ok(TranscriptSegment { start, end, text, words })
    }

    fn parse_word(
        raw: &Value,
        segment_path: &str,
        index: usize,
    ) -> Result<WordEntry, TranscriptError> {
        let path = format!("{}.words[{}]", segment_path, index);
        let obj = raw.as_object().ok_or(TranscriptError::TypeMismatch {
            field: path.clone(),
            expected: "object",
        })?;

        let word = require_string(obj, &path, "word")?;
        let start = require_number(obj, &path, "start")?;

        let end = match obj.get("end") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_f64().ok_or(TranscriptError::TypeMismatch {
                field: format!("{}.end", path),
                expected: "number",
            })?),
        };

        Ok(WordEntry { word, start, end })
    }

    /// Full transcription text, segments joined by a single space.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|seg| seg.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total number of word entries across all segments.
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|seg| seg.words.len()).sum()
    }

    /// Whether any segment carries word-level timestamps.
    pub fn has_word_timestamps(&self) -> bool {
        self.segments.iter().any(|seg| !seg.words.is_empty())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn require_number(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<f64, TranscriptError> {
    let value = obj.get(key).ok_or(TranscriptError::MissingField {
        field: format!("{}.{}", path, key),
    })?;
    value.as_f64().ok_or(TranscriptError::TypeMismatch {
        field: format!("{}.{}", path, key),
        expected: "number",
    })
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, TranscriptError> {
    let value = obj.get(key).ok_or(TranscriptError::MissingField {
        field: format!("{}.{}", path, key),
    })?;
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or(TranscriptError::TypeMismatch {
            field: format!("{}.{}", path, key),
            expected: "string",
        })
}
