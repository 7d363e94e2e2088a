use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::set::KeywordSet;
use crate::transcription::transcript::{Transcript, TranscriptSegment};

/// Matching granularity.
///
/// Segment mode scans whole lowercased segment texts; word mode scans
/// individual word entries and timestamps the match at the word. Segment
/// mode is the default: it always has text to scan and its context string
/// is the full sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Segment,
    Word,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "segment" => Ok(MatchMode::Segment),
            "word" => Ok(MatchMode::Word),
            other => Err(format!("unknown match mode '{}', expected 'segment' or 'word'", other)),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Segment => write!(f, "segment"),
            MatchMode::Word => write!(f, "word"),
        }
    }
}

/// One keyword occurrence in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The keyword as originally supplied, original case
    pub keyword: String,
    /// Occurrence time in seconds: segment start in segment mode, word start
    /// in word mode
    pub time: f64,
    /// Lowercased text of the enclosing segment
    pub context: String,
}

/// The keyword-occurrence extractor.
///
/// Pure and deterministic: for a fixed transcript and keyword set the output
/// sequence is byte-identical across calls. Performs no I/O, holds no state
/// beyond its configuration, and is safe to call from any thread.
///
/// Matching is substring containment, not whole-word: "ai" matches inside
/// "said". Callers wanting to flag that should warn the user rather than
/// expect token-boundary behavior here.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    mode: MatchMode,
    word_fallback: bool,
}

impl KeywordMatcher {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode, word_fallback: false }
    }

    /// In word mode, match segments that carry no word entries in segment
    /// mode instead of skipping them.
    pub fn with_word_fallback(mut self, enable: bool) -> Self {
        self.word_fallback = enable;
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Scan the transcript for keyword occurrences.
    ///
    /// Records come out in segment order (time-ascending for a well-formed
    /// transcript), ties broken by keyword-list order. Each (segment,
    /// keyword) pair emits at most one record in segment mode; word mode
    /// emits one record per matching word entry.
    pub fn find_keywords(&self, transcript: &Transcript, keywords: &KeywordSet) -> Vec<MatchRecord> {
        let needles: Vec<(String, &str)> = keywords
            .keywords()
            .iter()
            .map(|k| (k.to_lowercase(), k.as_str()))
            .collect();

        let mut records = Vec::new();
        if needles.is_empty() {
            return records;
        }

        for segment in &transcript.segments {
            match self.mode {
                MatchMode::Segment => match_segment(segment, &needles, &mut records),
                MatchMode::Word => {
                    if segment.words.is_empty() {
                        if self.word_fallback {
                            match_segment(segment, &needles, &mut records);
                        }
                        // without the fallback, a segment with no word
                        // entries contributes nothing in word mode
                    } else {
                        match_words(segment, &needles, &mut records);
                    }
                }
            }
        }

        records
    }
}

fn match_segment(segment: &TranscriptSegment, needles: &[(String, &str)], out: &mut Vec<MatchRecord>) {
    let text = segment.text.to_lowercase();
    for (needle, original) in needles {
        if text.contains(needle.as_str()) {
            out.push(MatchRecord {
                keyword: (*original).to_string(),
                time: segment.start,
                context: text.clone(),
            });
        }
    }
}

fn match_words(segment: &TranscriptSegment, needles: &[(String, &str)], out: &mut Vec<MatchRecord>) {
    let context = segment.text.to_lowercase();
    for entry in &segment.words {
        let word = entry.word.to_lowercase();
        for (needle, original) in needles {
            if word.contains(needle.as_str()) {
                out.push(MatchRecord {
                    keyword: (*original).to_string(),
                    time: entry.start,
                    context: context.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::transcript::WordEntry;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
            words: vec![],
        }
    }

    fn word(word: &str, start: f64) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            start,
            end: None,
        }
    }

    #[test]
    fn test_segment_mode_basic_match() {
        let transcript = Transcript {
            segments: vec![segment(5.0, 8.0, "we discussed AI policy today")],
            language: None,
        };
        let keywords = KeywordSet::new(["ai"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(
            records,
            vec![MatchRecord {
                keyword: "ai".to_string(),
                time: 5.0,
                context: "we discussed ai policy today".to_string(),
            }]
        );
    }

    #[test]
    fn test_segment_mode_one_record_per_segment_keyword_pair() {
        // keyword appears twice in the text, still one record
        let transcript = Transcript {
            segments: vec![segment(0.0, 5.0, "AI here and AI there")],
            language: None,
        };
        let keywords = KeywordSet::new(["AI"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_segment_mode_multiple_keywords_same_segment_keep_list_order() {
        let transcript = Transcript {
            segments: vec![segment(3.0, 9.0, "the economy and technology intertwine")],
            language: None,
        };
        let keywords = KeywordSet::new(["technology", "economy"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keyword, "technology");
        assert_eq!(records[1].keyword, "economy");
        assert_eq!(records[0].time, 3.0);
        assert_eq!(records[1].time, 3.0);
    }

    #[test]
    fn test_substring_false_positive_is_expected() {
        // "ai" inside "said" matches; substring containment is intentional
        let transcript = Transcript {
            segments: vec![segment(1.0, 2.0, "said hello")],
            language: None,
        };
        let keywords = KeywordSet::new(["ai"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keyword, "ai");
        assert_eq!(records[0].time, 1.0);
    }

    #[test]
    fn test_matching_is_case_insensitive_keyword_case_preserved() {
        let transcript = Transcript {
            segments: vec![segment(0.0, 4.0, "Technology is everywhere")],
            language: None,
        };
        let keywords = KeywordSet::new(["TECHNOLOGY"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keyword, "TECHNOLOGY");
        assert_eq!(records[0].context, "technology is everywhere");
    }

    #[test]
    fn test_empty_keyword_set_yields_no_matches() {
        let transcript = Transcript {
            segments: vec![segment(0.0, 4.0, "anything at all")],
            language: None,
        };
        let keywords = KeywordSet::new(["", "   "]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        assert!(matcher.find_keywords(&transcript, &keywords).is_empty());
    }

    #[test]
    fn test_word_mode_times_match_at_the_word() {
        let mut seg = segment(10.0, 20.0, "we talk about technology now");
        seg.words = vec![
            word("we", 10.0),
            word("talk", 10.5),
            word("about", 11.0),
            word("technology", 12.5),
            word("now", 14.0),
        ];
        let transcript = Transcript { segments: vec![seg], language: None };
        let keywords = KeywordSet::new(["technology"]);
        let matcher = KeywordMatcher::new(MatchMode::Word);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time, 12.5);
        assert_eq!(records[0].context, "we talk about technology now");
    }

    #[test]
    fn test_word_mode_emits_per_matching_word() {
        let mut seg = segment(0.0, 6.0, "AI and more AI");
        seg.words = vec![word("AI", 0.0), word("and", 1.0), word("more", 2.0), word("AI", 3.0)];
        let transcript = Transcript { segments: vec![seg], language: None };
        let keywords = KeywordSet::new(["ai"]);
        let matcher = KeywordMatcher::new(MatchMode::Word);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, 0.0);
        assert_eq!(records[1].time, 3.0);
    }

    #[test]
    fn test_word_mode_skips_segments_without_word_entries() {
        let transcript = Transcript {
            segments: vec![segment(0.0, 4.0, "technology everywhere")],
            language: None,
        };
        let keywords = KeywordSet::new(["technology"]);
        let matcher = KeywordMatcher::new(MatchMode::Word);

        assert!(matcher.find_keywords(&transcript, &keywords).is_empty());
    }

    #[test]
    fn test_word_mode_fallback_matches_bare_segments() {
        let mut timed = segment(0.0, 4.0, "nothing to see");
        timed.words = vec![word("nothing", 0.0), word("to", 1.0), word("see", 2.0)];
        let bare = segment(4.0, 8.0, "technology everywhere");
        let transcript = Transcript { segments: vec![timed, bare], language: None };
        let keywords = KeywordSet::new(["technology"]);

        let matcher = KeywordMatcher::new(MatchMode::Word).with_word_fallback(true);
        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time, 4.0);
        assert_eq!(records[0].context, "technology everywhere");
    }

    #[test]
    fn test_deterministic_output() {
        let mut seg = segment(0.0, 5.0, "technology and the economy");
        seg.words = vec![
            word("technology", 0.2),
            word("and", 1.0),
            word("the", 1.2),
            word("economy", 1.5),
        ];
        let transcript = Transcript { segments: vec![seg], language: None };
        let keywords = KeywordSet::new(["economy", "technology"]);

        for mode in [MatchMode::Segment, MatchMode::Word] {
            let matcher = KeywordMatcher::new(mode);
            let first = matcher.find_keywords(&transcript, &keywords);
            let second = matcher.find_keywords(&transcript, &keywords);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_records_follow_segment_order() {
        let transcript = Transcript {
            segments: vec![
                segment(0.0, 4.0, "economy first"),
                segment(4.0, 8.0, "technology second"),
            ],
            language: None,
        };
        let keywords = KeywordSet::new(["technology", "economy"]);
        let matcher = KeywordMatcher::new(MatchMode::Segment);

        let records = matcher.find_keywords(&transcript, &keywords);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keyword, "economy");
        assert_eq!(records[0].time, 0.0);
        assert_eq!(records[1].keyword, "technology");
        assert_eq!(records[1].time, 4.0);
    }

    #[test]
    fn test_empty_transcript_yields_no_matches() {
        let transcript = Transcript::default();
        let keywords = KeywordSet::new(["technology"]);
        let matcher = KeywordMatcher::default();

        assert!(matcher.find_keywords(&transcript, &keywords).is_empty());
    }
}
