use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

/// User-supplied keywords, normalized for matching.
///
/// Entries are trimmed on construction; entries that are empty after trimming
/// are dropped. Duplicates are removed case-insensitively, keeping the first
/// spelling supplied. Supplied order and original case are preserved for
/// display and for tie-breaking between matches at the same timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for entry in raw {
            let trimmed = entry.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            if seen.contains(&lowered) {
                continue;
            }
            seen.push(lowered);
            keywords.push(trimmed.to_string());
        }

        Self { keywords }
    }

    /// Load keywords from a file, one per line. Blank lines and lines
    /// starting with `#` are skipped.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| anyhow!("failed to read keywords file {}: {}", path.as_ref().display(), e))?;

        let set = Self::new(
            content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        );

        info!("📚 Loaded {} keywords from: {}", set.len(), path.as_ref().display());
        Ok(set)
    }

    /// Keywords in supplied order, original case, trimmed.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords shorter than `min_len` characters, prone to substring
    /// false positives ("ai" matches inside "said").
    pub fn short_keywords(&self, min_len: usize) -> Vec<&str> {
        self.keywords
            .iter()
            .filter(|k| k.chars().count() < min_len)
            .map(|k| k.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl std::fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keywords.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_empty_entries() {
        let set = KeywordSet::new(["  AI ", "", "   ", "economy"]);
        assert_eq!(set.keywords(), &["AI".to_string(), "economy".to_string()]);
    }

    #[test]
    fn test_dedup_is_case_insensitive_and_keeps_first_spelling() {
        let set = KeywordSet::new(["AI", "ai", "Economy", "ECONOMY"]);
        assert_eq!(set.keywords(), &["AI".to_string(), "Economy".to_string()]);
    }

    #[test]
    fn test_preserves_supplied_order() {
        let set = KeywordSet::new(["zebra", "apple", "mango"]);
        assert_eq!(
            set.keywords(),
            &["zebra".to_string(), "apple".to_string(), "mango".to_string()]
        );
    }

    #[test]
    fn test_short_keywords() {
        let set = KeywordSet::new(["AI", "economy", "go"]);
        assert_eq!(set.short_keywords(3), vec!["AI", "go"]);
    }

    #[test]
    fn test_empty_input_is_legal() {
        let set = KeywordSet::new(Vec::<String>::new());
        assert!(set.is_empty());
    }
}
