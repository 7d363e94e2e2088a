use anyhow::Result;
use chrono::Local;
use std::path::Path;

use crate::keywords::{KeywordSet, MatchRecord};

/// Format seconds as `HH:MM:SS` with floor division.
///
/// Hours are unbounded, there is no day rollover: 90061 seconds renders as
/// "25:01:01".
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Renders match records as a human-readable report.
///
/// Records render in the order they were added. An empty report renders a
/// single explicit "No keywords found." line rather than an empty list.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    records: Vec<MatchRecord>,
    include_context: bool,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render each record with its context line (the richer display mode).
    pub fn with_context(mut self, enable: bool) -> Self {
        self.include_context = enable;
        self
    }

    pub fn add_record(&mut self, record: MatchRecord) {
        self.records.push(record);
    }

    pub fn add_records<I: IntoIterator<Item = MatchRecord>>(&mut self, records: I) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the report body.
    pub fn generate(&self) -> String {
        if self.records.is_empty() {
            return "No keywords found.\n".to_string();
        }

        let mut out = String::from("Keyword occurrences:\n");
        for record in &self.records {
            let time = format_time(record.time);
            if self.include_context {
                out.push_str(&format!(
                    "• {} at {}\n  Context: {}\n\n",
                    record.keyword, time, record.context
                ));
            } else {
                out.push_str(&format!("Keyword '{}' found at {}\n", record.keyword, time));
            }
        }
        out
    }

    /// Save the report to a file with a short provenance header.
    pub async fn save_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        source: &Path,
        keywords: &KeywordSet,
    ) -> Result<()> {
        let header = format!(
            "# Keyword report for {}\n# Keywords: {}\n# Generated: {}\n\n",
            source.display(),
            keywords,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
        let content = format!("{}{}", header, self.generate());
        tokio::fs::write(path.as_ref(), content).await?;
        Ok(())
    }
}
