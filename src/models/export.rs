//! Dataset export request models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A search term and the label its images are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLabelPair {
    pub term: String,

    /// Folder name; the term itself is used when absent
    #[serde(default)]
    pub label: Option<String>,
}

impl TermLabelPair {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            label: None,
        }
    }

    /// Set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Folder name used for this pair's images
    pub fn label_or_term(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.term)
    }
}

/// Parses `term` or `term=label`
impl FromStr for TermLabelPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (term, label) = match s.split_once('=') {
            Some((term, label)) => (term.trim(), Some(label.trim())),
            None => (s.trim(), None),
        };

        if term.is_empty() {
            return Err(format!("empty search term in '{}'", s));
        }

        let pair = TermLabelPair::new(term);
        Ok(match label {
            Some(label) if !label.is_empty() => pair.label(label),
            _ => pair,
        })
    }
}

impl fmt::Display for TermLabelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}={}", self.term, label),
            None => f.write_str(&self.term),
        }
    }
}

/// Outcome counts of an export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Items written to disk or added to the archive
    pub stored: usize,

    /// Items left alone because the destination already existed
    pub skipped: usize,

    /// Items whose download or write failed
    pub failed: usize,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.stored + self.skipped + self.failed
    }
}
