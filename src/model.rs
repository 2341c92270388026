// src/model.rs

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Seconds since the Unix epoch, taken from the committer time
pub type Timestamp = i64;

/// A commit on the sampled branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: git2::Oid,
    pub timestamp: Timestamp,
}

impl Commit {
    pub fn datetime(&self) -> DateTime<Utc> {
        to_datetime(self.timestamp)
    }
}

pub fn to_datetime(timestamp: Timestamp) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Counts reported by the line counter for one language (or the aggregate row)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageMetric {
    pub language: String,
    pub files: u64,
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

/// Metrics captured at one sampled commit.
///
/// `total` is the counter's own aggregate row and is not guaranteed to equal
/// the sum of `languages`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    pub total: LanguageMetric,
    pub languages: BTreeMap<String, LanguageMetric>,
}

/// Ordered `(timestamp, value)` pairs for one metric
pub type TimeSeries = Vec<(Timestamp, u64)>;

/// Code-line series for one selected language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSeries {
    pub language: String,
    pub points: TimeSeries,
}

/// The aggregated result handed to the renderer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Growth {
    /// Selected languages, largest (by code lines in the last snapshot) first
    pub languages: Vec<LanguageSeries>,
    pub total: TimeSeries,
}

impl Growth {
    #[cfg(test)]
    pub fn language(&self, name: &str) -> Option<&TimeSeries> {
        self.languages
            .iter()
            .find(|series| series.language == name)
            .map(|series| &series.points)
    }
}
