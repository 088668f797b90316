//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the
//! summary a scrape run produces.

use crate::crawler::ProductRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of one scrape run
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    /// Pages that yielded a record list
    pub pages_succeeded: u32,

    /// In-stock products written across all pages
    pub goods_found: usize,

    /// Page URLs that failed, in the order they were visited
    pub failed_urls: Vec<String>,

    /// True when an unexpected error cut the page loop short
    pub aborted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ScrapeSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeSummary {
    /// Creates an empty summary stamped with the current time
    pub fn new() -> Self {
        Self {
            pages_succeeded: 0,
            goods_found: 0,
            failed_urls: Vec::new(),
            aborted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Pages requested so far, successful or not
    pub fn pages_attempted(&self) -> u32 {
        self.pages_succeeded + self.failed_urls.len() as u32
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / attempted as f64) * 100.0
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

/// Trait for record sinks
///
/// The first page of a run replaces whatever the sink held before; every
/// later page is appended.
pub trait RecordSink {
    /// Starts a fresh output with the header and the first page's records
    ///
    /// # Arguments
    ///
    /// * `records` - Records of the first page (may be empty)
    fn create(&mut self, records: &[ProductRecord]) -> OutputResult<()>;

    /// Appends one page's records to the output
    ///
    /// # Arguments
    ///
    /// * `records` - Records of a later page (may be empty)
    fn append(&mut self, records: &[ProductRecord]) -> OutputResult<()>;
}
