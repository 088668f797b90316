//! Output module for product records and run reports
//!
//! This module handles:
//! - Streaming product records into a CSV file page by page
//! - Recording the URLs of pages that failed
//! - Rendering the end-of-run summary

mod csv_sink;
mod failures;
pub mod stats;
mod traits;

pub use csv_sink::{CsvSink, CSV_HEADER};
pub use failures::write_failure_log;
pub use stats::{format_summary, print_summary};
pub use traits::{OutputError, OutputResult, RecordSink, ScrapeSummary};
