//! CSV record sink
//!
//! Writes product records with the columns
//! `name,link,new_price,old_price,reviews,characteristics`. Absent fields
//! become empty cells.

use crate::crawler::ProductRecord;
use crate::output::traits::{OutputResult, RecordSink};
use csv::{Writer, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column names, in record field order
pub const CSV_HEADER: [&str; 6] = [
    "name",
    "link",
    "new_price",
    "old_price",
    "reviews",
    "characteristics",
];

/// Record sink backed by a CSV file on disk
///
/// The file is opened and closed once per page.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing to `path`; nothing is touched until the first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn create(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer.write_record(CSV_HEADER)?;
        write_rows(&mut writer, records)?;
        writer.flush()?;

        tracing::debug!(
            "Created {} with {} rows",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    fn append(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADER)?;
        }
        write_rows(&mut writer, records)?;
        writer.flush()?;

        tracing::debug!(
            "Appended {} rows to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn write_rows<W: Write>(writer: &mut Writer<W>, records: &[ProductRecord]) -> OutputResult<()> {
    for record in records {
        writer.serialize(record)?;
    }
    Ok(())
}
