//! Failed page log
//!
//! Page URLs that did not yield records are written one per line at the
//! end of a run, so they can be retried by hand.

use crate::output::traits::OutputResult;
use std::path::Path;

/// Writes `urls` to `path`, one per line, replacing any previous log
///
/// Nothing is written when `urls` is empty.
///
/// # Returns
///
/// * `Ok(true)` - The log was written
/// * `Ok(false)` - There was nothing to write
/// * `Err(OutputError)` - The file could not be written
pub fn write_failure_log(path: &Path, urls: &[String]) -> OutputResult<bool> {
    if urls.is_empty() {
        return Ok(false);
    }

    let mut content = urls.join("\n");
    content.push('\n');
    std::fs::write(path, content)?;

    tracing::info!("Wrote {} failed URLs to {}", urls.len(), path.display());
    Ok(true)
}
