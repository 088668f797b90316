//! Run statistics printing
//!
//! This module renders a finished scrape summary for the terminal.

use crate::output::traits::ScrapeSummary;
use std::fmt::Write;

/// Formats the end-of-run report
///
/// The first two lines are always `COUNT PAGES` and `COUNT GOODS`.
pub fn format_summary(summary: &ScrapeSummary) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "COUNT PAGES: {}", summary.pages_succeeded);
    let _ = writeln!(out, "COUNT GOODS: {}", summary.goods_found);

    if !summary.failed_urls.is_empty() {
        let _ = writeln!(out, "\nFailed pages ({}):", summary.failed_urls.len());
        for url in &summary.failed_urls {
            let _ = writeln!(out, "  - {}", url);
        }
    }

    if summary.aborted {
        let _ = writeln!(out, "\nRun aborted early; results above are partial.");
    }

    let _ = writeln!(
        out,
        "\nSuccess Rate: {:.1}% ({} / {} pages)",
        summary.success_rate(),
        summary.pages_succeeded,
        summary.pages_attempted()
    );

    if let Some(seconds) = summary.duration_seconds() {
        let _ = writeln!(out, "Runtime: {:.6} seconds", seconds);
    }

    out
}

/// Prints the end-of-run report to stdout
pub fn print_summary(summary: &ScrapeSummary) {
    print!("{}", format_summary(summary));
}
