//! Scrape coordinator - pagination driver
//!
//! This module contains the page loop that ties the scraper together:
//! - Fetching the first catalog page and starting a fresh output
//! - Walking the numbered pages with a fixed pause between requests
//! - Appending each page's products to the record sink
//! - Collecting failed page URLs and writing them out at the end

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_and_extract, PageResult};
use crate::crawler::parser::{ProductRecord, TileSelectors};
use crate::output::{write_failure_log, CsvSink, RecordSink, ScrapeSummary};
use crate::state::RunState;
use crate::url::PagePlan;
use crate::{ConfigError, ScrapeError};
use chrono::Utc;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the driver needs to know about one run
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Which pages to visit
    pub plan: PagePlan,

    /// Pause before every paginated request
    pub delay: Duration,

    /// Compiled catalog selectors
    pub selectors: TileSelectors,

    /// Where failed page URLs are written
    pub errors_path: PathBuf,
}

impl ScrapeSettings {
    /// Derives run settings from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            plan: PagePlan::resolve(
                &config.catalog.base_url,
                config.catalog.last_page,
                config.catalog.start_page,
            ),
            delay: Duration::from_secs(config.catalog.delay_seconds),
            selectors: TileSelectors::new(&config.selectors)?,
            errors_path: PathBuf::from(&config.output.errors_path),
        })
    }
}

/// Main scrape coordinator structure
pub struct Coordinator<S: RecordSink> {
    settings: ScrapeSettings,
    client: Client,
    sink: S,
    state: RunState,
    summary: ScrapeSummary,
}

impl Coordinator<CsvSink> {
    /// Creates a coordinator writing to the CSV file named in the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Invalid selectors or the HTTP client failed to build
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let settings = ScrapeSettings::from_config(config)?;
        let client = build_http_client(&config.http)?;
        let sink = CsvSink::new(&config.output.csv_path);
        Ok(Self::new(settings, client, sink))
    }
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a coordinator from prepared parts
    pub fn new(settings: ScrapeSettings, client: Client, sink: S) -> Self {
        Self {
            settings,
            client,
            sink,
            state: RunState::Idle,
            summary: ScrapeSummary::new(),
        }
    }

    /// Current driver state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The record sink, e.g. to inspect it after a run
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the page loop to completion
    ///
    /// A failure on the first page ends the run with zero totals and leaves
    /// the sink untouched. Failures on later pages are recorded and skipped.
    /// An unexpected error on a later page stops the loop, keeping the pages
    /// already written.
    ///
    /// # Errors
    ///
    /// Only errors that happen before any output exists are returned:
    /// the first page's sink write, or an internal state violation. A failed
    /// first write still records the first URL in the failure log.
    pub async fn run(&mut self) -> Result<ScrapeSummary, ScrapeError> {
        self.state = RunState::Idle;
        self.summary = ScrapeSummary::new();
        let plan = self.settings.plan.clone();

        tracing::info!(
            "Scraping {} ({} pages, {}s between requests)",
            plan.first_url,
            plan.total_pages(),
            self.settings.delay.as_secs()
        );

        self.transition(RunState::Fetching(plan.first_page))?;
        let first =
            fetch_and_extract(&self.client, &plan.first_url, &self.settings.selectors).await;
        let records = match first {
            Ok(PageResult::Extracted { records }) => records,
            Ok(PageResult::Failed(failure)) => return self.fail_first_page(&plan, &failure),
            Err(e) => return self.fail_first_page(&plan, &e),
        };

        self.transition(RunState::Writing(plan.first_page))?;
        if let Err(e) = self.sink.create(&records) {
            tracing::error!("Failed to start output for {}: {}", plan.first_url, e);
            self.summary.failed_urls.push(plan.first_url.clone());
            self.abort()?;
            self.finish();
            return Err(e.into());
        }
        self.record_page(&records);

        for (index, url) in plan.paginated_urls() {
            tracing::info!(">>> Parse url: {}", url);
            tokio::time::sleep(self.settings.delay).await;

            self.transition(RunState::Fetching(index))?;
            match fetch_and_extract(&self.client, &url, &self.settings.selectors).await {
                Ok(PageResult::Extracted { records }) => {
                    self.transition(RunState::Writing(index))?;
                    if let Err(e) = self.sink.append(&records) {
                        tracing::error!("Failed to write page {}: {}", url, e);
                        self.summary.failed_urls.push(url);
                        self.abort()?;
                        break;
                    }
                    self.record_page(&records);
                }
                Ok(PageResult::Failed(failure)) => {
                    tracing::warn!("Error with connection to url: {} ({})", url, failure);
                    self.summary.failed_urls.push(url);
                    self.transition(RunState::Failed(index))?;
                }
                Err(e) => {
                    tracing::error!("Error: {}; stopping at page {}", e, index);
                    self.summary.failed_urls.push(url);
                    self.abort()?;
                    break;
                }
            }
        }

        if !self.state.is_terminal() {
            self.transition(RunState::Done)?;
        }

        Ok(self.finish())
    }

    /// Ends the run after the first page yielded nothing to write
    fn fail_first_page(
        &mut self,
        plan: &PagePlan,
        reason: &dyn fmt::Display,
    ) -> Result<ScrapeSummary, ScrapeError> {
        tracing::error!(
            "Error with connection to url: {} ({})",
            plan.first_url,
            reason
        );
        self.summary.failed_urls.push(plan.first_url.clone());
        self.transition(RunState::Failed(plan.first_page))?;
        self.transition(RunState::Done)?;
        Ok(self.finish())
    }

    /// Accumulates one successfully written page
    fn record_page(&mut self, records: &[ProductRecord]) {
        self.summary.pages_succeeded += 1;
        self.summary.goods_found += records.len();

        tracing::info!(
            "Successfully scraped: Pages: {}, Goods: {}",
            self.summary.pages_succeeded,
            self.summary.goods_found
        );
    }

    fn abort(&mut self) -> Result<(), ScrapeError> {
        self.summary.aborted = true;
        self.transition(RunState::Aborted)
    }

    /// Moves to `next`, rejecting any step the run state does not allow
    fn transition(&mut self, next: RunState) -> Result<(), ScrapeError> {
        if !self.state.can_transition_to(&next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("Run state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Writes the failure log and stamps the summary
    fn finish(&mut self) -> ScrapeSummary {
        // The summary is still worth returning if the log cannot be written
        if let Err(e) = write_failure_log(&self.settings.errors_path, &self.summary.failed_urls) {
            tracing::error!(
                "Failed to write {}: {}",
                self.settings.errors_path.display(),
                e
            );
        }

        self.summary.finished_at = Some(Utc::now());
        self.summary.clone()
    }
}

/// Runs a complete scrape from a configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(ScrapeSummary)` - Totals and failed pages of the run
/// * `Err(ScrapeError)` - The run could not start or write its first page
///
/// # Example
///
/// ```no_run
/// use catalog_scraper::config::load_config;
/// use catalog_scraper::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scraper.toml"))?;
/// let summary = run_scrape(&config).await?;
/// println!("{} goods", summary.goods_found);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: &Config) -> Result<ScrapeSummary, ScrapeError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
