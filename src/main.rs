//! Catalog Scraper main entry point
//!
//! This is the command-line interface for the catalog scraper.

use catalog_scraper::config::{load_config, validate, Config};
use catalog_scraper::ConfigError;
use catalog_scraper::crawler::{run_scrape, ScrapeSettings};
use catalog_scraper::output::print_summary;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog Scraper: paginated product catalog to CSV
///
/// Walks the numbered pages of a product catalog, keeps the in-stock
/// products of each page and appends them to a CSV file. Page URLs that
/// fail are listed in a separate log at the end of the run.
#[derive(Parser, Debug)]
#[command(name = "catalog-scraper")]
#[command(version)]
#[command(about = "Scrape a paginated product catalog into CSV", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the pages that would be fetched without fetching them
    #[arg(long)]
    dry_run: bool,

    /// Override the last page index from the config
    #[arg(long, value_name = "N")]
    last_page: Option<u32>,

    /// Override the pause between requests from the config
    #[arg(long, value_name = "SECONDS")]
    delay_seconds: Option<u64>,

    /// Override the CSV output path from the config
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(last_page) = self.last_page {
            config.catalog.last_page = last_page;
        }
        if let Some(delay) = self.delay_seconds {
            config.catalog.delay_seconds = delay;
        }
        if let Some(output) = &self.output {
            config.output.csv_path = output.clone();
        }
    }

    /// Loads the config file, applies the overrides and validates the result
    fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = load_config(&self.config)?;
        self.apply_overrides(&mut config);
        validate(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_scrape(&config).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber
///
/// Without `-v` or `-q`, `RUST_LOG` wins when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("catalog_scraper=info,warn")),
        (false, 1) => EnvFilter::new("catalog_scraper=debug,info"),
        (false, 2) => EnvFilter::new("catalog_scraper=trace,debug"),
        (false, _) => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved page plan
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = ScrapeSettings::from_config(config)?;
    let plan = &settings.plan;

    println!("=== Catalog Scraper Dry Run ===\n");

    println!("Catalog:");
    println!("  First page: {} (page {})", plan.first_url, plan.first_page);
    println!("  Catalog root: {}", plan.catalog_root);
    println!("  Pages: {} .. {}", plan.start_page, plan.last_page);
    println!("  Delay between requests: {}s", settings.delay.as_secs());

    println!("\nHTTP:");
    println!("  User-Agent: {}", config.http.user_agent);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.http.timeout_seconds, config.http.connect_timeout_seconds
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Failed pages: {}", config.output.errors_path);

    println!("\nSelectors:");
    println!("  Tile: {}", config.selectors.tile);
    println!("  In-stock label: {}", settings.selectors.in_stock());

    println!("\nPage URLs:");
    println!("  {}", plan.first_url);
    for (_, url) in plan.paginated_urls() {
        println!("  {}", url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would request {} pages", plan.total_pages());

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Writing products to {} (failed pages to {})",
        config.output.csv_path,
        config.output.errors_path
    );

    match run_scrape(config).await {
        Ok(summary) => {
            tracing::info!("Scrape finished");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
