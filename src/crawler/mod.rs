//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching and response classification
//! - HTML parsing and product tile extraction
//! - The pagination driver that walks the catalog

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_scrape, Coordinator, ScrapeSettings};
pub use fetcher::{build_http_client, fetch_and_extract, PageFailure, PageResult};
pub use parser::{digits_only, extract_products, split_name, ProductRecord, TileSelectors};
