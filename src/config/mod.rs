//! Configuration module for the catalog scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Will scrape up to page {}", config.catalog.last_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, HttpConfig, OutputConfig, SelectorConfig};

// Re-export parser functions
pub use parser::load_config;
pub use validation::validate;
