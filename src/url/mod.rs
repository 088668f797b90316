//! URL handling module for the catalog scraper
//!
//! This module builds the numbered page URLs of a catalog and works out
//! where pagination starts when the base URL already points at a page.

mod pagination;

// Re-export main types and functions
pub use pagination::{page_url, split_page_url, PagePlan, DEFAULT_START_PAGE};
