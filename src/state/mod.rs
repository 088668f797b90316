//! State module for tracking scrape progress
//!
//! # Components
//!
//! - `RunState`: Tracks the pagination driver from idle through each page to done/aborted

mod run_state;

// Re-export main types
pub use run_state::RunState;
