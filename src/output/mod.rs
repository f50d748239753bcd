//! Output writers for profile data.
//!
//! This module handles:
//! - The versioned JSON report schema
//! - Writing JSON reports
//! - Text summaries

pub mod json;
pub mod schema;
pub mod summary;

// Re-export main functions
pub use json::{report_to_string, write_report};
pub use schema::{ProfileReport, ReportNode};
pub use summary::generate_text_summary;
