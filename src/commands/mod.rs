//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod replay;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, AnalyzeArgs};
pub use replay::{execute_replay, ReplayArgs};
pub use utils::display_version;
