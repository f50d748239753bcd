//! V8 profiler log parsing.
//!
//! This module handles:
//! - Decoding individual log lines
//! - Tracking code objects by address
//! - Incrementally folding ticks into a call tree

pub mod log_parser;
pub mod symbol_table;
pub mod v8_log;

// Re-export main types
pub use log_parser::{parse_log, LogParser, ParseStatus};
pub use symbol_table::{SymbolEntry, SymbolTable};
pub use v8_log::{parse_line, LogRecord};
