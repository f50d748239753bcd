//! Line grammar of the V8 CPU-profiler log.
//!
//! Every line is a comma-separated record whose first field names the
//! record kind. Fields may be double-quoted so that names can contain
//! commas; a doubled quote inside a quoted field is a literal quote.
//!
//! Recognized records:
//! - `code-creation,<tag>,<address>,<size>,<name>`
//! - `code-move,<from>,<to>`
//! - `code-delete,<address>`
//! - `tick,<address>,<stackDelta>,<ticks>`
//!
//! Anything else is reported as [`LogRecord::Unknown`] so the parser can
//! skip it without failing.

use crate::utils::config::{CODE_CREATION_TAG, CODE_DELETE_TAG, CODE_MOVE_TAG, TICK_TAG};

/// A single decoded log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A code object was created at `address`
    CodeCreation {
        tag: String,
        address: u64,
        size: u64,
        name: String,
    },

    /// A code object moved from one address to another
    CodeMove { from: u64, to: u64 },

    /// A code object was deleted
    CodeDelete { address: u64 },

    /// One stack sample
    Tick {
        address: u64,
        stack_delta: i32,
        /// Raw `<ticks>` field, `None` when omitted
        ticks: Option<u64>,
    },

    /// A recognized record kind with missing or unparseable fields
    Malformed { kind: String },

    /// A record kind this parser does not understand (or a blank line)
    Unknown,
}

impl LogRecord {
    /// Sample weight of a tick record.
    ///
    /// A tick always stands for at least one sample; a zero or missing
    /// `<ticks>` field counts as one.
    pub fn tick_weight(ticks: Option<u64>) -> u64 {
        ticks.unwrap_or(1).max(1)
    }
}

/// Decode one log line
///
/// **Public** - used by the incremental log parser
///
/// Never fails: lines that do not match the grammar come back as
/// [`LogRecord::Unknown`] or [`LogRecord::Malformed`].
pub fn parse_line(line: &str) -> LogRecord {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return LogRecord::Unknown;
    }

    let fields = split_fields(line);
    let Some(kind) = fields.first() else {
        return LogRecord::Unknown;
    };

    let record = match kind.as_str() {
        CODE_CREATION_TAG => parse_code_creation(&fields),
        CODE_MOVE_TAG => parse_code_move(&fields),
        CODE_DELETE_TAG => parse_code_delete(&fields),
        TICK_TAG => parse_tick(&fields),
        _ => return LogRecord::Unknown,
    };

    record.unwrap_or_else(|| LogRecord::Malformed { kind: kind.clone() })
}

fn parse_code_creation(fields: &[String]) -> Option<LogRecord> {
    let tag = fields.get(1)?;
    let address = parse_address(fields.get(2)?)?;
    let size = fields.get(3).and_then(|s| s.trim().parse().ok()).unwrap_or(0);
    let name = fields.get(4)?;

    Some(LogRecord::CodeCreation {
        tag: tag.clone(),
        address,
        size,
        name: name.clone(),
    })
}

fn parse_code_move(fields: &[String]) -> Option<LogRecord> {
    let from = parse_address(fields.get(1)?)?;
    let to = parse_address(fields.get(2)?)?;
    Some(LogRecord::CodeMove { from, to })
}

fn parse_code_delete(fields: &[String]) -> Option<LogRecord> {
    let address = parse_address(fields.get(1)?)?;
    Some(LogRecord::CodeDelete { address })
}

fn parse_tick(fields: &[String]) -> Option<LogRecord> {
    let address = parse_address(fields.get(1)?)?;

    let stack_delta = match fields.get(2).map(|s| s.trim()) {
        None | Some("") => 0,
        Some(delta) => delta.parse::<i32>().ok()?,
    };

    let ticks = match fields.get(3).map(|s| s.trim()) {
        None | Some("") => None,
        Some(count) => Some(count.parse::<u64>().ok()?),
    };

    Some(LogRecord::Tick {
        address,
        stack_delta,
        ticks,
    })
}

/// Parse an address field: `0x`-prefixed hex or plain decimal
///
/// **Public** - also useful to callers that key their own data by address
pub fn parse_address(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

/// Split a line on commas, honoring double quotes
///
/// **Private** - quotes are removed from the returned fields
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}
