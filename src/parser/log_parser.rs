//! Incremental V8 log parser.
//!
//! The parser owns the log text and a cursor into it. Each call to
//! [`LogParser::step`] consumes at most a fixed number of whole lines,
//! so a host can interleave parsing with other work; it never suspends
//! mid-line. Symbol and stack state live inside the parser, which means a
//! parse cannot be resumed by a different parser instance.

use super::symbol_table::SymbolTable;
use super::v8_log::{parse_line, LogRecord};
use crate::aggregator::{CallTreeBuilder, ParseStats, Profile};
use crate::utils::config::{ModelConfig, UNKNOWN_SYMBOL};
use log::{debug, trace};

/// Outcome of one parsing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// More lines remain
    Pending,
    /// Every line has been consumed
    Complete,
}

/// Resumable parser state for one log
#[derive(Debug)]
pub struct LogParser {
    text: String,
    cursor: usize,
    position: usize,
    symbols: SymbolTable,
    builder: CallTreeBuilder,
    stats: ParseStats,
    tick_interval_ms: f64,
}

impl LogParser {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, &ModelConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: &ModelConfig) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            position: 0,
            symbols: SymbolTable::new(),
            builder: CallTreeBuilder::new(),
            stats: ParseStats::default(),
            tick_interval_ms: config.tick_interval_ms,
        }
    }

    /// Consume up to `max_lines` lines
    ///
    /// **Public** - called once per scheduler slice
    pub fn step(&mut self, max_lines: usize) -> ParseStatus {
        for _ in 0..max_lines {
            if self.is_complete() {
                break;
            }

            let rest = &self.text[self.cursor..];
            let (line_len, advance) = match rest.find('\n') {
                Some(newline) => (newline, newline + 1),
                None => (rest.len(), rest.len()),
            };
            let record = parse_line(&rest[..line_len]);
            self.cursor += advance;

            self.apply(record);
        }

        if self.is_complete() {
            ParseStatus::Complete
        } else {
            ParseStatus::Pending
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Lines consumed so far
    pub fn lines_consumed(&self) -> usize {
        self.position
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Consume whatever is left and produce the finished profile
    pub fn finish(mut self) -> Profile {
        while self.step(usize::MAX) == ParseStatus::Pending {}

        debug!(
            "Parsed {} lines: {} samples, {} symbols, {} skipped",
            self.stats.lines,
            self.stats.samples,
            self.symbols.len(),
            self.stats.skipped_lines
        );

        Profile::new(self.builder.finish(), self.tick_interval_ms, self.stats)
    }

    fn apply(&mut self, record: LogRecord) {
        let position = self.position;
        self.position += 1;
        self.stats.lines += 1;

        match record {
            LogRecord::CodeCreation {
                tag,
                address,
                size,
                name,
            } => {
                self.symbols.upsert(address, size, tag, name, position);
                self.stats.code_creations += 1;
            }
            LogRecord::CodeMove { from, to } => {
                if !self.symbols.relocate(from, to, position) {
                    trace!("code-move from unknown address {:#x}", from);
                }
                self.stats.code_moves += 1;
            }
            LogRecord::CodeDelete { address } => {
                self.symbols.delete(address, position);
                self.stats.code_deletes += 1;
            }
            LogRecord::Tick {
                address,
                stack_delta,
                ticks,
            } => {
                let weight = LogRecord::tick_weight(ticks);
                let symbol = self.symbols.resolve_name(address, position);
                if symbol == UNKNOWN_SYMBOL {
                    self.stats.unresolved_ticks = self.stats.unresolved_ticks.saturating_add(weight);
                }
                self.builder.add_sample(symbol, stack_delta, weight);
                self.stats.samples += 1;
                self.stats.ticks = self.stats.ticks.saturating_add(weight);
            }
            LogRecord::Malformed { kind } => {
                trace!("Skipping malformed {} record at line {}", kind, position);
                self.stats.skipped_lines += 1;
            }
            LogRecord::Unknown => {
                self.stats.skipped_lines += 1;
            }
        }
    }
}

/// Parse a complete log in one go
///
/// **Public** - convenience wrapper around [`LogParser`]
pub fn parse_log(text: &str) -> Profile {
    LogParser::new(text).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "code-creation,LoadIC,0x100,179,\"parentNode\"\ntick,0x100,+1,0\n";

    #[test]
    fn test_reference_fixture() {
        let profile = parse_log(FIXTURE);

        assert!((profile.total_time() - 1.0).abs() < 0.001);
        assert_eq!(profile.frame_count(), 1);
        let node = profile.find_path(&["parentNode"]).unwrap();
        assert_eq!(profile.node(node).unwrap().self_ticks(), 1);
    }

    #[test]
    fn test_step_respects_line_budget() {
        let mut parser = LogParser::new(FIXTURE);

        assert_eq!(parser.step(1), ParseStatus::Pending);
        assert_eq!(parser.lines_consumed(), 1);
        assert_eq!(parser.symbols().len(), 1);
        assert_eq!(parser.step(1), ParseStatus::Complete);
        assert!(parser.is_complete());
        assert_eq!(parser.step(10), ParseStatus::Complete);
        assert_eq!(parser.lines_consumed(), 2);
    }

    #[test]
    fn test_zero_budget_makes_no_progress() {
        let mut parser = LogParser::new(FIXTURE);
        assert_eq!(parser.step(0), ParseStatus::Pending);
        assert_eq!(parser.lines_consumed(), 0);
    }

    #[test]
    fn test_no_trailing_newline() {
        let profile = parse_log("code-creation,Function,0x1,4,f\ntick,0x1,+1,4");
        assert_eq!(profile.total_time(), 4.0);
    }

    #[test]
    fn test_tick_before_symbol_is_unknown() {
        let log = "tick,0x100,+1,1\ncode-creation,LoadIC,0x100,179,\"late\"\ntick,0x100,0,1\n";
        let profile = parse_log(log);

        assert!(profile.find_path(&[UNKNOWN_SYMBOL]).is_some());
        assert!(profile.find_path(&["late"]).is_some());
        assert_eq!(profile.stats().unresolved_ticks, 1);
    }

    #[test]
    fn test_address_reuse_attribution() {
        let log = "code-creation,LazyCompile,0x100,16,\"old\"\n\
                   tick,0x100,+1,2\n\
                   code-creation,LazyCompile,0x100,16,\"new\"\n\
                   tick,0x100,0,3\n";
        let profile = parse_log(log);

        let old = profile.find_path(&["old"]).unwrap();
        let new = profile.find_path(&["new"]).unwrap();
        assert_eq!(profile.self_time(old), 2.0);
        assert_eq!(profile.self_time(new), 3.0);
    }

    #[test]
    fn test_garbage_degrades_to_empty_profile() {
        let profile = parse_log("this is not a v8 log\n,,,\ntick,zz\n");

        assert!(profile.is_empty());
        assert_eq!(profile.total_time(), 0.0);
        assert_eq!(profile.stats().skipped_lines, 3);

        assert!(parse_log("").is_empty());
    }

    #[test]
    fn test_code_delete_and_move() {
        let log = "code-creation,Stub,0x10,8,\"stub\"\n\
                   code-move,0x10,0x80\n\
                   tick,0x80,+1,1\n\
                   code-delete,0x80\n\
                   tick,0x80,0,1\n";
        let profile = parse_log(log);

        assert!(profile.find_path(&["stub"]).is_some());
        assert!(profile.find_path(&[UNKNOWN_SYMBOL]).is_some());
        assert_eq!(profile.stats().code_moves, 1);
        assert_eq!(profile.stats().code_deletes, 1);
    }

    #[test]
    fn test_overflowing_tick_counts_saturate() {
        let log = "code-creation,LoadIC,0x1,4,f\n\
                   tick,0x1,+1,18446744073709551615\n\
                   tick,0x1,0,1\n\
                   tick,0x9,0,18446744073709551615\n";
        let profile = parse_log(log);

        let f = profile.find_path(&["f"]).unwrap();
        assert_eq!(profile.node(f).unwrap().self_ticks(), u64::MAX);
        assert_eq!(profile.tree().total_ticks(profile.root()), u64::MAX);
        assert_eq!(profile.stats().ticks, u64::MAX);
        assert_eq!(profile.stats().unresolved_ticks, u64::MAX);
        assert_eq!(profile.fraction_of_total(f), 1.0);
    }

    #[test]
    fn test_deterministic() {
        let log = "code-creation,LazyCompile,0x10,16,\"a\"\n\
                   code-creation,LazyCompile,0x20,16,\"b\"\n\
                   tick,0x10,+1,1\ntick,0x20,+1,2\ntick,0x10,-1,1\ntick,0x20,+1,1\n";
        assert_eq!(parse_log(log), parse_log(log));
    }

    #[test]
    fn test_custom_tick_interval() {
        let config = ModelConfig::new().with_tick_interval_ms(0.1);
        let profile = LogParser::with_config("tick,0x1,+1,10\n", &config).finish();
        assert!((profile.total_time() - 1.0).abs() < 1e-9);
    }
}
