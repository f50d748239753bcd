//! Configuration and constants for the profile model.

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Profile data formats the model knows how to parse
pub const SUPPORTED_FORMATS: &[&str] = &["v8"];

/// Lines consumed per cooperative slice before the parser yields
pub const DEFAULT_LINES_PER_SLICE: usize = 1_000;

/// One tick is one sampling interval of the producing instrumentation
pub const DEFAULT_TICK_INTERVAL_MS: f64 = 1.0;

/// Name given to frames whose address has no live symbol
pub const UNKNOWN_SYMBOL: &str = "unknown";

/// Name of the single root node of every call tree
pub const ROOT_SYMBOL: &str = "(root)";

/// Timeline record type carrying a JavaScript CPU profile
pub const PROFILE_RECORD_TYPE: u32 = 15;

// Log record tags (first comma-separated field of a line)
pub const CODE_CREATION_TAG: &str = "code-creation";
pub const CODE_MOVE_TAG: &str = "code-move";
pub const CODE_DELETE_TAG: &str = "code-delete";
pub const TICK_TAG: &str = "tick";

/// Tunables for parsing and scheduling
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Maximum number of log lines handled per scheduler slice
    pub lines_per_slice: usize,

    /// Milliseconds attributed to a single tick
    pub tick_interval_ms: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            lines_per_slice: DEFAULT_LINES_PER_SLICE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slice always makes progress, so zero is bumped to one.
    pub fn with_lines_per_slice(mut self, lines: usize) -> Self {
        self.lines_per_slice = lines.max(1);
        self
    }

    pub fn with_tick_interval_ms(mut self, interval: f64) -> Self {
        self.tick_interval_ms = interval;
        self
    }

    /// Lines to parse in one slice; never zero, even if the field was set directly
    pub fn slice_budget(&self) -> usize {
        self.lines_per_slice.max(1)
    }
}

/// Whether the model can parse profile data tagged with `format`
pub fn is_supported_format(format: &str) -> bool {
    SUPPORTED_FORMATS.contains(&format)
}
