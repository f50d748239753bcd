use crate::utils::config::{REPORT_SCHEMA_VERSION, SUPPORTED_FORMATS};

/// Display version information
pub fn display_version() {
    println!("V8 Profile Model v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!("Profile formats: {}", SUPPORTED_FORMATS.join(", "));
    println!();
    println!("Incremental V8 CPU-profiler log parsing and timeline correlation.");
}
