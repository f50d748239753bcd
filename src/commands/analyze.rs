//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads a V8 profiler log from disk
//! 2. Parses it in bounded slices
//! 3. Calculates hot paths
//! 4. Writes the JSON report and/or prints a summary

use crate::aggregator::{build_collapsed_stacks, calculate_time_distribution, Profile};
use crate::output::{generate_text_summary, write_report, ProfileReport};
use crate::parser::{LogParser, ParseStatus};
use crate::utils::config::ModelConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// V8 log file to read
    pub log_path: PathBuf,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Number of top hot paths to include in the report
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,

    pub config: ModelConfig,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("v8.log"),
            output_json: None,
            top_paths: 20,
            print_summary: true,
            config: ModelConfig::default(),
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
pub fn execute_analyze(args: AnalyzeArgs) -> Result<ProfileReport> {
    let start_time = Instant::now();

    info!("Step 1/3: Reading log: {}", args.log_path.display());
    let text = std::fs::read_to_string(&args.log_path)
        .with_context(|| format!("Failed to read log file {}", args.log_path.display()))?;

    info!("Step 2/3: Parsing {} bytes...", text.len());
    let profile = parse_in_slices(text, &args.config);

    let stacks = build_collapsed_stacks(&profile);
    info!("Time distribution: {}", calculate_time_distribution(&stacks).summary());

    info!("Step 3/3: Building report...");
    let report = ProfileReport::from_profile(
        &profile,
        args.log_path.display().to_string(),
        args.top_paths,
    );

    for (i, path) in report.hot_paths.iter().take(3).enumerate() {
        debug!("  {}. {:.3} ms ({:.1}%): {}", i + 1, path.time_ms, path.percentage, path.stack);
    }

    if let Some(output) = &args.output_json {
        write_report(&report, output).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", output.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(72));
        println!("PROFILE SUMMARY: {}", args.log_path.display());
        println!("{}", "=".repeat(72));
        println!("{}", generate_text_summary(&profile, args.top_paths));
        println!("{}", "=".repeat(72));
    }

    info!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(report)
}

/// Drive a parser slice by slice, logging progress between slices
fn parse_in_slices(text: String, config: &ModelConfig) -> Profile {
    let mut parser = LogParser::with_config(text, config);
    let mut slices = 0usize;

    while parser.step(config.slice_budget()) == ParseStatus::Pending {
        slices += 1;
        if slices % 100 == 0 {
            debug!("{} lines parsed", parser.lines_consumed());
        }
    }

    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_execute_analyze_writes_report() {
        let mut log = NamedTempFile::new().unwrap();
        writeln!(log, "code-creation,LoadIC,0x100,179,\"parentNode\"").unwrap();
        writeln!(log, "tick,0x100,+1,0").unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("report.json");

        let report = execute_analyze(AnalyzeArgs {
            log_path: log.path().to_path_buf(),
            output_json: Some(output.clone()),
            print_summary: false,
            config: ModelConfig::new().with_lines_per_slice(1),
            ..AnalyzeArgs::default()
        })
        .unwrap();

        assert!(output.exists());
        assert!((report.total_time_ms - 1.0).abs() < 0.001);
        assert_eq!(report.hot_paths[0].stack, "parentNode");
    }

    #[test]
    fn test_parse_in_slices_with_zero_slice_field() {
        let config = ModelConfig {
            lines_per_slice: 0,
            ..ModelConfig::default()
        };
        let profile = parse_in_slices(
            "code-creation,LoadIC,0x100,179,\"parentNode\"\ntick,0x100,+1,0\n".to_string(),
            &config,
        );
        assert!((profile.total_time() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_missing_log_is_an_error() {
        let result = execute_analyze(AnalyzeArgs {
            log_path: PathBuf::from("/definitely/not/here.log"),
            print_summary: false,
            ..AnalyzeArgs::default()
        });
        assert!(result.is_err());
    }
}
