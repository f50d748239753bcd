//! V8 Profile Model CLI
//!
//! Parses V8 CPU-profiler logs and replays recorded timelines through the
//! profile model.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use v8_profile_model::commands::{
    display_version, execute_analyze, execute_replay, AnalyzeArgs, ReplayArgs,
};
use v8_profile_model::utils::config::{ModelConfig, DEFAULT_LINES_PER_SLICE};

/// V8 Profile Model - CPU profile parsing for timeline events
#[derive(Parser, Debug)]
#[command(name = "v8-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a V8 profiler log file
    Analyze {
        /// Path to the V8 log
        #[arg(short, long)]
        log: PathBuf,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value = "20")]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Log lines parsed per slice
        #[arg(long, default_value_t = DEFAULT_LINES_PER_SLICE, env = "V8_PROFILE_SLICE_LINES")]
        slice_lines: usize,

        /// Milliseconds represented by one tick
        #[arg(long, default_value = "1.0")]
        tick_ms: f64,
    },

    /// Replay a JSON timeline through the profile model
    Replay {
        /// Path to a JSON array of timeline records
        #[arg(short, long)]
        timeline: PathBuf,

        /// Print a text summary for every profiled event
        #[arg(long)]
        summary: bool,

        /// Number of top hot paths per summary
        #[arg(long, default_value = "10")]
        top_paths: usize,

        /// Log lines parsed per slice
        #[arg(long, default_value_t = DEFAULT_LINES_PER_SLICE, env = "V8_PROFILE_SLICE_LINES")]
        slice_lines: usize,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            log,
            output,
            top_paths,
            summary,
            slice_lines,
            tick_ms,
        } => {
            let config = ModelConfig::new()
                .with_lines_per_slice(slice_lines)
                .with_tick_interval_ms(tick_ms);

            execute_analyze(AnalyzeArgs {
                log_path: log,
                output_json: output,
                top_paths,
                print_summary: summary,
                config,
            })?;
        }

        Commands::Replay {
            timeline,
            summary,
            top_paths,
            slice_lines,
        } => {
            execute_replay(ReplayArgs {
                timeline_path: timeline,
                print_summary: summary,
                top_paths,
                config: ModelConfig::new().with_lines_per_slice(slice_lines),
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
