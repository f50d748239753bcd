//! Replay command implementation.
//!
//! Feeds a recorded timeline (JSON array of records) through the profile
//! model, runs the cooperative scheduler until every parse has finished,
//! then lists the UI events that received a profile.

use crate::model::{
    read_records, ProfileModel, ProfiledEvent, ProfiledEventCollector, TaskQueue,
    TimelineStore,
};
use crate::output::generate_text_summary;
use crate::utils::config::ModelConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::rc::Rc;

/// Arguments for the replay command
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Timeline JSON file
    pub timeline_path: PathBuf,

    /// Print a text summary per profiled event
    pub print_summary: bool,

    /// Number of hot paths per summary
    pub top_paths: usize,

    pub config: ModelConfig,
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
pub fn execute_replay(args: ReplayArgs) -> Result<Vec<ProfiledEvent>> {
    let records = read_records(&args.timeline_path).with_context(|| {
        format!("Failed to load timeline {}", args.timeline_path.display())
    })?;
    info!("Replaying {} timeline records", records.len());

    let store = Rc::new(TimelineStore::new());
    let queue = TaskQueue::new();
    let model = ProfileModel::new(Rc::clone(&store), queue.clone()).with_config(args.config);

    let mut started = 0usize;
    for record in records {
        let record = store.put(record);
        if let Some(callback) = model.get_event_callback(&record) {
            if callback.on_event_record(&record).is_some() {
                started += 1;
            }
        } else if let Some(event) = record.as_profile_event() {
            warn!(
                "Skipping profile record {} in unsupported format '{}'",
                event.sequence(),
                event.format()
            );
        }
        // Let parses interleave with record delivery, as a live timeline would
        queue.run_at_most(1);
    }

    let slices = queue.run_until_idle();
    debug!("Drained {} remaining parse slices", slices);

    let mut collector = ProfiledEventCollector::new();
    model.visit_events_with_profiles(&mut collector);
    info!(
        "{} of {} profile records attached to UI events",
        collector.events.len(),
        started
    );

    for event in &collector.events {
        println!(
            "event {:>6}: {:>10.3} ms across {} frames",
            event.sequence, event.total_time_ms, event.frame_count
        );
        if args.print_summary {
            if let Some(profile) = model.get_profile_for_event(event.sequence) {
                println!("{}\n", generate_text_summary(&profile, args.top_paths));
            }
        }
    }

    Ok(collector.events)
}
