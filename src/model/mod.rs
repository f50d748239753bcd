//! Timeline-facing profile model.
//!
//! This module handles:
//! - Recognizing profile records on the timeline
//! - Driving the log parser in cooperative slices
//! - Correlating finished profiles with their UI events
//! - Answering queries over profiled events

pub mod correlation;
pub mod profile_model;
pub mod scheduler;
pub mod timeline;
pub mod visitor;

// Re-export main types
pub use correlation::{AdjacentSequence, CorrelationPolicy, NearestPrecedingUiEvent};
pub use profile_model::{EventCallback, ProfileHandle, ProfileModel};
pub use scheduler::{Scheduler, Task, TaskQueue};
pub use timeline::{
    decode_record, decode_records, read_records, EventRecordLookup, ProfileEvent, TimelineRecord,
    TimelineStore, UiEvent,
};
pub use visitor::{EventVisitor, ProfiledEvent, ProfiledEventCollector};
