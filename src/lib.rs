//! V8 Profile Model
//!
//! Incremental parsing of V8 CPU-profiler logs into symbolicated call
//! trees, and correlation of the resulting profiles with the timeline
//! events whose execution produced them.
//!
//! ## Getting Started
//!
//! ```ignore
//! use std::rc::Rc;
//! use v8_profile_model::model::{ProfileModel, ProfileEvent, TaskQueue, TimelineStore, UiEvent};
//!
//! let store = Rc::new(TimelineStore::new());
//! let queue = TaskQueue::new();
//! let model = ProfileModel::new(Rc::clone(&store), queue.clone());
//!
//! store.put(UiEvent::new(1, 1.0, 10));
//! let record = store.put(ProfileEvent::new(2, 2.0, "v8", log_text));
//! if let Some(callback) = model.get_event_callback(&record) {
//!     callback.on_event_record(&record);
//! }
//! queue.run_until_idle();
//! let profile = model.get_profile_for_event(1);
//! ```

pub mod aggregator;
pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
