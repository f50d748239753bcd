//! Timeline records consumed by the profile model.
//!
//! The timeline store that assigns sequence numbers is an external
//! collaborator; the model only reads it through [`EventRecordLookup`].
//! [`TimelineStore`] is a minimal in-memory implementation for the CLI
//! and tests.

use crate::aggregator::Profile;
use crate::utils::config::PROFILE_RECORD_TYPE;
use crate::utils::error::ParseError;
use serde::Deserialize;
use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

/// Observable work on the timeline (script evaluation, layout, ...)
///
/// Gains at most one attached [`Profile`] once correlation succeeds.
#[derive(Debug)]
pub struct UiEvent {
    sequence: u32,
    time: f64,
    kind: u32,
    data: serde_json::Value,
    profile: OnceCell<Rc<Profile>>,
}

impl UiEvent {
    pub fn new(sequence: u32, time: f64, kind: u32) -> Self {
        Self {
            sequence,
            time,
            kind,
            data: serde_json::Value::Null,
            profile: OnceCell::new(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Record type discriminator as reported by the producer
    pub fn kind(&self) -> u32 {
        self.kind
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    pub fn has_profile(&self) -> bool {
        self.profile.get().is_some()
    }

    pub fn profile(&self) -> Option<Rc<Profile>> {
        self.profile.get().cloned()
    }

    /// First attachment wins; returns false if a profile was already set
    pub(crate) fn attach_profile(&self, profile: Rc<Profile>) -> bool {
        self.profile.set(profile).is_ok()
    }
}

/// A raw profiler log covering the execution window of one UI event
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEvent {
    sequence: u32,
    time: f64,
    format: String,
    profile_data: String,
}

impl ProfileEvent {
    pub fn new(
        sequence: u32,
        time: f64,
        format: impl Into<String>,
        profile_data: impl Into<String>,
    ) -> Self {
        Self {
            sequence,
            time,
            format: format.into(),
            profile_data: profile_data.into(),
        }
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Format tag, e.g. "v8"
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn profile_data(&self) -> &str {
        &self.profile_data
    }
}

/// A record on the timeline
#[derive(Debug, Clone)]
pub enum TimelineRecord {
    Ui(Rc<UiEvent>),
    Profile(Rc<ProfileEvent>),
}

impl TimelineRecord {
    pub fn sequence(&self) -> u32 {
        match self {
            Self::Ui(event) => event.sequence(),
            Self::Profile(event) => event.sequence(),
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            Self::Ui(event) => event.time(),
            Self::Profile(event) => event.time(),
        }
    }

    pub fn as_ui_event(&self) -> Option<&Rc<UiEvent>> {
        match self {
            Self::Ui(event) => Some(event),
            Self::Profile(_) => None,
        }
    }

    pub fn as_profile_event(&self) -> Option<&Rc<ProfileEvent>> {
        match self {
            Self::Profile(event) => Some(event),
            Self::Ui(_) => None,
        }
    }
}

impl From<UiEvent> for TimelineRecord {
    fn from(event: UiEvent) -> Self {
        Self::Ui(Rc::new(event))
    }
}

impl From<ProfileEvent> for TimelineRecord {
    fn from(event: ProfileEvent) -> Self {
        Self::Profile(Rc::new(event))
    }
}

/// Read-only access to previously recorded timeline records
pub trait EventRecordLookup {
    /// The record stored under exactly `sequence`, if any
    fn find_event_record(&self, sequence: u32) -> Option<TimelineRecord>;
}

impl<T: EventRecordLookup + ?Sized> EventRecordLookup for Rc<T> {
    fn find_event_record(&self, sequence: u32) -> Option<TimelineRecord> {
        (**self).find_event_record(sequence)
    }
}

/// In-memory timeline keyed by sequence number
#[derive(Debug, Default)]
pub struct TimelineStore {
    records: RefCell<BTreeMap<u32, TimelineRecord>>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing any previous one at the same sequence
    pub fn put(&self, record: impl Into<TimelineRecord>) -> TimelineRecord {
        let record = record.into();
        self.records
            .borrow_mut()
            .insert(record.sequence(), record.clone());
        record
    }

    pub fn ui_event(&self, sequence: u32) -> Option<Rc<UiEvent>> {
        self.records
            .borrow()
            .get(&sequence)
            .and_then(|r| r.as_ui_event().cloned())
    }

    /// All records in ascending sequence order
    pub fn records(&self) -> Vec<TimelineRecord> {
        self.records.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl EventRecordLookup for TimelineStore {
    fn find_event_record(&self, sequence: u32) -> Option<TimelineRecord> {
        self.records.borrow().get(&sequence).cloned()
    }
}

/// Wire shape of a timeline record
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    kind: u32,
    #[serde(default)]
    time: f64,
    sequence: u32,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfileData {
    #[serde(default)]
    format: String,
    #[serde(default, rename = "profileData")]
    profile_data: String,
}

/// Decode one `{type, time, sequence, data}` record
///
/// Type 15 is a JavaScript profile record; every other type is a UI event.
pub fn decode_record(value: serde_json::Value) -> Result<TimelineRecord, ParseError> {
    let raw: RawRecord = serde_json::from_value(value)?;

    if raw.kind == PROFILE_RECORD_TYPE {
        let data: RawProfileData = if raw.data.is_null() {
            RawProfileData::default()
        } else {
            serde_json::from_value(raw.data)?
        };
        return Ok(ProfileEvent::new(raw.sequence, raw.time, data.format, data.profile_data).into());
    }

    Ok(UiEvent::new(raw.sequence, raw.time, raw.kind)
        .with_data(raw.data)
        .into())
}

/// Decode a JSON array of timeline records
pub fn decode_records(json: &str) -> Result<Vec<TimelineRecord>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ParseError::InvalidFormat(
            "Timeline must be a JSON array of records".to_string(),
        ));
    };

    items.into_iter().map(decode_record).collect()
}

/// Read and decode a timeline file
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<TimelineRecord>, ParseError> {
    let json = std::fs::read_to_string(path)?;
    decode_records(&json)
}
