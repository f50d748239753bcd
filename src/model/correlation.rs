//! Which UI event does a profile record belong to?
//!
//! The producer records a profile snapshot right after the UI event whose
//! execution it covers, so by default the owner is the record with the
//! previous sequence number. Producers that interleave other records can
//! use [`NearestPrecedingUiEvent`] instead.

use super::timeline::{EventRecordLookup, ProfileEvent, UiEvent};
use std::rc::Rc;

/// Maps a profile record to the UI event that owns it
pub trait CorrelationPolicy {
    /// The owning UI event, or `None` if it cannot be found
    fn owning_event(
        &self,
        profile_event: &ProfileEvent,
        lookup: &dyn EventRecordLookup,
    ) -> Option<Rc<UiEvent>>;
}

/// Owner is the record at `sequence - 1`, if that record is a UI event
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentSequence;

impl CorrelationPolicy for AdjacentSequence {
    fn owning_event(
        &self,
        profile_event: &ProfileEvent,
        lookup: &dyn EventRecordLookup,
    ) -> Option<Rc<UiEvent>> {
        let owner = profile_event.sequence().checked_sub(1)?;
        lookup
            .find_event_record(owner)?
            .as_ui_event()
            .cloned()
    }
}

/// Owner is the closest UI event before the profile record, looking back
/// at most `max_distance` sequence numbers
#[derive(Debug, Clone, Copy)]
pub struct NearestPrecedingUiEvent {
    pub max_distance: u32,
}

impl NearestPrecedingUiEvent {
    pub fn new(max_distance: u32) -> Self {
        Self { max_distance }
    }
}

impl Default for NearestPrecedingUiEvent {
    fn default() -> Self {
        Self::new(16)
    }
}

impl CorrelationPolicy for NearestPrecedingUiEvent {
    fn owning_event(
        &self,
        profile_event: &ProfileEvent,
        lookup: &dyn EventRecordLookup,
    ) -> Option<Rc<UiEvent>> {
        let sequence = profile_event.sequence();
        (1..=self.max_distance)
            .map_while(|distance| sequence.checked_sub(distance))
            .find_map(|candidate| {
                lookup
                    .find_event_record(candidate)
                    .and_then(|record| record.as_ui_event().cloned())
            })
    }
}
