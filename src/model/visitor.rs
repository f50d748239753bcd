//! Callback surface for walking events that carry a profile.

use super::timeline::UiEvent;

/// Visitor driven by `ProfileModel::visit_events_with_profiles`
pub trait EventVisitor {
    /// Called once per profiled event, in ascending sequence order
    fn visit_ui_event(&mut self, event: &UiEvent);

    /// Called exactly once after the traversal, even if nothing was visited
    fn post_process(&mut self);
}

/// Summary of one visited event
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledEvent {
    pub sequence: u32,
    pub total_time_ms: f64,
    pub frame_count: usize,
}

/// Collects every visited event into a list
#[derive(Debug, Default)]
pub struct ProfiledEventCollector {
    pub events: Vec<ProfiledEvent>,
    pub finished: bool,
}

impl ProfiledEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequences(&self) -> Vec<u32> {
        self.events.iter().map(|e| e.sequence).collect()
    }
}

impl EventVisitor for ProfiledEventCollector {
    fn visit_ui_event(&mut self, event: &UiEvent) {
        if let Some(profile) = event.profile() {
            self.events.push(ProfiledEvent {
                sequence: event.sequence(),
                total_time_ms: profile.total_time(),
                frame_count: profile.frame_count(),
            });
        }
    }

    fn post_process(&mut self) {
        self.finished = true;
    }
}
