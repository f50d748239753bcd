//! Orchestrates profile parsing and attaches results to timeline events.
//!
//! Flow:
//! 1. [`ProfileModel::get_event_callback`] claims profile records of a
//!    supported format
//! 2. [`EventCallback::on_event_record`] schedules the first parse slice
//! 3. Each slice parses a bounded number of lines, then re-defers itself
//! 4. On completion the owning UI event is found through the
//!    [`CorrelationPolicy`] and the profile is attached to it
//!
//! Everything runs on one thread; shared state is `Rc<RefCell<_>>` and no
//! borrow is held across a call into user code or the scheduler.

use super::correlation::{AdjacentSequence, CorrelationPolicy};
use super::scheduler::Scheduler;
use super::timeline::{EventRecordLookup, ProfileEvent, TimelineRecord, UiEvent};
use super::visitor::EventVisitor;
use crate::aggregator::Profile;
use crate::parser::{LogParser, ParseStatus};
use crate::utils::config::{is_supported_format, ModelConfig};
use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ModelState {
    /// UI events that received a profile, by sequence
    profiled_events: BTreeMap<u32, Rc<UiEvent>>,
    /// Highest profile record sequence handed to a parser; sequences only
    /// increase, so anything at or below it was already claimed
    last_claimed: Option<u32>,
    in_flight: usize,
}

/// Everything a parse needs, cloned into callbacks and scheduled slices
struct ParseContext<L, S> {
    lookup: Rc<L>,
    scheduler: S,
    policy: Rc<dyn CorrelationPolicy>,
    config: ModelConfig,
    state: Rc<RefCell<ModelState>>,
}

impl<L, S: Clone> Clone for ParseContext<L, S> {
    fn clone(&self) -> Self {
        Self {
            lookup: Rc::clone(&self.lookup),
            scheduler: self.scheduler.clone(),
            policy: Rc::clone(&self.policy),
            config: self.config.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

/// JavaScript profile model for one timeline
pub struct ProfileModel<L, S> {
    ctx: ParseContext<L, S>,
}

impl<L, S> ProfileModel<L, S>
where
    L: EventRecordLookup + 'static,
    S: Scheduler + Clone + 'static,
{
    pub fn new(lookup: L, scheduler: S) -> Self {
        Self {
            ctx: ParseContext {
                lookup: Rc::new(lookup),
                scheduler,
                policy: Rc::new(AdjacentSequence),
                config: ModelConfig::default(),
                state: Rc::new(RefCell::new(ModelState::default())),
            },
        }
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.ctx.config = config;
        self
    }

    pub fn with_policy(mut self, policy: impl CorrelationPolicy + 'static) -> Self {
        self.ctx.policy = Rc::new(policy);
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.ctx.config
    }

    /// Handler for `record` if it is a profile record this model can parse
    ///
    /// Returns `None` for UI events and unsupported formats so the record
    /// is left to other consumers.
    pub fn get_event_callback(&self, record: &TimelineRecord) -> Option<EventCallback<L, S>> {
        let event = record.as_profile_event()?;
        if !is_supported_format(event.format()) {
            debug!(
                "Ignoring profile record {} with unsupported format '{}'",
                event.sequence(),
                event.format()
            );
            return None;
        }
        Some(EventCallback {
            ctx: self.ctx.clone(),
        })
    }

    /// Profile attached to the UI event at `sequence`, if parsing finished
    pub fn get_profile_for_event(&self, sequence: u32) -> Option<Rc<Profile>> {
        self.ctx
            .state
            .borrow()
            .profiled_events
            .get(&sequence)
            .and_then(|event| event.profile())
    }

    /// Visit every UI event with an attached profile in ascending sequence
    /// order, then call `post_process` once
    pub fn visit_events_with_profiles<V: EventVisitor + ?Sized>(&self, visitor: &mut V) {
        let events: Vec<Rc<UiEvent>> = self
            .ctx
            .state
            .borrow()
            .profiled_events
            .values()
            .filter(|event| event.has_profile())
            .cloned()
            .collect();

        for event in &events {
            visitor.visit_ui_event(event);
        }
        visitor.post_process();
    }

    /// Parses started but not yet finished or cancelled
    pub fn pending_parses(&self) -> usize {
        self.ctx.state.borrow().in_flight
    }

    /// Number of UI events that currently carry a profile
    pub fn profiled_event_count(&self) -> usize {
        self.ctx.state.borrow().profiled_events.len()
    }
}

impl<L, S> fmt::Debug for ProfileModel<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.ctx.state.borrow();
        f.debug_struct("ProfileModel")
            .field("profiled_events", &state.profiled_events.len())
            .field("in_flight", &state.in_flight)
            .finish()
    }
}

/// One-shot handler returned by [`ProfileModel::get_event_callback`]
pub struct EventCallback<L, S> {
    ctx: ParseContext<L, S>,
}

impl<L, S> EventCallback<L, S>
where
    L: EventRecordLookup + 'static,
    S: Scheduler + Clone + 'static,
{
    /// Start parsing `record` asynchronously
    ///
    /// Returns immediately with a handle that resolves once the profile is
    /// built. Returns `None` if `record` is not a supported profile record
    /// or is not newer than the last claimed record.
    pub fn on_event_record(self, record: &TimelineRecord) -> Option<ProfileHandle> {
        let event = record.as_profile_event()?;
        if !is_supported_format(event.format()) {
            return None;
        }

        {
            let mut state = self.ctx.state.borrow_mut();
            if state.last_claimed.is_some_and(|last| event.sequence() <= last) {
                debug!("Profile record {} already claimed, ignoring", event.sequence());
                return None;
            }
            state.last_claimed = Some(event.sequence());
            state.in_flight += 1;
        }

        info!(
            "Parsing profile record {} ({} bytes)",
            event.sequence(),
            event.profile_data().len()
        );

        let handle = ProfileHandle::new(event.sequence());
        let job = ParseJob {
            parser: LogParser::with_config(event.profile_data(), &self.ctx.config),
            event: Rc::clone(event),
            handle: handle.clone(),
            ctx: self.ctx,
        };
        job.schedule();

        Some(handle)
    }
}

/// A parse in progress; moved into each scheduled slice
struct ParseJob<L, S> {
    ctx: ParseContext<L, S>,
    event: Rc<ProfileEvent>,
    parser: LogParser,
    handle: ProfileHandle,
}

impl<L, S> ParseJob<L, S>
where
    L: EventRecordLookup + 'static,
    S: Scheduler + Clone + 'static,
{
    fn schedule(self) {
        let scheduler = self.ctx.scheduler.clone();
        scheduler.defer(Box::new(move || self.run_slice()));
    }

    fn run_slice(mut self) {
        if self.handle.is_cancelled() {
            debug!("Parse of profile record {} cancelled", self.event.sequence());
            self.release();
            return;
        }

        match self.parser.step(self.ctx.config.slice_budget()) {
            ParseStatus::Pending => {
                trace!(
                    "Profile record {}: {} lines parsed, yielding",
                    self.event.sequence(),
                    self.parser.lines_consumed()
                );
                self.schedule();
            }
            ParseStatus::Complete => self.complete(),
        }
    }

    fn complete(self) {
        self.release();
        let profile = Rc::new(self.parser.finish());

        match self.ctx.policy.owning_event(&self.event, &*self.ctx.lookup) {
            Some(owner) => {
                if owner.attach_profile(Rc::clone(&profile)) {
                    debug!(
                        "Attached profile ({:.3} ms) to event {}",
                        profile.total_time(),
                        owner.sequence()
                    );
                } else {
                    warn!(
                        "Event {} already has a profile; keeping the first one",
                        owner.sequence()
                    );
                }
                self.ctx
                    .state
                    .borrow_mut()
                    .profiled_events
                    .insert(owner.sequence(), owner);
            }
            None => warn!(
                "No UI event owns profile record {}; profile not attached",
                self.event.sequence()
            ),
        }

        self.handle.resolve(profile);
    }

    fn release(&self) {
        let mut state = self.ctx.state.borrow_mut();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

type CompletionCallback = Box<dyn FnOnce(&Rc<Profile>)>;

#[derive(Default)]
struct HandleState {
    profile: Option<Rc<Profile>>,
    cancelled: bool,
    waiters: Vec<CompletionCallback>,
}

/// Completion signal for one parse
///
/// Clones share state. Callbacks registered with
/// [`ProfileHandle::on_complete`] run exactly once.
#[derive(Clone)]
pub struct ProfileHandle {
    sequence: u32,
    inner: Rc<RefCell<HandleState>>,
}

impl ProfileHandle {
    fn new(sequence: u32) -> Self {
        Self {
            sequence,
            inner: Rc::new(RefCell::new(HandleState::default())),
        }
    }

    /// Sequence of the profile record being parsed
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn is_complete(&self) -> bool {
        self.inner.borrow().profile.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.borrow().cancelled
    }

    /// The finished profile, whether or not it could be attached
    pub fn profile(&self) -> Option<Rc<Profile>> {
        self.inner.borrow().profile.clone()
    }

    /// Run `callback` when the profile is ready (immediately if it is)
    ///
    /// Never runs for a cancelled parse.
    pub fn on_complete(&self, callback: impl FnOnce(&Rc<Profile>) + 'static) {
        let ready = self.inner.borrow().profile.clone();
        match ready {
            Some(profile) => callback(&profile),
            None => self.inner.borrow_mut().waiters.push(Box::new(callback)),
        }
    }

    /// Stop the parse at its next slice; nothing gets attached
    ///
    /// Returns false if the parse already finished.
    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.profile.is_some() {
            return false;
        }
        inner.cancelled = true;
        inner.waiters.clear();
        true
    }

    fn resolve(&self, profile: Rc<Profile>) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            inner.profile = Some(Rc::clone(&profile));
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            waiter(&profile);
        }
    }
}

impl fmt::Debug for ProfileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileHandle")
            .field("sequence", &self.sequence)
            .field("complete", &self.is_complete())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
