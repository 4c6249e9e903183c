//! # Resource Slots
//!
//! A [`ResourceSlot<T>`] is one independently tracked async value:
//! `Idle → Loading → Ready(T) | Failed(LoadError)`.
//!
//! ## Request tokens
//!
//! Every transition into `Loading` mints a fresh [`RequestToken`]. A completion is
//! applied only while the slot is still `Loading` under that same token; anything else
//! is a stale result from a superseded fetch and is dropped silently. `reset()` clears
//! the current token, so a fetch that was in flight at reset time can never land.
//!
//! ## Observation
//!
//! Slots keep an [`Observers`] registry. A new subscriber receives the current
//! snapshot immediately, then every transition, in the order they happen. Observers are
//! notified in registration order. Dropping a [`Subscription`] is a valid way to
//! unsubscribe; closed observers are pruned on the next notification.
//!
//! Slots are plain data with `&mut self` transitions. They are owned by exactly one
//! actor task, which is the single writer, so no lock is involved.

use crate::error::LoadError;
use std::fmt::{self, Display};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Identifies one fetch attempt on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of [`ResourceSlot::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginLoad {
    /// A new fetch must be issued under this token.
    Started(RequestToken),
    /// A fetch is already running; the caller must not issue another one.
    InFlight(RequestToken),
}

impl BeginLoad {
    pub fn token(self) -> RequestToken {
        match self {
            BeginLoad::Started(t) | BeginLoad::InFlight(t) => t,
        }
    }

    pub fn is_started(self) -> bool {
        matches!(self, BeginLoad::Started(_))
    }
}

/// Snapshot of a slot as seen by observers.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(LoadError),
}

impl<T> SlotState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            SlotState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            SlotState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SlotState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SlotState::Loading)
    }

    /// `Ready` or `Failed`.
    pub fn is_settled(&self) -> bool {
        matches!(self, SlotState::Ready(_) | SlotState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            SlotState::Idle => "idle",
            SlotState::Loading => "loading",
            SlotState::Ready(_) => "ready",
            SlotState::Failed(_) => "failed",
        }
    }
}

// =============================================================================
// OBSERVERS
// =============================================================================

/// Identifies one registration within an [`Observers`] registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving half handed to an observer.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next update. `None` once the owner is gone or has unsubscribed us.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Returns an update that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

/// Registration-ordered list of observers.
#[derive(Debug)]
pub struct Observers<T> {
    next_id: u64,
    entries: Vec<(SubscriberId, mpsc::UnboundedSender<T>)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> Observers<T> {
    /// Registers an observer and queues `initial` for it before anything else.
    pub fn register(&mut self, initial: impl IntoIterator<Item = T>) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        for item in initial {
            // Receiver is alive, it is in our hands.
            let _ = sender.send(item);
        }
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, sender));
        Subscription { id, receiver }
    }

    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: &T) {
        self.entries
            .retain(|(_, sender)| sender.send(value.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// THE SLOT
// =============================================================================

/// One independently observable async value.
#[derive(Debug)]
pub struct ResourceSlot<T> {
    name: &'static str,
    state: SlotState<T>,
    token: Option<RequestToken>,
    next_token: u64,
    observers: Observers<SlotState<T>>,
}

impl<T: Clone> ResourceSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: SlotState::Idle,
            token: None,
            next_token: 1,
            observers: Observers::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    pub fn snapshot(&self) -> SlotState<T> {
        self.state.clone()
    }

    pub fn current_token(&self) -> Option<RequestToken> {
        self.token
    }

    /// Moves the slot into `Loading`, or joins the fetch that is already running.
    pub fn begin_load(&mut self) -> BeginLoad {
        if let (SlotState::Loading, Some(token)) = (&self.state, self.token) {
            debug!(resource = self.name, %token, "Load already in flight");
            return BeginLoad::InFlight(token);
        }
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.token = Some(token);
        self.transition(SlotState::Loading);
        info!(resource = self.name, %token, "Loading");
        BeginLoad::Started(token)
    }

    /// Applies a fetch result if `token` is still the live one. Returns whether it was applied.
    pub fn complete(&mut self, token: RequestToken, result: Result<T, LoadError>) -> bool {
        if !self.state.is_loading() || self.token != Some(token) {
            warn!(
                resource = self.name,
                %token,
                current = ?self.token,
                "Discarding stale completion"
            );
            return false;
        }
        let next = match result {
            Ok(value) => {
                info!(resource = self.name, %token, "Ready");
                SlotState::Ready(value)
            }
            Err(e) => {
                warn!(resource = self.name, %token, error = %e, "Failed");
                SlotState::Failed(e)
            }
        };
        self.transition(next);
        true
    }

    /// Forces `Idle` and invalidates the in-flight token, if any.
    pub fn reset(&mut self) {
        self.token = None;
        if !self.state.is_idle() {
            info!(resource = self.name, from = self.state.label(), "Reset");
            self.transition(SlotState::Idle);
        }
    }

    pub fn subscribe(&mut self) -> Subscription<SlotState<T>> {
        let current = self.state.clone();
        let sub = self.observers.register([current]);
        debug!(resource = self.name, observers = self.observers.len(), "Subscribed");
        sub
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn transition(&mut self, next: SlotState<T>) {
        self.state = next;
        self.observers.notify(&self.state);
    }
}
