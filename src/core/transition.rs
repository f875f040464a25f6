//! Transitions and the table they are resolved from.

use super::event::Event;
use super::id::{EventId, StateId};
use crate::error::{Result, StateMachineError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An immutable move from one state to another, triggered by an event.
///
/// # Example
///
/// ```rust
/// use statelog::core::{Event, StateId, Transition};
///
/// let transition = Transition::new("locked", "insertCoin", "unlocked").unwrap();
///
/// assert_eq!(transition.from(), &StateId::from("locked"));
/// assert_eq!(transition.to(), &StateId::from("unlocked"));
/// assert_eq!(transition.event(), &Event::trigger("insertCoin"));
///
/// // Nothing leaves the final state.
/// assert!(Transition::new(StateId::FINAL, "restart", "locked").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransitionRecord")]
pub struct Transition {
    from: StateId,
    to: StateId,
    event: Event,
}

/// Unchecked wire form of a [`Transition`].
#[derive(Deserialize)]
struct TransitionRecord {
    from: StateId,
    to: StateId,
    event: Event,
}

impl TryFrom<TransitionRecord> for Transition {
    type Error = StateMachineError;

    fn try_from(record: TransitionRecord) -> Result<Self> {
        if !record.event.is_transition() {
            return Err(StateMachineError::InvalidTransition {
                from: record.from,
                event: record.event.id(),
                reason: "only transition events can trigger transitions",
            });
        }
        Transition::new(record.from, record.event.id(), record.to)
    }
}

impl Transition {
    /// Create a transition, rejecting ones that leave FINAL or that would be
    /// triggered by an ENTRY/EXIT/DO id.
    pub fn new(
        from: impl Into<StateId>,
        event: impl Into<EventId>,
        to: impl Into<StateId>,
    ) -> Result<Self> {
        let from = from.into();
        let event = event.into();
        let to = to.into();

        if from.is_final() {
            return Err(StateMachineError::InvalidTransition {
                from,
                event,
                reason: "the final state has no outgoing transitions",
            });
        }
        if event.is_lifecycle_hook() {
            return Err(StateMachineError::InvalidTransition {
                from,
                event,
                reason: "lifecycle events cannot trigger transitions",
            });
        }

        Ok(Self::from_parts(from, Event::trigger(event), to))
    }

    pub(crate) fn from_parts(from: StateId, event: Event, to: StateId) -> Self {
        Self { from, to, event }
    }

    pub fn from(&self) -> &StateId {
        &self.from
    }

    pub fn to(&self) -> &StateId {
        &self.to
    }

    pub fn event(&self) -> &Event {
        &self.event
    }
}

/// Transitions keyed by `(from state, trigger event)`.
///
/// Registering a second transition for the same key replaces the first.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    transitions: HashMap<StateId, HashMap<EventId, Transition>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `transition`, returning the one it replaced, if any.
    pub fn register(&mut self, transition: Transition) -> Option<Transition> {
        self.transitions
            .entry(transition.from.clone())
            .or_default()
            .insert(transition.event.id(), transition)
    }

    pub fn resolve(&self, state: &StateId, event: &EventId) -> Option<&Transition> {
        self.transitions.get(state)?.get(event)
    }

    pub fn len(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values().flat_map(HashMap::values)
    }
}
