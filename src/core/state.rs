//! States and the registry the engine resolves them from.
//!
//! A [`State`] is a named set of recognized events: the triggers it accepts and
//! which lifecycle hooks (entry, exit, do) are registered on it. The engine only
//! ever reads states through the [`StateRegistry`] lookup contract.

use super::event::Event;
use super::id::{EventId, StateId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A state and the events it recognizes.
///
/// # Example
///
/// ```rust
/// use statelog::core::{Event, EventId, State};
///
/// let mut locked = State::new("locked");
/// locked.add_event(Event::trigger("insertCoin"));
/// locked.add_event(Event::Entry);
///
/// assert!(locked.has_event(&EventId::from("insertCoin")));
/// assert_eq!(locked.event(&EventId::ENTRY), Some(&Event::Entry));
/// assert!(locked.event(&EventId::EXIT).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    id: StateId,
    events: HashMap<EventId, Event>,
}

impl State {
    pub fn new(id: impl Into<StateId>) -> Self {
        Self {
            id: id.into(),
            events: HashMap::new(),
        }
    }

    pub fn id(&self) -> &StateId {
        &self.id
    }

    /// Register an event on this state, replacing any event with the same id.
    pub fn add_event(&mut self, event: Event) {
        self.events.insert(event.id(), event);
    }

    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn has_event(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn is_final(&self) -> bool {
        self.id.is_final()
    }
}

/// Lookup contract the engine uses to resolve states and their events.
pub trait StateRegistry {
    fn get(&self, id: &StateId) -> Option<&State>;

    fn insert(&mut self, state: State);

    /// Resolve the event registered for `event` on `state`.
    fn event(&self, state: &StateId, event: &EventId) -> Option<&Event> {
        self.get(state)?.event(event)
    }

    fn contains(&self, id: &StateId) -> bool {
        self.get(id).is_some()
    }
}

/// Hash-map backed [`StateRegistry`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateCollection {
    states: HashMap<StateId, State>,
}

impl StateCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding only the synthetic INITIAL and FINAL states.
    /// INITIAL recognizes the START event.
    pub fn with_reserved_states() -> Self {
        let mut states = Self::new();
        states.entry(StateId::INITIAL).add_event(Event::Start);
        states.insert(State::new(StateId::FINAL));
        states
    }

    /// Mutable access to a state, inserting an empty one if missing.
    pub fn entry(&mut self, id: impl Into<StateId>) -> &mut State {
        let id = id.into();
        self.states
            .entry(id.clone())
            .or_insert_with(|| State::new(id))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }
}

impl StateRegistry for StateCollection {
    fn get(&self, id: &StateId) -> Option<&State> {
        self.states.get(id)
    }

    fn insert(&mut self, state: State) {
        self.states.insert(state.id().clone(), state);
    }
}
