//! Events recognized by states.

use super::id::EventId;
use serde::{Deserialize, Serialize};

/// An event a state can recognize.
///
/// Only transition-capable events ([`Event::Transition`] and the synthetic
/// [`Event::Start`]) take part in transition resolution. The remaining
/// variants are dispatched to action runners but never move the machine.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Event {
    /// An event the state knows about that does not trigger a transition.
    Plain(EventId),
    /// A caller-supplied trigger for a registered transition.
    Transition(EventId),
    /// Raised on the state being left, before the transition commits.
    Exit,
    /// Raised on the state being entered, after the transition commits.
    Entry,
    /// Raised on the current state after every processed event.
    Do,
    /// Raised once by `start()`; moves the machine out of INITIAL.
    Start,
}

impl Event {
    /// Build the event that triggers a transition for `id`.
    ///
    /// The reserved START id maps to [`Event::Start`].
    pub fn trigger(id: impl Into<EventId>) -> Self {
        let id = id.into();
        if id == EventId::START {
            Event::Start
        } else {
            Event::Transition(id)
        }
    }

    pub fn id(&self) -> EventId {
        match self {
            Event::Plain(id) | Event::Transition(id) => id.clone(),
            Event::Exit => EventId::EXIT,
            Event::Entry => EventId::ENTRY,
            Event::Do => EventId::DO,
            Event::Start => EventId::START,
        }
    }

    /// Whether this event can resolve to a transition.
    pub fn is_transition(&self) -> bool {
        matches!(self, Event::Transition(_) | Event::Start)
    }

    /// Whether the engine raises this event itself.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Event::Exit | Event::Entry | Event::Do | Event::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_events_expose_reserved_ids() {
        assert_eq!(Event::Entry.id(), EventId::ENTRY);
        assert_eq!(Event::Exit.id(), EventId::EXIT);
        assert_eq!(Event::Do.id(), EventId::DO);
        assert_eq!(Event::Start.id(), EventId::START);
    }

    #[test]
    fn only_transition_and_start_events_are_transition_capable() {
        assert!(Event::Transition(EventId::from("pass")).is_transition());
        assert!(Event::Start.is_transition());
        assert!(!Event::Plain(EventId::from("pass")).is_transition());
        assert!(!Event::Entry.is_transition());
        assert!(!Event::Do.is_transition());
    }

    #[test]
    fn trigger_maps_start_id_to_start_event() {
        assert_eq!(Event::trigger(EventId::START), Event::Start);
        assert_eq!(
            Event::trigger("insertCoin"),
            Event::Transition(EventId::from("insertCoin"))
        );
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Event::Transition(EventId::from("pass"))).unwrap();
        assert_eq!(json, r#"{"kind":"transition","id":"pass"}"#);

        let event: Event = serde_json::from_str(r#"{"kind":"entry"}"#).unwrap();
        assert_eq!(event, Event::Entry);
    }
}
