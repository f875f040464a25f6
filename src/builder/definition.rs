//! Declarative machine definitions.
//!
//! A [`MachineDefinition`] describes the topology of a machine (states, their
//! lifecycle hooks, transitions) as data, so it can live in a configuration
//! file. Guards, actions and the payload are code and are attached to the
//! builder returned by [`MachineDefinition::into_builder`].

use crate::builder::error::BuildError;
use crate::builder::machine::StateMachineBuilder;
use crate::core::{EventId, StateId};
use serde::{Deserialize, Serialize};

/// Lifecycle hooks and plain events declared on one state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDefinition {
    pub id: StateId,
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub activity: bool,
    #[serde(default)]
    pub events: Vec<EventId>,
}

impl StateDefinition {
    pub fn new(id: impl Into<StateId>) -> Self {
        Self {
            id: id.into(),
            entry: false,
            exit: false,
            activity: false,
            events: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionDefinition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

/// Serializable topology of a state machine.
///
/// # Example
///
/// ```rust
/// use statelog::builder::MachineDefinition;
///
/// let definition = MachineDefinition::from_json(r#"{
///     "id": "turnstile",
///     "start": "locked",
///     "states": [{ "id": "unlocked", "entry": true }],
///     "transitions": [
///         { "from": "locked", "event": "insertCoin", "to": "unlocked" },
///         { "from": "unlocked", "event": "pass", "to": "locked" }
///     ]
/// }"#).unwrap();
///
/// let machine = definition.into_builder().build().unwrap();
/// machine.start().unwrap();
/// machine.trigger_event("insertCoin").unwrap();
/// assert_eq!(machine.current_state().unwrap(), "unlocked");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start: StateId,
    #[serde(default)]
    pub states: Vec<StateDefinition>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

impl MachineDefinition {
    pub fn new(start: impl Into<StateId>) -> Self {
        Self {
            id: None,
            start: start.into(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::InvalidDefinition(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BuildError> {
        serde_json::to_string_pretty(self).map_err(|e| BuildError::InvalidDefinition(e.to_string()))
    }

    /// Builder for a payload-less machine with this topology.
    pub fn into_builder(self) -> StateMachineBuilder<()> {
        self.into_builder_with_payload(())
    }

    /// Builder for a machine with this topology owning `payload`.
    pub fn into_builder_with_payload<P>(self, payload: P) -> StateMachineBuilder<P> {
        let mut builder = StateMachineBuilder::with_payload(payload).start_state(self.start);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }

        for state in self.states {
            builder = builder.state(state.id.clone());
            if state.entry {
                builder = builder.on_entry(state.id.clone());
            }
            if state.exit {
                builder = builder.on_exit(state.id.clone());
            }
            if state.activity {
                builder = builder.activity(state.id.clone());
            }
            for event in state.events {
                builder = builder.event(state.id.clone(), event);
            }
        }

        for transition in self.transitions {
            builder = builder.transition(transition.from, transition.event, transition.to);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_definition_parses() {
        let definition = MachineDefinition::from_json(r#"{ "start": "idle" }"#).unwrap();

        assert_eq!(definition, MachineDefinition::new("idle"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MachineDefinition::from_json(r#"{ "start": "idle", "colour": "red" }"#)
            .unwrap_err();

        assert!(matches!(err, BuildError::InvalidDefinition(_)));
    }

    #[test]
    fn definition_round_trips_through_json() {
        let mut definition = MachineDefinition::new("Washing");
        definition.id = Some("washer".to_string());
        definition.states.push(StateDefinition {
            activity: true,
            ..StateDefinition::new("Washing")
        });
        definition.transitions.push(TransitionDefinition {
            from: StateId::from("Washing"),
            event: EventId::from("w"),
            to: StateId::from("Rinsing"),
        });

        let json = definition.to_json().unwrap();
        assert_eq!(MachineDefinition::from_json(&json).unwrap(), definition);
    }

    #[test]
    fn lifecycle_flags_register_hooks() {
        let definition = MachineDefinition::from_json(
            r#"{
                "start": "Washing",
                "states": [{ "id": "Washing", "entry": true, "exit": true, "activity": true, "events": ["beep"] }]
            }"#,
        )
        .unwrap();

        let machine = definition.into_builder().build().unwrap();
        let washing = machine.state(&StateId::from("Washing")).unwrap();

        assert!(washing.has_event(&EventId::ENTRY));
        assert!(washing.has_event(&EventId::EXIT));
        assert!(washing.has_event(&EventId::DO));
        assert!(washing.has_event(&EventId::from("beep")));
    }

    #[test]
    fn invalid_topology_fails_at_build() {
        let definition = MachineDefinition::from_json(
            r#"{
                "start": "idle",
                "transitions": [{ "from": "__FINAL__", "event": "again", "to": "idle" }]
            }"#,
        )
        .unwrap();

        let result = definition.into_builder().build();
        assert!(matches!(result, Err(BuildError::TransitionFromFinal { .. })));
    }
}
