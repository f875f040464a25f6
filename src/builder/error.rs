//! Build errors for state machine builders and definitions.

use crate::core::{EventId, StateId};
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Start state not specified. Call .start_state(id) before .build()")]
    MissingStartState,

    #[error("State '{state}' is reserved and cannot be the start state")]
    ReservedStartState { state: StateId },

    #[error("Transition on '{event}' leaves the final state")]
    TransitionFromFinal { event: EventId },

    #[error("Event '{event}' is reserved and cannot trigger a transition from '{state}'")]
    ReservedEvent { state: StateId, event: EventId },

    #[error("Invalid machine definition: {0}")]
    InvalidDefinition(String),

    #[error("{} build errors: {}", .0.len(), summarize(.0))]
    Multiple(Vec<BuildError>),
}

fn summarize(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildError {
    /// The individual errors, flattening [`BuildError::Multiple`].
    pub fn errors(&self) -> Vec<&BuildError> {
        match self {
            BuildError::Multiple(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}
