//! Errors raised by the state machine engine.

use crate::core::{EventId, StateId};
use thiserror::Error;

/// Boxed failure raised by a guard, action runner or observer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, StateMachineError>;

/// Errors that can occur while configuring or driving a state machine.
#[derive(Debug, Error)]
pub enum StateMachineError {
    #[error("The state machine is already started")]
    AlreadyStarted,

    #[error("The state machine is not started yet")]
    NotStarted,

    #[error("The state machine was already shutdown")]
    AlreadyShutdown,

    #[error("State '{state}' is not registered")]
    StateNotFound { state: StateId },

    #[error("No transition registered from state '{state}' on event '{event}'")]
    TransitionNotFound { state: StateId, event: EventId },

    #[error("Invalid transition from '{from}' on '{event}': {reason}")]
    InvalidTransition {
        from: StateId,
        event: EventId,
        reason: &'static str,
    },

    /// The payload was requested through the machine while a guard or action
    /// already holds it.
    #[error("The payload is in use by a running guard or action")]
    PayloadInUse,

    /// A guard, action runner or observer failed.
    #[error("Handler error: {0}")]
    Handler(#[source] BoxError),
}

impl StateMachineError {
    /// Wrap a hook failure.
    pub fn handler(error: impl Into<BoxError>) -> Self {
        StateMachineError::Handler(error.into())
    }
}
