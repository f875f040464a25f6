//! Builder API for ergonomic state machine construction.
//!
//! This module provides a fluent builder and a serializable definition format
//! for populating a machine's states and transitions before it starts.

pub mod definition;
pub mod error;
pub mod machine;

pub use definition::{MachineDefinition, StateDefinition, TransitionDefinition};
pub use error::BuildError;
pub use machine::StateMachineBuilder;
