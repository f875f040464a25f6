//! Core data model of the state machine.
//!
//! This module contains the values the engine works with:
//! - State and event identifiers, including the reserved lifecycle ids
//! - Events, states and the registry states are resolved from
//! - Transitions and the table keyed by `(state, event)`
//! - The append-only transition log
//! - Guard predicates and the guard chain
//!
//! Apart from the guard chain, nothing here runs user code.

mod event;
mod guard;
mod history;
mod id;
mod state;
mod transition;

pub use event::Event;
pub use guard::{Guard, GuardChain, GuardEvaluator};
pub use history::{TransitionLog, TransitionLogEntry};
pub use id::{EventId, StateId};
pub use state::{State, StateCollection, StateRegistry};
pub use transition::{Transition, TransitionTable};
