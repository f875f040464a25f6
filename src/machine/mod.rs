//! The engine that drives a machine through events.
//!
//! This module is the imperative shell around the pure data model in
//! [`crate::core`]: it owns the event queue, runs the drain loop, invokes the
//! guard and action chains in order and appends committed transitions to the
//! log.
//!
//! # Processing an event
//!
//! For every dequeued event id the engine:
//!
//! 1. resolves the event registered on the current state and notifies the
//!    observer (`Process`);
//! 2. if it is a transition event and every guard accepts it, runs EXIT on the
//!    current state, the transition action, appends the log entry and runs
//!    ENTRY on the new state;
//! 3. runs the DO activity of the (possibly new) current state.

mod action;
#[allow(clippy::module_inception)]
mod machine;
mod observer;

pub use action::{Action, ActionChain, ActionRunner};
pub use machine::StateMachine;
pub use observer::{Notification, Observer, TracingObserver};
