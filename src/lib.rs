//! Statelog: a finite state machine engine driven by an append-only log
//!
//! A machine is configured once with states, transitions, guards and actions,
//! then fed events. Every committed transition is appended to a transition
//! log, and the log is the only record of where the machine is: the current
//! state is the target of the last entry, the previous state its source.
//!
//! # Core Concepts
//!
//! - **States and events**: opaque identifiers, with reserved INITIAL/FINAL
//!   states and START/ENTRY/EXIT/DO lifecycle events
//! - **Guards**: an ordered chain of predicates that must all accept a
//!   transition before it commits
//! - **Actions**: an ordered chain of runners invoked for every lifecycle and
//!   transition event, in EXIT → transition → ENTRY → DO order
//! - **Drain loop**: events raised from inside actions are queued and processed
//!   by the outermost `trigger_event` call, never recursively
//!
//! # Example
//!
//! ```rust
//! use statelog::core::Event;
//! use statelog::machine::Action;
//! use statelog::StateMachineBuilder;
//!
//! #[derive(Default)]
//! struct Turnstile {
//!     coins: u32,
//! }
//!
//! let machine = StateMachineBuilder::with_payload(Turnstile::default())
//!     .start_state("locked")
//!     .transition("locked", "insertCoin", "unlocked")
//!     .transition("unlocked", "pass", "locked")
//!     .action(Action::new(|event: &Event, turnstile: &mut Turnstile, _| {
//!         if event.id() == "insertCoin" {
//!             turnstile.coins += 1;
//!         }
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! machine.start().unwrap();
//! machine.trigger_event("insertCoin").unwrap();
//! machine.trigger_event("pass").unwrap();
//!
//! assert_eq!(machine.current_state().unwrap(), "locked");
//! assert_eq!(machine.previous_state().unwrap(), "unlocked");
//! assert_eq!(machine.transition_log().len(), 3);
//! assert_eq!(machine.payload().unwrap().coins, 1);
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use crate::core::{
    Event, EventId, Guard, StateId, Transition, TransitionLog, TransitionLogEntry,
};
pub use error::{Result, StateMachineError};
pub use machine::{Action, Observer, StateMachine};
