//! Action runners invoked for every lifecycle and transition event.

use super::StateMachine;
use crate::core::{Event, EventId, StateId};
use crate::error::{Result, StateMachineError};
use std::cell::RefCell;

/// Capability invoked with every event the engine dispatches.
///
/// Runners may mutate the payload and may call `queue_event` or
/// `trigger_event` on the machine; a nested `trigger_event` only enqueues, the
/// outermost call drains.
pub trait ActionRunner<P> {
    fn run(&self, event: &Event, payload: &mut P, machine: &StateMachine<P>) -> Result<()>;
}

type ActionFn<P> = dyn Fn(&Event, &mut P, &StateMachine<P>) -> Result<()>;

/// Action runner built from a closure.
///
/// # Example
///
/// ```rust
/// use statelog::core::Event;
/// use statelog::machine::Action;
/// use statelog::StateMachineBuilder;
///
/// let machine = StateMachineBuilder::with_payload(Vec::<String>::new())
///     .start_state("locked")
///     .transition("locked", "insertCoin", "unlocked")
///     .action(Action::new(|event: &Event, seen: &mut Vec<String>, _| {
///         seen.push(event.id().to_string());
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// machine.start().unwrap();
/// machine.trigger_event("insertCoin").unwrap();
/// assert_eq!(machine.payload().unwrap().last().unwrap(), "insertCoin");
/// ```
pub struct Action<P> {
    body: Box<ActionFn<P>>,
}

impl<P> Action<P> {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Event, &mut P, &StateMachine<P>) -> Result<()> + 'static,
    {
        Action {
            body: Box::new(body),
        }
    }

    /// Action that only fires for `event` while the machine is in `state`.
    ///
    /// For EXIT and transition events the current state is the state being
    /// left; for ENTRY it is the state being entered.
    pub fn scoped<F>(state: impl Into<StateId>, event: impl Into<EventId>, body: F) -> Self
    where
        P: 'static,
        F: Fn(&mut P, &StateMachine<P>) -> Result<()> + 'static,
    {
        let state = state.into();
        let event = event.into();
        Action::new(move |candidate: &Event, payload: &mut P, machine: &StateMachine<P>| {
            if candidate.id() == event && machine.current_state().as_ref() == Some(&state) {
                body(payload, machine)
            } else {
                Ok(())
            }
        })
    }

    /// Entry action for `state`.
    pub fn on_entry<F>(state: impl Into<StateId>, body: F) -> Self
    where
        P: 'static,
        F: Fn(&mut P, &StateMachine<P>) -> Result<()> + 'static,
    {
        Self::scoped(state, EventId::ENTRY, body)
    }

    /// Exit action for `state`.
    pub fn on_exit<F>(state: impl Into<StateId>, body: F) -> Self
    where
        P: 'static,
        F: Fn(&mut P, &StateMachine<P>) -> Result<()> + 'static,
    {
        Self::scoped(state, EventId::EXIT, body)
    }

    /// Do-activity for `state`, run after every event processed in it.
    pub fn activity<F>(state: impl Into<StateId>, body: F) -> Self
    where
        P: 'static,
        F: Fn(&mut P, &StateMachine<P>) -> Result<()> + 'static,
    {
        Self::scoped(state, EventId::DO, body)
    }
}

impl<P> ActionRunner<P> for Action<P> {
    fn run(&self, event: &Event, payload: &mut P, machine: &StateMachine<P>) -> Result<()> {
        (self.body)(event, payload, machine)
    }
}

/// Ordered action runners. Every runner sees every event.
pub struct ActionChain<P> {
    runners: Vec<Box<dyn ActionRunner<P>>>,
}

impl<P> Default for ActionChain<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ActionChain<P> {
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    pub fn push(&mut self, runner: Box<dyn ActionRunner<P>>) {
        self.runners.push(runner);
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Run every runner in registration order. The payload is borrowed
    /// mutably for the duration of each call; the first error aborts the
    /// rest of the chain.
    pub(crate) fn run(
        &self,
        event: &Event,
        payload: &RefCell<P>,
        machine: &StateMachine<P>,
    ) -> Result<()> {
        for runner in &self.runners {
            let mut borrowed = payload
                .try_borrow_mut()
                .map_err(|_| StateMachineError::PayloadInUse)?;
            runner.run(event, &mut borrowed, machine)?;
        }
        Ok(())
    }
}
