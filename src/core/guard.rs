//! Guards gating whether a resolved transition may commit.
//!
//! Guards form an ordered chain with AND semantics: evaluators run in
//! registration order and the first one that rejects ends the evaluation.

use super::event::Event;
use super::id::EventId;
use crate::error::Result;
use crate::machine::StateMachine;

/// Capability consulted before a transition commits.
///
/// Receives the transition event, the machine's payload and the machine
/// itself. Returning `Ok(false)` blocks the transition; returning an error
/// aborts event processing and reaches the caller of `trigger_event`.
pub trait GuardEvaluator<P> {
    fn evaluate(&self, event: &Event, payload: &P, machine: &StateMachine<P>) -> Result<bool>;
}

/// Guard built from a predicate closure.
///
/// # Example
///
/// ```rust
/// use statelog::core::{Event, Guard};
/// use statelog::StateMachineBuilder;
///
/// struct Coins {
///     inserted: u32,
///     max: u32,
/// }
///
/// let machine = StateMachineBuilder::with_payload(Coins { inserted: 11, max: 10 })
///     .start_state("locked")
///     .transition("locked", "insertCoin", "unlocked")
///     .guard(Guard::new(|_: &Event, coins: &Coins, _| coins.inserted <= coins.max))
///     .build()
///     .unwrap();
///
/// machine.start().unwrap();
/// machine.trigger_event("insertCoin").unwrap();
/// assert_eq!(machine.current_state().unwrap(), "locked");
/// ```
pub struct Guard<P> {
    predicate: Box<dyn Fn(&Event, &P, &StateMachine<P>) -> bool>,
}

impl<P> Guard<P> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Event, &P, &StateMachine<P>) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that only judges `event`; every other transition passes.
    pub fn for_event<F>(event: impl Into<EventId>, predicate: F) -> Self
    where
        P: 'static,
        F: Fn(&P, &StateMachine<P>) -> bool + 'static,
    {
        let event = event.into();
        Guard::new(move |candidate: &Event, payload: &P, machine: &StateMachine<P>| {
            candidate.id() != event || predicate(payload, machine)
        })
    }

    pub fn check(&self, event: &Event, payload: &P, machine: &StateMachine<P>) -> bool {
        (self.predicate)(event, payload, machine)
    }
}

impl<P> GuardEvaluator<P> for Guard<P> {
    fn evaluate(&self, event: &Event, payload: &P, machine: &StateMachine<P>) -> Result<bool> {
        Ok(self.check(event, payload, machine))
    }
}

/// Ordered guard evaluators.
pub struct GuardChain<P> {
    evaluators: Vec<Box<dyn GuardEvaluator<P>>>,
}

impl<P> Default for GuardChain<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> GuardChain<P> {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    pub fn push(&mut self, evaluator: Box<dyn GuardEvaluator<P>>) {
        self.evaluators.push(evaluator);
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// `Ok(true)` if every evaluator accepts `event`; stops at the first
    /// rejection or error. An empty chain accepts everything.
    pub fn evaluate(&self, event: &Event, payload: &P, machine: &StateMachine<P>) -> Result<bool> {
        for evaluator in &self.evaluators {
            if !evaluator.evaluate(event, payload, machine)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_guard(calls: &Rc<RefCell<Vec<usize>>>, index: usize, verdict: bool) -> Guard<()> {
        let calls = Rc::clone(calls);
        Guard::new(move |_: &Event, _: &(), _| {
            calls.borrow_mut().push(index);
            verdict
        })
    }

    fn chain_of(verdicts: &[bool], calls: &Rc<RefCell<Vec<usize>>>) -> GuardChain<()> {
        let mut chain = GuardChain::new();
        for (index, verdict) in verdicts.iter().enumerate() {
            chain.push(Box::new(recording_guard(calls, index, *verdict)));
        }
        chain
    }

    #[test]
    fn empty_chain_accepts() {
        let machine = StateMachine::new();
        let chain: GuardChain<()> = GuardChain::new();

        assert!(chain.evaluate(&Event::trigger("go"), &(), &machine).unwrap());
    }

    #[test]
    fn chain_requires_every_guard() {
        let machine = StateMachine::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        assert!(chain_of(&[true, true], &calls)
            .evaluate(&Event::trigger("go"), &(), &machine)
            .unwrap());
        assert!(!chain_of(&[true, false], &calls)
            .evaluate(&Event::trigger("go"), &(), &machine)
            .unwrap());
    }

    #[test]
    fn chain_short_circuits_on_first_rejection() {
        let machine = StateMachine::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let accepted = chain_of(&[true, false, true], &calls)
            .evaluate(&Event::trigger("go"), &(), &machine)
            .unwrap();

        assert!(!accepted);
        assert_eq!(*calls.borrow(), vec![0, 1]);
    }

    #[test]
    fn for_event_ignores_other_events() {
        let machine = StateMachine::new();
        let guard: Guard<()> = Guard::for_event("insertCoin", |_, _| false);

        assert!(!guard.check(&Event::trigger("insertCoin"), &(), &machine));
        assert!(guard.check(&Event::trigger("pass"), &(), &machine));
        assert!(guard.check(&Event::Transition(EventId::from("other")), &(), &machine));
    }
}
