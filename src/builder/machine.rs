//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{
    Event, EventId, GuardChain, GuardEvaluator, StateCollection, StateId, Transition,
};
use crate::machine::{ActionChain, ActionRunner, Observer, StateMachine};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing state machines with a fluent API.
///
/// Adding a transition registers both of its states and the trigger event on
/// the source state. The start state becomes the target of the START
/// transition out of INITIAL.
///
/// # Example
///
/// ```rust
/// use statelog::StateMachineBuilder;
/// use statelog::core::StateId;
///
/// let machine = StateMachineBuilder::new()
///     .id("door")
///     .start_state("closed")
///     .transition("closed", "open", "opened")
///     .transition("opened", "close", "closed")
///     .transition("closed", "demolish", StateId::FINAL)
///     .build()
///     .unwrap();
///
/// machine.start().unwrap();
/// machine.trigger_event("demolish").unwrap();
/// assert!(machine.is_ended());
/// ```
pub struct StateMachineBuilder<P = ()> {
    id: Option<String>,
    start: Option<StateId>,
    states: StateCollection,
    transitions: Vec<(StateId, EventId, StateId)>,
    guards: GuardChain<P>,
    actions: ActionChain<P>,
    observer: Option<Box<dyn Observer>>,
    payload: P,
}

impl StateMachineBuilder<()> {
    /// Create a builder for a machine without a payload.
    pub fn new() -> Self {
        Self::with_payload(())
    }
}

impl Default for StateMachineBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> StateMachineBuilder<P> {
    /// Create a builder for a machine owning `payload`.
    pub fn with_payload(payload: P) -> Self {
        Self {
            id: None,
            start: None,
            states: StateCollection::with_reserved_states(),
            transitions: Vec::new(),
            guards: GuardChain::new(),
            actions: ActionChain::new(),
            observer: None,
            payload,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the first state entered by `start()` (required).
    pub fn start_state(mut self, state: impl Into<StateId>) -> Self {
        let state = state.into();
        self.states.entry(state.clone());
        self.start = Some(state);
        self
    }

    /// Register a state with no events.
    pub fn state(mut self, state: impl Into<StateId>) -> Self {
        self.states.entry(state);
        self
    }

    /// Register an event `state` recognizes without transitioning.
    pub fn event(mut self, state: impl Into<StateId>, event: impl Into<EventId>) -> Self {
        self.states.entry(state).add_event(Event::Plain(event.into()));
        self
    }

    /// Add a transition. A later transition for the same `(from, event)`
    /// replaces an earlier one.
    pub fn transition(
        mut self,
        from: impl Into<StateId>,
        event: impl Into<EventId>,
        to: impl Into<StateId>,
    ) -> Self {
        let (from, event, to) = (from.into(), event.into(), to.into());
        self.states
            .entry(from.clone())
            .add_event(Event::trigger(event.clone()));
        self.states.entry(to.clone());
        self.transitions.push((from, event, to));
        self
    }

    /// Raise ENTRY when `state` is entered.
    pub fn on_entry(mut self, state: impl Into<StateId>) -> Self {
        self.states.entry(state).add_event(Event::Entry);
        self
    }

    /// Raise EXIT when `state` is left.
    pub fn on_exit(mut self, state: impl Into<StateId>) -> Self {
        self.states.entry(state).add_event(Event::Exit);
        self
    }

    /// Raise DO after every event processed while in `state`.
    pub fn activity(mut self, state: impl Into<StateId>) -> Self {
        self.states.entry(state).add_event(Event::Do);
        self
    }

    /// Append a guard to the chain.
    pub fn guard(mut self, evaluator: impl GuardEvaluator<P> + 'static) -> Self {
        self.guards.push(Box::new(evaluator));
        self
    }

    /// Append an action runner to the chain.
    pub fn action(mut self, runner: impl ActionRunner<P> + 'static) -> Self {
        self.actions.push(Box::new(runner));
        self
    }

    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn payload(mut self, payload: P) -> Self {
        self.payload = payload;
        self
    }

    /// Validate the configuration and build an inactive machine.
    ///
    /// Every violation is reported, not just the first.
    pub fn build(self) -> Result<StateMachine<P>, BuildError> {
        self.validate()?;
        let start = self.start.ok_or(BuildError::MissingStartState)?;

        let mut machine = StateMachine::with_registry(self.states, self.payload);
        if let Some(id) = self.id {
            machine.set_id(id);
        }
        machine.add_transition(Transition::from_parts(StateId::INITIAL, Event::Start, start));
        for (from, event, to) in self.transitions {
            machine.add_transition(Transition::from_parts(from, Event::trigger(event), to));
        }
        machine.install_hooks(self.guards, self.actions, self.observer);
        Ok(machine)
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        checks.push(match &self.start {
            None => Validation::fail(BuildError::MissingStartState),
            Some(state) if state.is_reserved() => Validation::fail(BuildError::ReservedStartState {
                state: state.clone(),
            }),
            Some(_) => Validation::success(()),
        });

        for (from, event, _) in &self.transitions {
            checks.push(check_transition(from, event));
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => {
                let mut errors: Vec<BuildError> = errors.iter().cloned().collect();
                if errors.len() == 1 {
                    Err(errors.remove(0))
                } else {
                    Err(BuildError::Multiple(errors))
                }
            }
        }
    }
}

fn check_transition(from: &StateId, event: &EventId) -> Validation<(), NonEmptyVec<BuildError>> {
    if from.is_final() {
        Validation::fail(BuildError::TransitionFromFinal {
            event: event.clone(),
        })
    } else if event.is_lifecycle_hook() || (*event == EventId::START && *from != StateId::INITIAL)
    {
        Validation::fail(BuildError::ReservedEvent {
            state: from.clone(),
            event: event.clone(),
        })
    } else {
        Validation::success(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_start_state() {
        let result = StateMachineBuilder::new()
            .transition("locked", "insertCoin", "unlocked")
            .build();

        assert!(matches!(result, Err(BuildError::MissingStartState)));
    }

    #[test]
    fn builder_rejects_reserved_start_state() {
        let result = StateMachineBuilder::new()
            .start_state(StateId::INITIAL)
            .build();

        assert!(matches!(result, Err(BuildError::ReservedStartState { .. })));
    }

    #[test]
    fn builder_accumulates_all_violations() {
        let result = StateMachineBuilder::new()
            .transition(StateId::FINAL, "again", "locked")
            .transition("locked", EventId::ENTRY, "unlocked")
            .transition("locked", EventId::START, "unlocked")
            .build();

        let err = match result {
            Err(err) => err,
            Ok(_) => panic!("Expected build errors"),
        };
        let errors = err.errors();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .any(|e| matches!(e, BuildError::MissingStartState)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, BuildError::TransitionFromFinal { .. })));
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, BuildError::ReservedEvent { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn transition_registers_states_and_trigger() {
        let machine = StateMachineBuilder::new()
            .start_state("locked")
            .transition("locked", "insertCoin", "unlocked")
            .build()
            .unwrap();

        let locked = machine.state(&StateId::from("locked")).unwrap();
        assert!(locked
            .event(&EventId::from("insertCoin"))
            .is_some_and(Event::is_transition));
        assert!(machine.state(&StateId::from("unlocked")).is_some());
        assert!(machine
            .state(&StateId::INITIAL)
            .unwrap()
            .has_event(&EventId::START));
        assert_eq!(machine.transitions().len(), 2);
    }

    #[test]
    fn plain_events_do_not_transition() {
        let machine = StateMachineBuilder::new()
            .start_state("idle")
            .event("idle", "ping")
            .build()
            .unwrap();

        machine.start().unwrap();
        assert!(machine.has_event("ping"));

        machine.trigger_event("ping").unwrap();
        assert_eq!(machine.current_state().unwrap(), "idle");
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn builder_sets_machine_id() {
        let machine = StateMachineBuilder::new()
            .id("turnstile")
            .start_state("locked")
            .build()
            .unwrap();

        assert_eq!(machine.id(), Some("turnstile"));
    }
}
