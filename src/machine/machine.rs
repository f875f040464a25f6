//! The event-processing engine.

use super::action::{ActionChain, ActionRunner};
use super::observer::{Notification, Observer};
use crate::core::{
    Event, EventId, GuardChain, GuardEvaluator, State, StateCollection, StateId, StateRegistry,
    Transition, TransitionLog, TransitionTable,
};
use crate::error::{Result, StateMachineError};
use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// A finite state machine driven by queued events.
///
/// Configuration (`add_*`, `set_*`) takes `&mut self` and happens before the
/// machine starts. Everything that runs while events are processed takes
/// `&self`, so guards and actions receive the machine by shared reference and
/// may queue further events from inside the drain loop.
///
/// The current state is never stored: it is read off the last entry of the
/// transition log.
///
/// # Example
///
/// ```rust
/// use statelog::StateMachineBuilder;
///
/// let machine = StateMachineBuilder::new()
///     .start_state("locked")
///     .transition("locked", "insertCoin", "unlocked")
///     .transition("unlocked", "pass", "locked")
///     .build()
///     .unwrap();
///
/// assert!(machine.current_state().is_none());
///
/// machine.start().unwrap();
/// assert_eq!(machine.current_state().unwrap(), "locked");
///
/// machine.trigger_event("insertCoin").unwrap();
/// machine.trigger_event("pass").unwrap();
/// assert_eq!(machine.current_state().unwrap(), "locked");
/// assert_eq!(machine.previous_state().unwrap(), "unlocked");
/// ```
pub struct StateMachine<P = ()> {
    id: Option<String>,
    states: Box<dyn StateRegistry>,
    transitions: TransitionTable,
    guards: GuardChain<P>,
    actions: ActionChain<P>,
    observer: Option<Box<dyn Observer>>,
    payload: RefCell<P>,
    active: Cell<bool>,
    draining: Cell<bool>,
    queue: RefCell<VecDeque<EventId>>,
    log: RefCell<TransitionLog>,
}

impl StateMachine<()> {
    /// Create an inactive machine without a payload.
    pub fn new() -> Self {
        Self::with_payload(())
    }
}

impl Default for StateMachine<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> StateMachine<P> {
    /// Create an inactive machine owning `payload`. The registry starts with
    /// the synthetic INITIAL and FINAL states.
    pub fn with_payload(payload: P) -> Self {
        Self::with_registry(StateCollection::with_reserved_states(), payload)
    }

    /// Create an inactive machine resolving states from `registry`.
    pub fn with_registry(registry: impl StateRegistry + 'static, payload: P) -> Self {
        Self {
            id: None,
            states: Box::new(registry),
            transitions: TransitionTable::new(),
            guards: GuardChain::new(),
            actions: ActionChain::new(),
            observer: None,
            payload: RefCell::new(payload),
            active: Cell::new(false),
            draining: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
            log: RefCell::new(TransitionLog::new()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn add_state(&mut self, state: State) {
        self.states.insert(state);
    }

    pub fn state(&self, id: &StateId) -> Option<&State> {
        self.states.get(id)
    }

    /// Register `transition`, replacing any transition with the same source
    /// state and trigger event.
    pub fn add_transition(&mut self, transition: Transition) {
        if let Some(replaced) = self.transitions.register(transition) {
            trace!(
                from = replaced.from().as_str(),
                event = replaced.event().id().as_str(),
                "transition redefined"
            );
        }
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn add_guard_evaluator(&mut self, evaluator: impl GuardEvaluator<P> + 'static) {
        self.guards.push(Box::new(evaluator));
    }

    pub fn add_action_runner(&mut self, runner: impl ActionRunner<P> + 'static) {
        self.actions.push(Box::new(runner));
    }

    pub fn set_observer(&mut self, observer: impl Observer + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub(crate) fn install_hooks(
        &mut self,
        guards: GuardChain<P>,
        actions: ActionChain<P>,
        observer: Option<Box<dyn Observer>>,
    ) {
        self.guards = guards;
        self.actions = actions;
        self.observer = observer;
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn set_payload(&mut self, payload: P) {
        *self.payload.get_mut() = payload;
    }

    /// Borrow the payload.
    ///
    /// Fails with [`StateMachineError::PayloadInUse`] when called from inside
    /// an action, which already holds it; use the action's payload argument.
    pub fn payload(&self) -> Result<Ref<'_, P>> {
        self.payload
            .try_borrow()
            .map_err(|_| StateMachineError::PayloadInUse)
    }

    pub fn payload_mut(&mut self) -> &mut P {
        self.payload.get_mut()
    }

    pub fn into_payload(self) -> P {
        self.payload.into_inner()
    }

    /// Activate the machine and process the START event, moving it out of
    /// INITIAL along the transition registered for START.
    pub fn start(&self) -> Result<()> {
        if self.active.get() {
            return Err(StateMachineError::AlreadyStarted);
        }
        if self.is_ended() {
            return Err(StateMachineError::AlreadyShutdown);
        }

        debug!(machine = self.id().unwrap_or("-"), "starting state machine");
        self.active.set(true);
        self.trigger_event(EventId::START)
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Whether the last committed transition entered FINAL.
    pub fn is_ended(&self) -> bool {
        self.log.borrow().is_ended()
    }

    /// The state the machine is in, derived from the transition log.
    ///
    /// `None` before `start()`. INITIAL while starting, until the START
    /// transition commits. FINAL once the machine has ended.
    pub fn current_state(&self) -> Option<StateId> {
        let log = self.log.borrow();
        if self.active.get() {
            return Some(log.current_state().cloned().unwrap_or(StateId::INITIAL));
        }
        if log.is_ended() {
            return log.current_state().cloned();
        }
        None
    }

    /// The `from` state of the last committed transition.
    ///
    /// `None` before `start()` and until the START transition commits.
    pub fn previous_state(&self) -> Option<StateId> {
        let log = self.log.borrow();
        if self.active.get() || log.is_ended() {
            return log.previous_state().cloned();
        }
        None
    }

    /// Whether the current state recognizes `event`.
    pub fn has_event(&self, event: impl Into<EventId>) -> bool {
        let event = event.into();
        self.current_state()
            .is_some_and(|state| self.states.event(&state, &event).is_some())
    }

    /// Snapshot of the transition log.
    pub fn transition_log(&self) -> TransitionLog {
        self.log.borrow().clone()
    }

    /// Number of committed transitions.
    pub fn transition_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Number of events waiting to be processed.
    pub fn pending_events(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Append `event` to the queue without processing it.
    pub fn queue_event(&self, event: impl Into<EventId>) -> Result<()> {
        if !self.active.get() {
            return Err(if self.is_ended() {
                StateMachineError::AlreadyShutdown
            } else {
                StateMachineError::NotStarted
            });
        }

        self.queue.borrow_mut().push_back(event.into());
        Ok(())
    }

    /// Queue `event` and process the queue until it is empty.
    ///
    /// When called from a guard or action that is already running inside a
    /// drain, the event is only queued; the outermost call processes it after
    /// the current event, in FIFO order. If processing fails, the remaining
    /// queue is discarded and the error is returned.
    pub fn trigger_event(&self, event: impl Into<EventId>) -> Result<()> {
        self.queue_event(event)?;
        if self.draining.replace(true) {
            return Ok(());
        }

        let _draining = DrainingFlag(&self.draining);
        let result = self.drain();
        if result.is_err() {
            self.queue.borrow_mut().clear();
        }
        result
    }

    fn drain(&self) -> Result<()> {
        while let Some(event) = self.next_event() {
            if self.is_ended() {
                return Err(StateMachineError::AlreadyShutdown);
            }
            self.process(&event)?;
        }
        Ok(())
    }

    fn next_event(&self) -> Option<EventId> {
        self.queue.borrow_mut().pop_front()
    }

    fn process(&self, event_id: &EventId) -> Result<()> {
        let state = self.require_current_state()?;
        let event = self.resolve_event(&state, event_id)?;
        trace!(
            state = state.as_str(),
            event = event_id.as_str(),
            recognized = event.is_some(),
            "processing event"
        );
        self.notify(Notification::Process, &state, event.as_ref())?;

        if let Some(event) = event.filter(Event::is_transition) {
            if self.evaluate_guards(&event)? {
                self.transition(&state, &event)?;
                if self.is_ended() {
                    self.active.set(false);
                    debug!(machine = self.id().unwrap_or("-"), "state machine ended");
                }
            } else {
                trace!(
                    state = state.as_str(),
                    event = event_id.as_str(),
                    "transition blocked by guard"
                );
            }
        }

        let state = self.require_current_state()?;
        let activity = self.resolve_event(&state, &EventId::DO)?;
        self.notify(Notification::Do, &state, activity.as_ref())?;
        if let Some(activity) = activity {
            self.run_actions(&activity)?;
        }
        Ok(())
    }

    /// EXIT, transition action, log append, ENTRY. The current state changes
    /// at the append and nowhere else.
    fn transition(&self, from: &StateId, event: &Event) -> Result<()> {
        let transition = self
            .transitions
            .resolve(from, &event.id())
            .cloned()
            .ok_or_else(|| StateMachineError::TransitionNotFound {
                state: from.clone(),
                event: event.id(),
            })?;
        if !self.states.contains(transition.to()) {
            return Err(StateMachineError::StateNotFound {
                state: transition.to().clone(),
            });
        }

        let exit = self.resolve_event(from, &EventId::EXIT)?;
        self.notify(Notification::Exit, from, exit.as_ref())?;
        if let Some(exit) = exit {
            self.run_actions(&exit)?;
        }

        self.notify(Notification::Transition, from, Some(event))?;
        self.run_actions(event)?;

        let to = transition.to().clone();
        debug!(
            from = from.as_str(),
            event = event.id().as_str(),
            to = to.as_str(),
            "transition committed"
        );
        self.log.borrow_mut().append(transition);

        let entry = self.resolve_event(&to, &EventId::ENTRY)?;
        self.notify(Notification::Entry, &to, entry.as_ref())?;
        if let Some(entry) = entry {
            self.run_actions(&entry)?;
        }
        Ok(())
    }

    fn require_current_state(&self) -> Result<StateId> {
        self.current_state().ok_or(StateMachineError::NotStarted)
    }

    fn resolve_event(&self, state: &StateId, event: &EventId) -> Result<Option<Event>> {
        let state = self
            .states
            .get(state)
            .ok_or_else(|| StateMachineError::StateNotFound {
                state: state.clone(),
            })?;
        Ok(state.event(event).cloned())
    }

    fn evaluate_guards(&self, event: &Event) -> Result<bool> {
        let payload = self.payload()?;
        self.guards.evaluate(event, &payload, self)
    }

    fn run_actions(&self, event: &Event) -> Result<()> {
        self.actions.run(event, &self.payload, self)
    }

    fn notify(&self, kind: Notification, state: &StateId, event: Option<&Event>) -> Result<()> {
        match &self.observer {
            Some(observer) => observer.notify(kind, state, event),
            None => Ok(()),
        }
    }
}

/// Clears the draining flag when the outermost drain returns or unwinds.
struct DrainingFlag<'a>(&'a Cell<bool>);

impl Drop for DrainingFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use crate::machine::Action;

    fn turnstile() -> StateMachine {
        let mut machine = StateMachine::new();
        for (from, event, to) in [
            ("locked", "insertCoin", "unlocked"),
            ("unlocked", "pass", "locked"),
        ] {
            let mut state = machine
                .state(&StateId::from(from))
                .cloned()
                .unwrap_or_else(|| State::new(from));
            state.add_event(Event::trigger(event));
            machine.add_state(state);
            machine.add_transition(Transition::new(from, event, to).unwrap());
        }

        machine.add_transition(
            Transition::new(StateId::INITIAL, EventId::START, "locked").unwrap(),
        );
        machine
    }

    #[test]
    fn unstarted_machine_has_no_state() {
        let machine = turnstile();

        assert!(!machine.is_active());
        assert!(!machine.is_ended());
        assert!(machine.current_state().is_none());
        assert!(machine.previous_state().is_none());
        assert!(matches!(
            machine.queue_event("pass"),
            Err(StateMachineError::NotStarted)
        ));
        assert!(matches!(
            machine.trigger_event("pass"),
            Err(StateMachineError::NotStarted)
        ));
    }

    #[test]
    fn start_moves_out_of_initial() {
        let machine = turnstile();
        machine.start().unwrap();

        assert!(machine.is_active());
        assert_eq!(machine.current_state().unwrap(), "locked");
        assert_eq!(machine.previous_state(), Some(StateId::INITIAL));
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn machine_configured_without_builder_starts() {
        let mut machine = StateMachine::new();
        machine.add_state(State::new("locked"));
        machine.add_transition(
            Transition::new(StateId::INITIAL, EventId::START, "locked").unwrap(),
        );

        machine.start().unwrap();

        assert_eq!(machine.current_state().unwrap(), "locked");
        assert_eq!(machine.previous_state(), Some(StateId::INITIAL));
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn start_twice_fails() {
        let machine = turnstile();
        machine.start().unwrap();

        assert!(matches!(machine.start(), Err(StateMachineError::AlreadyStarted)));
    }

    #[test]
    fn unknown_trigger_is_a_no_op() {
        let machine = turnstile();
        machine.start().unwrap();

        machine.trigger_event("pass").unwrap();

        assert_eq!(machine.current_state().unwrap(), "locked");
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn missing_start_transition_surfaces_at_resolution() {
        let machine = StateMachine::new();

        let err = machine.start().unwrap_err();

        assert!(matches!(err, StateMachineError::TransitionNotFound { .. }));
        assert!(machine.is_active());
        assert_eq!(machine.current_state(), Some(StateId::INITIAL));
        assert_eq!(machine.pending_events(), 0);
    }

    #[test]
    fn unregistered_target_state_is_reported_before_side_effects() {
        let mut machine = StateMachine::with_payload(0u32);
        machine.add_transition(
            Transition::new(StateId::INITIAL, EventId::START, "nowhere").unwrap(),
        );
        machine.add_action_runner(Action::new(|_, count: &mut u32, _| {
            *count += 1;
            Ok(())
        }));

        let err = machine.start().unwrap_err();

        assert!(matches!(
            err,
            StateMachineError::StateNotFound { ref state } if state == "nowhere"
        ));
        assert_eq!(*machine.payload().unwrap(), 0);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn guard_rejection_keeps_state() {
        let mut machine = turnstile();
        machine.add_guard_evaluator(Guard::for_event("insertCoin", |_, _| false));
        machine.start().unwrap();

        machine.trigger_event("insertCoin").unwrap();

        assert_eq!(machine.current_state().unwrap(), "locked");
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn guard_error_propagates() {
        struct Failing;
        impl GuardEvaluator<()> for Failing {
            fn evaluate(&self, _: &Event, _: &(), _: &StateMachine<()>) -> Result<bool> {
                Err(StateMachineError::handler("guard exploded"))
            }
        }
        let mut machine = turnstile();
        machine.add_guard_evaluator(Failing);

        assert!(matches!(machine.start(), Err(StateMachineError::Handler(_))));
        assert_eq!(machine.current_state(), Some(StateId::INITIAL));
    }

    #[test]
    fn payload_is_unavailable_through_machine_inside_actions() {
        let mut machine = StateMachine::with_payload(Vec::<bool>::new());
        machine.add_state(State::new("idle"));
        machine.add_transition(Transition::new(StateId::INITIAL, EventId::START, "idle").unwrap());
        machine.add_action_runner(Action::new(
            |_, seen: &mut Vec<bool>, inner: &StateMachine<Vec<bool>>| {
                seen.push(matches!(inner.payload(), Err(StateMachineError::PayloadInUse)));
                Ok(())
            },
        ));

        machine.start().unwrap();

        assert_eq!(*machine.payload().unwrap(), vec![true]);
    }

    #[test]
    fn set_payload_replaces_value() {
        let mut machine = StateMachine::with_payload(1u8);
        machine.set_payload(2);
        *machine.payload_mut() += 1;

        assert_eq!(machine.into_payload(), 3);
    }

    #[test]
    fn has_event_follows_current_state() {
        let machine = turnstile();
        assert!(!machine.has_event("insertCoin"));

        machine.start().unwrap();
        assert!(machine.has_event("insertCoin"));
        assert!(!machine.has_event("pass"));

        machine.trigger_event("insertCoin").unwrap();
        assert!(machine.has_event("pass"));
        assert!(!machine.has_event("insertCoin"));
    }

    #[test]
    fn panicking_action_does_not_wedge_the_drain_loop() {
        let mut machine = turnstile();
        machine.add_action_runner(Action::new(|event: &Event, _: &mut (), _| {
            if event.id() == "pass" {
                panic!("jammed");
            }
            Ok(())
        }));
        machine.add_transition(Transition::new("locked", "pass", "locked").unwrap());
        let mut locked = machine.state(&StateId::from("locked")).cloned().unwrap();
        locked.add_event(Event::trigger("pass"));
        machine.add_state(locked);
        machine.start().unwrap();

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            machine.trigger_event("pass")
        }));
        assert!(unwound.is_err());

        machine.trigger_event("insertCoin").unwrap();

        assert_eq!(machine.current_state().unwrap(), "unlocked");
        assert_eq!(machine.pending_events(), 0);
    }
}
