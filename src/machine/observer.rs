//! Optional notification sink for tracing engine activity.

use crate::core::{Event, StateId};
use crate::error::Result;
use std::fmt;

/// Point in event processing at which observers are notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    /// An event was dequeued and resolved against the current state.
    Process,
    /// The do-activity of the current state is about to run.
    Do,
    /// The current state is about to be left.
    Exit,
    /// The transition action is about to run.
    Transition,
    /// A new state was just entered.
    Entry,
}

impl Notification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Notification::Process => "process",
            Notification::Do => "do",
            Notification::Exit => "exit",
            Notification::Transition => "transition",
            Notification::Entry => "entry",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory sink notified as the engine processes events.
///
/// `event` is `None` when the state has no event registered for the id being
/// processed (an unknown trigger, or a lifecycle hook the state lacks).
/// Observers cannot alter engine behavior, but an error they return aborts
/// processing like any other hook failure.
pub trait Observer {
    fn notify(&self, kind: Notification, state: &StateId, event: Option<&Event>) -> Result<()>;
}

/// Observer that forwards every notification to `tracing` at debug level.
#[derive(Clone, Debug, Default)]
pub struct TracingObserver {
    machine: Option<String>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every emitted event with a machine name.
    pub fn named(machine: impl Into<String>) -> Self {
        Self {
            machine: Some(machine.into()),
        }
    }
}

impl Observer for TracingObserver {
    fn notify(&self, kind: Notification, state: &StateId, event: Option<&Event>) -> Result<()> {
        let machine = self.machine.as_deref().unwrap_or("-");
        match event.map(Event::id) {
            Some(event) => tracing::debug!(
                machine,
                kind = kind.as_str(),
                state = state.as_str(),
                event = event.as_str(),
                "state machine notification"
            ),
            None => tracing::debug!(
                machine,
                kind = kind.as_str(),
                state = state.as_str(),
                "state machine notification without event"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_names_are_stable() {
        assert_eq!(Notification::Process.to_string(), "process");
        assert_eq!(Notification::Entry.as_str(), "entry");
    }

    #[test]
    fn tracing_observer_never_fails() {
        let observer = TracingObserver::named("turnstile");
        let state = StateId::from("locked");

        assert!(observer
            .notify(Notification::Process, &state, Some(&Event::trigger("pass")))
            .is_ok());
        assert!(observer.notify(Notification::Do, &state, None).is_ok());
    }
}
