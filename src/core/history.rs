//! Append-only transition log.
//!
//! The log is the only record of where a machine is. The current state is the
//! `to` state of the last entry and the previous state is its `from` state;
//! nothing else in the engine stores a cursor.

use super::event::Event;
use super::id::StateId;
use super::transition::Transition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::time::Duration;

/// A committed transition and the time it was committed.
///
/// Dereferences to the wrapped [`Transition`].
///
/// # Example
///
/// ```rust
/// use statelog::core::{StateId, Transition, TransitionLogEntry};
/// use chrono::Utc;
///
/// let entry = TransitionLogEntry::new(
///     Transition::new("locked", "insertCoin", "unlocked").unwrap(),
///     Utc::now(),
/// );
///
/// assert_eq!(entry.from(), &StateId::from("locked"));
/// assert_eq!(entry.to(), &StateId::from("unlocked"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionLogEntry {
    transition: Transition,
    timestamp: DateTime<Utc>,
}

impl TransitionLogEntry {
    pub fn new(transition: Transition, timestamp: DateTime<Utc>) -> Self {
        Self {
            transition,
            timestamp,
        }
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Deref for TransitionLogEntry {
    type Target = Transition;

    fn deref(&self) -> &Transition {
        &self.transition
    }
}

/// Ordered, append-only sequence of committed transitions.
///
/// Timestamps never decrease: an entry stamped earlier than its predecessor
/// (e.g. after a wall-clock adjustment) takes the predecessor's timestamp.
///
/// # Example
///
/// ```rust
/// use statelog::core::{StateId, Transition, TransitionLog};
///
/// let mut log = TransitionLog::new();
/// log.append(Transition::new("Washing", "w", "Rinsing").unwrap());
/// log.append(Transition::new("Rinsing", "r", "Spinning").unwrap());
///
/// assert_eq!(log.current_state(), Some(&StateId::from("Spinning")));
/// assert_eq!(log.previous_state(), Some(&StateId::from("Rinsing")));
///
/// let path = log.path();
/// assert_eq!(path.len(), 3); // Washing -> Rinsing -> Spinning
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    entries: Vec<TransitionLogEntry>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `transition`, stamped with the current time.
    pub fn append(&mut self, transition: Transition) -> &TransitionLogEntry {
        self.append_at(transition, Utc::now())
    }

    /// Append `transition` with an explicit timestamp, clamped so the log stays
    /// in non-decreasing time order.
    pub fn append_at(
        &mut self,
        transition: Transition,
        timestamp: DateTime<Utc>,
    ) -> &TransitionLogEntry {
        let timestamp = match self.entries.last() {
            Some(last) if last.timestamp > timestamp => last.timestamp,
            _ => timestamp,
        };
        self.entries.push(TransitionLogEntry::new(transition, timestamp));
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TransitionLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TransitionLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransitionLogEntry> {
        self.entries.iter()
    }

    /// `to` state of the last entry.
    pub fn current_state(&self) -> Option<&StateId> {
        self.last().map(|entry| entry.to())
    }

    /// `from` state of the last entry.
    pub fn previous_state(&self) -> Option<&StateId> {
        self.last().map(|entry| entry.from())
    }

    /// Whether the last committed transition entered FINAL.
    pub fn is_ended(&self) -> bool {
        self.current_state().is_some_and(StateId::is_final)
    }

    /// States traversed: the first entry's `from`, then every `to`.
    pub fn path(&self) -> Vec<&StateId> {
        let mut path = Vec::with_capacity(self.entries.len() + 1);
        if let Some(first) = self.entries.first() {
            path.push(first.from());
        }
        path.extend(self.entries.iter().map(|entry| entry.to()));
        path
    }

    /// Events that triggered each committed transition, in order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().map(|entry| entry.event())
    }

    /// Time between the first and last entries, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.entries.first()?, self.entries.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}

impl<'a> IntoIterator for &'a TransitionLog {
    type Item = &'a TransitionLogEntry;
    type IntoIter = std::slice::Iter<'a, TransitionLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
