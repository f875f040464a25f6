//! Opaque identifiers for states and events.
//!
//! Identifiers are cheap to clone and compare. Reserved identifiers are
//! `const` values backed by static strings, so comparing against them never
//! allocates.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

macro_rules! identifier {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Create an identifier from a static string without allocating.
            pub const fn from_static(id: &'static str) -> Self {
                Self(Cow::Borrowed(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self.as_str(), f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&'static str> for $name {
            fn from(id: &'static str) -> Self {
                Self::from_static(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(Cow::Owned(id))
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

identifier! {
    /// Identifier of a state.
    ///
    /// Two identifiers are reserved: [`StateId::INITIAL`], the synthetic state
    /// every machine starts in, and [`StateId::FINAL`], whose arrival ends the
    /// machine.
    StateId
}

identifier! {
    /// Identifier of an event.
    ///
    /// [`EventId::START`], [`EventId::ENTRY`], [`EventId::EXIT`] and
    /// [`EventId::DO`] are reserved for lifecycle events raised by the engine.
    EventId
}

impl StateId {
    pub const INITIAL: StateId = StateId::from_static("__INITIAL__");
    pub const FINAL: StateId = StateId::from_static("__FINAL__");

    /// Whether this is one of the synthetic INITIAL/FINAL states.
    pub fn is_reserved(&self) -> bool {
        *self == Self::INITIAL || *self == Self::FINAL
    }

    pub fn is_final(&self) -> bool {
        *self == Self::FINAL
    }
}

impl EventId {
    pub const START: EventId = EventId::from_static("__START__");
    pub const ENTRY: EventId = EventId::from_static("__ENTRY__");
    pub const EXIT: EventId = EventId::from_static("__EXIT__");
    pub const DO: EventId = EventId::from_static("__DO__");

    /// Whether this is one of the four lifecycle ids.
    pub fn is_reserved(&self) -> bool {
        self.is_lifecycle_hook() || *self == Self::START
    }

    /// ENTRY, EXIT and DO: ids that can never trigger a transition.
    pub fn is_lifecycle_hook(&self) -> bool {
        *self == Self::ENTRY || *self == Self::EXIT || *self == Self::DO
    }
}
