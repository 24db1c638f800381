//! Type-safe identifier wrappers.
//!
//! League records are keyed by small integers the way the game has always
//! numbered them (team 0 is the first franchise, player IDs are assigned
//! sequentially). Each kind of ID gets its own newtype so a team ID can
//! never be passed where a player ID is expected. Narrative events are the
//! exception: they use UUID v7 so they sort by creation time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw integer identifier.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Team identifier (`tid`).
    Tid
}

define_id! {
    /// Player identifier (`pid`).
    Pid
}

define_id! {
    /// Game identifier (`gid`), shared by scheduled and completed games.
    Gid
}

define_id! {
    /// Owner message identifier (`mid`).
    Mid
}

/// Unique identifier for a narrative event in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_serialize_transparently() {
        let json = serde_json::to_string(&Tid::new(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
        let restored: Result<Pid, _> = serde_json::from_str("12");
        assert_eq!(restored.ok(), Some(Pid::new(12)));
    }

    #[test]
    fn ids_order_numerically() {
        assert!(Gid::new(2) < Gid::new(10));
        assert_eq!(Mid::new(4).get(), 4);
    }

    #[test]
    fn event_ids_are_time_ordered() {
        let first = EventId::new();
        let second = EventId::new();
        assert!(first <= second);
        assert_eq!(first.to_string(), first.into_inner().to_string());
    }
}
