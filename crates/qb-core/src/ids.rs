//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as bookkeeping map
//! keys and sorted without ceremony.  Agents are opaque to the engine: an
//! `AgentId` is whatever the host uses to identify a simulated actor.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    };
}

typed_id! {
    /// Identity of a simulated agent.  Owned by the host, never by the engine.
    pub struct AgentId(u32);
}

typed_id! {
    /// Identity of a quest inside a `QuestRegistry`.
    pub struct QuestId(u32);
}

typed_id! {
    /// Identity of an objective.  Objective equality (removal, completion
    /// bookkeeping) is defined by this ID alone.
    pub struct ObjectiveId(u32);
}
