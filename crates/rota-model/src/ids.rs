//! Typed identifiers for roster entities
//!
//! Every entity id is a newtype over [`Uuid`] so that a slot id can never
//! be passed where a member id is expected. Ids originate in the external
//! services; `new()` exists for fixtures and tests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id! {
    /// Unique member identifier
    MemberId
}

entity_id! {
    /// Unique role identifier
    RoleId
}

entity_id! {
    /// Unique attendance-collection identifier
    CollectionId
}

entity_id! {
    /// Unique target-date identifier (distinct from the calendar date itself)
    TargetDateId
}

entity_id! {
    /// Unique business-day identifier
    BusinessDayId
}

entity_id! {
    /// Unique slot-instance identifier
    InstanceId
}

entity_id! {
    /// Unique shift-slot identifier
    SlotId
}

entity_id! {
    /// Unique shift-assignment identifier
    AssignmentId
}

entity_id! {
    /// Unique event identifier (owner of business days)
    EventId
}
