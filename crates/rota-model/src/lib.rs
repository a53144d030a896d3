//! Rota Model - domain records for shift-slot reconciliation
//!
//! The typed vocabulary shared by the reconciliation reducer and the
//! command layer:
//! - Typed identifiers for every roster entity
//! - Members, roles, target dates, attendance responses
//! - Business days, shift slots, assignments
//! - One-shot boundary validation of loosely-typed collaborator payloads

#![warn(unreachable_pub)]

pub mod boundary;
pub mod error;
pub mod ids;
pub mod records;

// Re-exports for convenience
pub use boundary::{RawAssignment, RawBusinessDay, RawShiftSlot};
pub use error::ModelError;
pub use ids::{
    AssignmentId, BusinessDayId, CollectionId, EventId, InstanceId, MemberId, RoleId, SlotId,
    TargetDateId,
};
pub use records::{
    AssignmentStatus, AttendanceCollection, AttendanceResponse, BusinessDay, Member, ResponseKind,
    Role, ShiftAssignment, ShiftSlot, SlotInstance, TargetDate, TimeWindow,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
