//! Collaborator service traits
//!
//! Abstract operations the engine consumes and drives; protocol and
//! format belong to the implementations. The business-day, slot, and
//! assignment services deliver loosely-typed raw shapes which the
//! reconciler validates exactly once at this boundary.

use crate::error::ServiceError;
use rota_model::{
    AssignmentId, AssignmentStatus, AttendanceCollection, AttendanceResponse, BusinessDayId,
    CollectionId, EventId, Member, MemberId, RawAssignment, RawBusinessDay, RawShiftSlot, Role,
    SlotId,
};

/// Query filter for assignment listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    /// Restrict to one slot
    pub slot_id: Option<SlotId>,
    /// Restrict to one member
    pub member_id: Option<MemberId>,
    /// Restrict to one status
    pub status: Option<AssignmentStatus>,
}

impl AssignmentFilter {
    /// Empty filter (everything)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a slot
    #[inline]
    #[must_use]
    pub fn for_slot(mut self, slot_id: SlotId) -> Self {
        self.slot_id = Some(slot_id);
        self
    }

    /// Restrict to a member
    #[inline]
    #[must_use]
    pub fn for_member(mut self, member_id: MemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    /// Restrict to a status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: AssignmentStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Attendance collection reads
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AttendanceService: Send + Sync {
    /// Fetch a collection and its target dates
    async fn get_collection(&self, id: CollectionId)
        -> Result<AttendanceCollection, ServiceError>;

    /// Fetch all responses recorded for a collection
    async fn list_responses(
        &self,
        id: CollectionId,
    ) -> Result<Vec<AttendanceResponse>, ServiceError>;
}

/// Shift slot reads
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ShiftSlotService: Send + Sync {
    /// Fetch the slots owned by a business day
    async fn list_slots(
        &self,
        business_day_id: BusinessDayId,
    ) -> Result<Vec<RawShiftSlot>, ServiceError>;
}

/// Assignment reads and mutations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AssignmentService: Send + Sync {
    /// List assignments matching the filter
    async fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> Result<Vec<RawAssignment>, ServiceError>;

    /// Create a confirmed assignment
    ///
    /// # Errors
    /// [`ServiceError::Conflict`] is the authoritative signal that the
    /// slot reached capacity since the caller last refreshed.
    async fn create(
        &self,
        slot_id: SlotId,
        member_id: MemberId,
        note: Option<String>,
    ) -> Result<RawAssignment, ServiceError>;

    /// Cancel an assignment
    ///
    /// Cancelling an already-cancelled assignment succeeds (idempotent).
    async fn cancel(&self, assignment_id: AssignmentId) -> Result<(), ServiceError>;
}

/// Member and role directory reads
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DirectoryService: Send + Sync {
    /// Active members eligible for display and assignment
    async fn list_active_members(&self) -> Result<Vec<Member>, ServiceError>;

    /// All roles, for filtering and grouping
    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError>;
}

/// Business day reads
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BusinessDayService: Send + Sync {
    /// Operating days defined for an event
    async fn list_business_days(
        &self,
        event_id: EventId,
    ) -> Result<Vec<RawBusinessDay>, ServiceError>;
}
