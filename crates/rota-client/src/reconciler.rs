//! Reconciliation cycle coordination
//!
//! Loads a target date's state from the collaborators, hands it to the
//! pure reducer, and re-runs the whole load after every successful
//! mutation. Consistency comes from wholesale refetch, never from
//! incremental patching: the snapshot a caller holds is immutable and a
//! mutation returns a freshly loaded one.

use crate::error::{EngineError, ServiceError, ValidationError};
use crate::mutator::{BulkReplaceReport, RosterEditor};
use crate::services::{
    AssignmentFilter, AssignmentService, AttendanceService, BusinessDayService, DirectoryService,
    ShiftSlotService,
};
use crate::session::SessionContext;
use rota_model::{
    AssignmentId, AssignmentStatus, AttendanceCollection, BusinessDay, BusinessDayId, CollectionId,
    EventId, Member, MemberId, Role, ShiftAssignment, ShiftSlot, SlotId, TargetDate,
};
use rota_recon::{AvailabilityPool, ResponseBook, SlotBoard};
use std::sync::Arc;

/// Handles to the five collaborator services
#[derive(Clone)]
pub struct Collaborators {
    /// Attendance collection reads
    pub attendance: Arc<dyn AttendanceService>,
    /// Shift slot reads
    pub slots: Arc<dyn ShiftSlotService>,
    /// Assignment reads and mutations
    pub assignments: Arc<dyn AssignmentService>,
    /// Member and role directory
    pub directory: Arc<dyn DirectoryService>,
    /// Business day reads
    pub business_days: Arc<dyn BusinessDayService>,
}

/// Members and roles for the review table and picker
#[derive(Debug, Clone)]
pub struct Directory {
    /// Active members
    pub members: Vec<Member>,
    /// All roles
    pub roles: Vec<Role>,
}

/// Reconciled state for one target date
///
/// Rebuilt wholesale after every successful mutation; callers never
/// patch it in place.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    /// The date under reconciliation
    pub target_date: TargetDate,
    /// Matched business day; `None` renders the slot section empty
    pub business_day: Option<BusinessDay>,
    /// Aggregated responses
    pub book: ResponseBook,
    /// Capacity view over the day's slots
    pub board: SlotBoard,
    /// Assignable members
    pub pool: AvailabilityPool,
}

impl DaySnapshot {
    /// True when no business day (and so no slot section) matched
    #[inline]
    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.business_day.is_none()
    }
}

/// The reconciliation engine's command surface
pub struct ShiftReconciler {
    collaborators: Collaborators,
    editor: RosterEditor,
    session: SessionContext,
}

impl ShiftReconciler {
    /// Create a reconciler over the given collaborators
    #[must_use]
    pub fn new(collaborators: Collaborators, session: SessionContext) -> Self {
        let editor = RosterEditor::new(Arc::clone(&collaborators.assignments), session.clone());
        Self {
            collaborators,
            editor,
            session,
        }
    }

    /// Fetch a collection and its target dates
    ///
    /// # Errors
    /// Not-found or transient failure from the attendance service.
    pub async fn load_collection(
        &self,
        id: CollectionId,
    ) -> Result<AttendanceCollection, EngineError> {
        self.collaborators
            .attendance
            .get_collection(id)
            .await
            .map_err(EngineError::from_fetch_failure)
    }

    /// Fetch active members and roles
    ///
    /// # Errors
    /// Not-found or transient failure from the directory service.
    pub async fn load_directory(&self) -> Result<Directory, EngineError> {
        let members = self
            .collaborators
            .directory
            .list_active_members()
            .await
            .map_err(EngineError::from_fetch_failure)?;
        let roles = self
            .collaborators
            .directory
            .list_roles()
            .await
            .map_err(EngineError::from_fetch_failure)?;
        Ok(Directory { members, roles })
    }

    /// Load the reconciled snapshot for one target date
    ///
    /// A missing business day or slot set degrades to an empty-state
    /// snapshot for that section instead of failing the load.
    ///
    /// # Errors
    /// Transient collaborator failures and malformed payloads.
    pub async fn load_day(
        &self,
        event_id: EventId,
        target_date: &TargetDate,
    ) -> Result<DaySnapshot, EngineError> {
        tracing::info!(
            actor = ?self.session.actor(),
            date = %target_date.date,
            "loading day snapshot"
        );

        let business_day = self.find_business_day(event_id, target_date).await?;

        let responses = match self
            .collaborators
            .attendance
            .list_responses(target_date.collection_id)
            .await
        {
            Ok(responses) => responses,
            Err(ServiceError::NotFound(what)) => {
                tracing::debug!(%what, "no responses recorded, using empty set");
                Vec::new()
            }
            Err(err) => return Err(EngineError::from_fetch_failure(err)),
        };
        let book = ResponseBook::aggregate(&responses);

        let (slots, assignments) = match &business_day {
            Some(day) => self.load_slots_and_assignments(day.id).await?,
            None => (Vec::new(), Vec::new()),
        };
        let board = SlotBoard::build(&slots, &assignments);
        let pool = AvailabilityPool::resolve(target_date.id, &book, &board);

        tracing::debug!(
            slots = board.slot_count(),
            assignable = pool.len(),
            "day snapshot ready"
        );
        Ok(DaySnapshot {
            target_date: target_date.clone(),
            business_day,
            book,
            board,
            pool,
        })
    }

    /// Assign a member to a slot, then reload the day
    ///
    /// # Errors
    /// Validation, conflict, or transient failure. On any error the
    /// caller's snapshot stays valid and unchanged; after a conflict it
    /// must be refreshed via [`ShiftReconciler::load_day`] before
    /// retrying.
    pub async fn assign(
        &self,
        event_id: EventId,
        snapshot: &DaySnapshot,
        slot_id: SlotId,
        member_id: MemberId,
        note: Option<String>,
    ) -> Result<DaySnapshot, EngineError> {
        if snapshot.is_empty_state() {
            return Err(ValidationError::NoBusinessDay {
                date: snapshot.target_date.date,
            }
            .into());
        }
        let status = snapshot
            .board
            .slot_status(slot_id)
            .ok_or_else(|| EngineError::NotFound(format!("slot {slot_id}")))?;

        self.editor
            .assign(status, member_id, note, &snapshot.pool)
            .await?;
        self.load_day(event_id, &snapshot.target_date).await
    }

    /// Cancel an assignment, then reload the day
    ///
    /// An assignment absent from the snapshot (already cancelled by
    /// another session) is treated as success; the reload reflects
    /// whatever the authoritative state is.
    ///
    /// # Errors
    /// Transient or not-found failures from the assignment service.
    pub async fn unassign(
        &self,
        event_id: EventId,
        snapshot: &DaySnapshot,
        assignment_id: AssignmentId,
    ) -> Result<DaySnapshot, EngineError> {
        let assignment = snapshot
            .board
            .confirmed_assignments()
            .find(|a| a.id == assignment_id)
            .cloned();
        match assignment {
            Some(assignment) => self.editor.unassign(&assignment).await?,
            None => {
                tracing::debug!(%assignment_id, "assignment not in snapshot, nothing to cancel");
            }
        }
        self.load_day(event_id, &snapshot.target_date).await
    }

    /// Replace a slot's roster, then reload the day
    ///
    /// Per-item failures do not fail the call; they come back in the
    /// report and the reload shows the resulting (possibly uneven)
    /// state.
    ///
    /// # Errors
    /// Upfront validation only; see [`RosterEditor::bulk_replace`].
    pub async fn bulk_replace(
        &self,
        event_id: EventId,
        snapshot: &DaySnapshot,
        slot_id: SlotId,
        desired: &[MemberId],
    ) -> Result<(BulkReplaceReport, DaySnapshot), EngineError> {
        if snapshot.is_empty_state() {
            return Err(ValidationError::NoBusinessDay {
                date: snapshot.target_date.date,
            }
            .into());
        }
        let status = snapshot
            .board
            .slot_status(slot_id)
            .ok_or_else(|| EngineError::NotFound(format!("slot {slot_id}")))?;

        let report = self.editor.bulk_replace(status, desired).await?;
        let refreshed = self.load_day(event_id, &snapshot.target_date).await?;
        Ok((report, refreshed))
    }

    async fn find_business_day(
        &self,
        event_id: EventId,
        target_date: &TargetDate,
    ) -> Result<Option<BusinessDay>, EngineError> {
        let raw_days = match self
            .collaborators
            .business_days
            .list_business_days(event_id)
            .await
        {
            Ok(days) => days,
            Err(ServiceError::NotFound(what)) => {
                tracing::debug!(%what, "no business days defined, empty-state view");
                return Ok(None);
            }
            Err(err) => return Err(EngineError::from_fetch_failure(err)),
        };

        let mut days = Vec::with_capacity(raw_days.len());
        for raw in raw_days {
            days.push(raw.validate()?);
        }
        Ok(days.into_iter().find(|day| day.date == target_date.date))
    }

    async fn load_slots_and_assignments(
        &self,
        business_day_id: BusinessDayId,
    ) -> Result<(Vec<ShiftSlot>, Vec<ShiftAssignment>), EngineError> {
        let raw_slots = match self.collaborators.slots.list_slots(business_day_id).await {
            Ok(slots) => slots,
            Err(ServiceError::NotFound(what)) => {
                tracing::debug!(%what, "no slot set for day, empty-state view");
                return Ok((Vec::new(), Vec::new()));
            }
            Err(err) => return Err(EngineError::from_fetch_failure(err)),
        };

        let mut slots = Vec::with_capacity(raw_slots.len());
        for raw in raw_slots {
            slots.push(raw.validate()?);
        }

        let mut assignments = Vec::new();
        for slot in &slots {
            let filter = AssignmentFilter::new()
                .for_slot(slot.id)
                .with_status(AssignmentStatus::Confirmed);
            let raw = match self.collaborators.assignments.list_assignments(filter).await {
                Ok(raw) => raw,
                Err(ServiceError::NotFound(_)) => Vec::new(),
                Err(err) => return Err(EngineError::from_fetch_failure(err)),
            };
            for item in raw {
                assignments.push(item.validate()?);
            }
        }
        Ok((slots, assignments))
    }
}
