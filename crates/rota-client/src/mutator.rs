//! Assignment mutation commands
//!
//! Executes create/cancel operations against the pool and capacity
//! state:
//! - local fast-fail validation before any network call
//! - conflict classification for capacity races (never auto-retried)
//! - pessimistic discipline: no local state changes before server
//!   confirmation, so a failure never leaves a phantom assignment
//! - best-effort bulk roster replacement with a structured report
//!
//! One mutation per control is in flight at a time: an operation key is
//! held while its command runs and a duplicate submission for the same
//! key is rejected locally. Operations on other keys stay available.

use crate::error::{EngineError, ServiceError, ValidationError};
use crate::services::AssignmentService;
use crate::session::SessionContext;
use rota_model::{AssignmentId, MemberId, ShiftAssignment, SlotId};
use rota_recon::{AvailabilityPool, SlotStatus};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Key identifying the control a mutation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PendingKey {
    Slot(SlotId),
    Assignment(AssignmentId),
}

impl std::fmt::Display for PendingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(id) => write!(f, "slot {id}"),
            Self::Assignment(id) => write!(f, "assignment {id}"),
        }
    }
}

/// Releases the pending key when the operation finishes, however it ends
struct PendingGuard {
    pending: Arc<Mutex<HashSet<PendingKey>>>,
    key: PendingKey,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        pending.remove(&self.key);
    }
}

/// Per-item failure inside a bulk replacement
#[derive(Debug)]
pub enum BulkFailure {
    /// A cancel that did not go through
    Cancel {
        /// Assignment that stayed confirmed
        assignment_id: AssignmentId,
        /// Its member
        member_id: MemberId,
        /// Classified failure
        error: EngineError,
    },
    /// A create that did not go through
    Create {
        /// Member left unassigned
        member_id: MemberId,
        /// Classified failure
        error: EngineError,
    },
}

/// Outcome summary of a bulk replacement
///
/// The operation is not atomic: failures leave the slot temporarily
/// over- or under-capacity relative to the desired roster. The report
/// makes partial success visible instead of hiding it.
#[derive(Debug, Default)]
pub struct BulkReplaceReport {
    /// Assignments successfully cancelled
    pub cancelled: Vec<AssignmentId>,
    /// Members successfully assigned
    pub created: Vec<MemberId>,
    /// Per-item failures, in execution order
    pub failures: Vec<BulkFailure>,
}

impl BulkReplaceReport {
    /// True when every item went through
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Command layer for assignment mutations
pub struct RosterEditor {
    assignments: Arc<dyn AssignmentService>,
    session: SessionContext,
    pending: Arc<Mutex<HashSet<PendingKey>>>,
}

impl RosterEditor {
    /// Create an editor over an assignment service
    #[must_use]
    pub fn new(assignments: Arc<dyn AssignmentService>, session: SessionContext) -> Self {
        Self {
            assignments,
            session,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Assign a member to a slot
    ///
    /// Fast-fails locally when the member is not in the pool or the slot
    /// is already known full; the authoritative check stays server-side.
    /// A capacity race surfaces as [`EngineError::Conflict`] and must
    /// not be retried until state is refreshed.
    ///
    /// # Errors
    /// Validation, conflict, or transient failure; nothing is mutated
    /// locally on any error path.
    pub async fn assign(
        &self,
        slot: &SlotStatus,
        member_id: MemberId,
        note: Option<String>,
        pool: &AvailabilityPool,
    ) -> Result<(), EngineError> {
        let slot_id = slot.slot.id;
        let _guard = self.begin(PendingKey::Slot(slot_id))?;

        if !pool.contains(member_id) {
            return Err(ValidationError::NotInPool { member_id }.into());
        }
        if slot.is_full() {
            return Err(ValidationError::SlotFull { slot_id }.into());
        }

        tracing::info!(
            actor = ?self.session.actor(),
            %slot_id,
            %member_id,
            "assigning member to slot"
        );
        match self.assignments.create(slot_id, member_id, note).await {
            Ok(_) => {
                tracing::debug!(%slot_id, %member_id, "assignment confirmed");
                Ok(())
            }
            Err(ServiceError::Conflict) => {
                tracing::warn!(%slot_id, "slot filled by a concurrent actor");
                Err(EngineError::Conflict { slot_id })
            }
            Err(err) => Err(EngineError::from_create_failure(err, slot_id)),
        }
    }

    /// Cancel a confirmed assignment
    ///
    /// Idempotent: an assignment already cancelled (locally known or
    /// raced by another session) is a success, not an error.
    ///
    /// # Errors
    /// Not-found or transient failure from the assignment service.
    pub async fn unassign(&self, assignment: &ShiftAssignment) -> Result<(), EngineError> {
        let _guard = self.begin(PendingKey::Assignment(assignment.id))?;

        if !assignment.is_confirmed() {
            tracing::debug!(assignment_id = %assignment.id, "already cancelled, nothing to do");
            return Ok(());
        }

        tracing::info!(
            actor = ?self.session.actor(),
            assignment_id = %assignment.id,
            "cancelling assignment"
        );
        self.assignments
            .cancel(assignment.id)
            .await
            .map_err(EngineError::from_fetch_failure)
    }

    /// Replace a slot's roster with the desired member set
    ///
    /// Cancels every confirmed assignment not in `desired`, then creates
    /// one for every desired member not already confirmed, one at a
    /// time. Individual failures are logged and recorded in the report;
    /// the batch continues. Not atomic: a partial failure can leave the
    /// slot temporarily over- or under-capacity relative to the desired
    /// roster.
    ///
    /// # Errors
    /// Only upfront validation fails the whole operation: an empty
    /// selection, or a selection larger than the slot's requirement.
    /// Neither issues a network call.
    pub async fn bulk_replace(
        &self,
        slot: &SlotStatus,
        desired: &[MemberId],
    ) -> Result<BulkReplaceReport, EngineError> {
        let slot_id = slot.slot.id;
        let _guard = self.begin(PendingKey::Slot(slot_id))?;

        let mut roster: Vec<MemberId> = Vec::with_capacity(desired.len());
        for member_id in desired {
            if !roster.contains(member_id) {
                roster.push(*member_id);
            }
        }

        if roster.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        if roster.len() > slot.slot.required_count as usize {
            return Err(ValidationError::SelectionExceedsCapacity {
                selected: roster.len(),
                required: slot.slot.required_count,
            }
            .into());
        }

        tracing::info!(
            actor = ?self.session.actor(),
            %slot_id,
            desired = roster.len(),
            "replacing slot roster"
        );
        let mut report = BulkReplaceReport::default();

        for assignment in &slot.confirmed {
            if roster.contains(&assignment.member_id) {
                continue;
            }
            match self.assignments.cancel(assignment.id).await {
                Ok(()) => report.cancelled.push(assignment.id),
                Err(err) => {
                    let error = EngineError::from_fetch_failure(err);
                    tracing::warn!(
                        assignment_id = %assignment.id,
                        %error,
                        "cancel failed, continuing batch"
                    );
                    report.failures.push(BulkFailure::Cancel {
                        assignment_id: assignment.id,
                        member_id: assignment.member_id,
                        error,
                    });
                }
            }
        }

        let already_confirmed: HashSet<MemberId> =
            slot.confirmed.iter().map(|a| a.member_id).collect();
        for member_id in roster {
            if already_confirmed.contains(&member_id) {
                continue;
            }
            match self.assignments.create(slot_id, member_id, None).await {
                Ok(_) => report.created.push(member_id),
                Err(err) => {
                    let error = EngineError::from_create_failure(err, slot_id);
                    tracing::warn!(%member_id, %error, "create failed, continuing batch");
                    report.failures.push(BulkFailure::Create { member_id, error });
                }
            }
        }

        if !report.is_clean() {
            tracing::warn!(
                %slot_id,
                cancelled = report.cancelled.len(),
                created = report.created.len(),
                failed = report.failures.len(),
                "bulk replacement finished with failures"
            );
        }
        Ok(report)
    }

    fn begin(&self, key: PendingKey) -> Result<PendingGuard, ValidationError> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !pending.insert(key) {
            return Err(ValidationError::OperationPending {
                key: key.to_string(),
            });
        }
        Ok(PendingGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockAssignmentService;
    use chrono::{TimeZone, Utc};
    use rota_model::{
        AssignmentStatus, AttendanceResponse, BusinessDayId, RawAssignment, ResponseKind,
        ShiftSlot, TargetDateId,
    };
    use rota_recon::{ResponseBook, SlotBoard};

    fn slot_with_capacity(required: u32) -> ShiftSlot {
        ShiftSlot {
            id: SlotId::new(),
            business_day_id: BusinessDayId::new(),
            instance: None,
            required_count: required,
            priority: 0,
            start: "09:00:00".parse().unwrap(),
            end: "13:00:00".parse().unwrap(),
        }
    }

    fn confirmed_on(slot_id: SlotId, member_id: MemberId) -> ShiftAssignment {
        ShiftAssignment {
            id: AssignmentId::new(),
            slot_id,
            member_id,
            status: AssignmentStatus::Confirmed,
            note: None,
        }
    }

    fn raw_created(slot_id: SlotId, member_id: MemberId) -> RawAssignment {
        RawAssignment {
            id: Some(uuid::Uuid::new_v4().to_string()),
            slot_id: Some(slot_id.0.to_string()),
            member_id: Some(member_id.0.to_string()),
            status: Some("confirmed".to_string()),
            note: None,
        }
    }

    fn pool_with(member_id: MemberId, date: TargetDateId) -> AvailabilityPool {
        let book = ResponseBook::aggregate(&[AttendanceResponse::new(
            member_id,
            date,
            ResponseKind::Attending,
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        )]);
        AvailabilityPool::resolve(date, &book, &SlotBoard::build(&[], &[]))
    }

    fn status_for(slot: &ShiftSlot, confirmed: Vec<ShiftAssignment>) -> SlotStatus {
        SlotStatus {
            slot: slot.clone(),
            confirmed,
        }
    }

    fn editor(mock: MockAssignmentService) -> RosterEditor {
        RosterEditor::new(Arc::new(mock), SessionContext::new("test-session"))
    }

    #[tokio::test]
    async fn assign_fast_fails_outside_pool_without_calling() {
        // No expectations set: any service call would panic the mock.
        let editor = editor(MockAssignmentService::new());
        let slot = slot_with_capacity(1);
        let status = status_for(&slot, vec![]);
        let pool = pool_with(MemberId::new(), TargetDateId::new());

        let outsider = MemberId::new();
        let err = editor
            .assign(&status, outsider, None, &pool)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NotInPool { member_id }) if member_id == outsider
        ));
    }

    #[tokio::test]
    async fn assign_fast_fails_on_known_full_slot() {
        let editor = editor(MockAssignmentService::new());
        let slot = slot_with_capacity(1);
        let date = TargetDateId::new();
        let member = MemberId::new();
        let status = status_for(&slot, vec![confirmed_on(slot.id, MemberId::new())]);
        let pool = pool_with(member, date);

        let err = editor.assign(&status, member, None, &pool).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::SlotFull { .. })
        ));
    }

    #[tokio::test]
    async fn assign_success_issues_one_create() {
        let slot = slot_with_capacity(1);
        let date = TargetDateId::new();
        let member = MemberId::new();
        let slot_id = slot.id;

        let mut mock = MockAssignmentService::new();
        mock.expect_create()
            .withf(move |s, m, _| *s == slot_id && *m == member)
            .times(1)
            .returning(move |s, m, _| Ok(raw_created(s, m)));

        let editor = editor(mock);
        let status = status_for(&slot, vec![]);
        let pool = pool_with(member, date);
        editor.assign(&status, member, None, &pool).await.unwrap();
    }

    #[tokio::test]
    async fn assign_conflict_is_classified_and_distinct() {
        let slot = slot_with_capacity(1);
        let date = TargetDateId::new();
        let member = MemberId::new();

        let mut mock = MockAssignmentService::new();
        mock.expect_create()
            .times(1)
            .returning(|_, _, _| Err(ServiceError::Conflict));

        let editor = editor(mock);
        let status = status_for(&slot, vec![]);
        let pool = pool_with(member, date);
        let err = editor.assign(&status, member, None, &pool).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn assign_transient_surfaces_verbatim() {
        let slot = slot_with_capacity(1);
        let date = TargetDateId::new();
        let member = MemberId::new();

        let mut mock = MockAssignmentService::new();
        mock.expect_create()
            .times(1)
            .returning(|_, _, _| Err(ServiceError::Transient("socket closed".to_string())));

        let editor = editor(mock);
        let status = status_for(&slot, vec![]);
        let pool = pool_with(member, date);
        let err = editor.assign(&status, member, None, &pool).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("socket closed"));
    }

    #[tokio::test]
    async fn unassign_of_cancelled_assignment_is_local_success() {
        let editor = editor(MockAssignmentService::new());
        let mut assignment = confirmed_on(SlotId::new(), MemberId::new());
        assignment.status = AssignmentStatus::Cancelled;
        editor.unassign(&assignment).await.unwrap();
    }

    #[tokio::test]
    async fn unassign_cancels_confirmed_assignment() {
        let assignment = confirmed_on(SlotId::new(), MemberId::new());
        let id = assignment.id;

        let mut mock = MockAssignmentService::new();
        mock.expect_cancel()
            .withf(move |a| *a == id)
            .times(1)
            .returning(|_| Ok(()));

        let editor = editor(mock);
        editor.unassign(&assignment).await.unwrap();
    }

    #[tokio::test]
    async fn pending_key_blocks_duplicate_submission() {
        let editor = editor(MockAssignmentService::new());
        let slot = slot_with_capacity(1);
        let status = status_for(&slot, vec![]);
        let pool = pool_with(MemberId::new(), TargetDateId::new());

        let _held = editor.begin(PendingKey::Slot(slot.id)).unwrap();
        let err = editor
            .assign(&status, MemberId::new(), None, &pool)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::OperationPending { .. })
        ));
    }

    #[tokio::test]
    async fn pending_key_releases_after_completion() {
        let mut mock = MockAssignmentService::new();
        mock.expect_create()
            .times(2)
            .returning(|s, m, _| Ok(raw_created(s, m)));

        let editor = editor(mock);
        let slot = slot_with_capacity(2);
        let date = TargetDateId::new();
        let member = MemberId::new();
        let status = status_for(&slot, vec![]);
        let pool = pool_with(member, date);

        editor.assign(&status, member, None, &pool).await.unwrap();
        // Same control again after completion: allowed.
        editor.assign(&status, member, None, &pool).await.unwrap();
    }

    #[tokio::test]
    async fn bulk_replace_rejects_oversized_selection_without_calls() {
        let editor = editor(MockAssignmentService::new());
        let slot = slot_with_capacity(2);
        let status = status_for(&slot, vec![]);
        let desired = vec![MemberId::new(), MemberId::new(), MemberId::new()];

        let err = editor.bulk_replace(&status, &desired).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::SelectionExceedsCapacity {
                selected: 3,
                required: 2,
            })
        ));
    }

    #[tokio::test]
    async fn bulk_replace_rejects_empty_selection() {
        let editor = editor(MockAssignmentService::new());
        let slot = slot_with_capacity(2);
        let status = status_for(&slot, vec![]);
        let err = editor.bulk_replace(&status, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::EmptySelection)
        ));
    }

    #[tokio::test]
    async fn bulk_replace_continues_past_failed_cancel() {
        // The cancel of the outgoing member fails; both creates still
        // run. The report shows exactly what happened.
        let slot = slot_with_capacity(2);
        let outgoing = confirmed_on(slot.id, MemberId::new());
        let m1 = MemberId::new();
        let m2 = MemberId::new();

        let mut mock = MockAssignmentService::new();
        mock.expect_cancel()
            .times(1)
            .returning(|_| Err(ServiceError::Transient("cancel failed".to_string())));
        mock.expect_create()
            .times(2)
            .returning(|s, m, _| Ok(raw_created(s, m)));

        let editor = editor(mock);
        let status = status_for(&slot, vec![outgoing.clone()]);
        let report = editor.bulk_replace(&status, &[m1, m2]).await.unwrap();

        assert_eq!(report.created, vec![m1, m2]);
        assert!(report.cancelled.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            BulkFailure::Cancel { assignment_id, .. } if *assignment_id == outgoing.id
        ));
    }

    #[tokio::test]
    async fn bulk_replace_skips_members_already_confirmed() {
        let slot = slot_with_capacity(2);
        let keeper = MemberId::new();
        let newcomer = MemberId::new();
        let existing = confirmed_on(slot.id, keeper);

        let mut mock = MockAssignmentService::new();
        // Keeper is already confirmed: only the newcomer is created,
        // nothing is cancelled.
        mock.expect_create()
            .withf(move |_, m, _| *m == newcomer)
            .times(1)
            .returning(|s, m, _| Ok(raw_created(s, m)));

        let editor = editor(mock);
        let status = status_for(&slot, vec![existing]);
        let report = editor
            .bulk_replace(&status, &[keeper, newcomer])
            .await
            .unwrap();
        assert_eq!(report.created, vec![newcomer]);
        assert!(report.cancelled.is_empty());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn bulk_replace_deduplicates_selection() {
        let slot = slot_with_capacity(1);
        let member = MemberId::new();

        let mut mock = MockAssignmentService::new();
        mock.expect_create()
            .times(1)
            .returning(|s, m, _| Ok(raw_created(s, m)));

        let editor = editor(mock);
        let status = status_for(&slot, vec![]);
        // Duplicated selection still fits a one-seat slot.
        let report = editor.bulk_replace(&status, &[member, member]).await.unwrap();
        assert_eq!(report.created, vec![member]);
    }
}
