//! Availability pool resolution
//!
//! Computes, per target date, the set of members eligible for
//! assignment: attending the date and holding no confirmed assignment
//! on any slot of the matched business day. Also carries the reverse
//! map used to annotate already-assigned attendees in the picker.
//!
//! Pure and idempotent given its inputs; must be recomputed after every
//! assignment mutation.

use crate::aggregate::ResponseBook;
use crate::capacity::SlotBoard;
use indexmap::IndexSet;
use rota_model::{MemberId, TargetDateId};
use std::collections::HashMap;

/// Assignable members for one target date
#[derive(Debug, Clone)]
pub struct AvailabilityPool {
    date_id: TargetDateId,
    available: IndexSet<MemberId>,
    assigned_labels: HashMap<MemberId, String>,
}

impl AvailabilityPool {
    /// Resolve the pool for a date
    ///
    /// `board` must hold every slot matched to the date, not just the
    /// one being edited: a member confirmed anywhere on the day is
    /// excluded, which is what enforces one assignment per member per
    /// day.
    #[must_use]
    pub fn resolve(date_id: TargetDateId, book: &ResponseBook, board: &SlotBoard) -> Self {
        let mut assigned_labels = HashMap::new();
        for status in board.statuses() {
            let label = status.slot.display_label();
            for assignment in &status.confirmed {
                assigned_labels
                    .entry(assignment.member_id)
                    .or_insert_with(|| label.clone());
            }
        }

        let available = book
            .attending_members(date_id)
            .into_iter()
            .filter(|member_id| !assigned_labels.contains_key(member_id))
            .collect();

        Self {
            date_id,
            available,
            assigned_labels,
        }
    }

    /// The date this pool was resolved for
    #[inline]
    #[must_use]
    pub fn date_id(&self) -> TargetDateId {
        self.date_id
    }

    /// True when the member is assignable
    #[inline]
    #[must_use]
    pub fn contains(&self, member_id: MemberId) -> bool {
        self.available.contains(&member_id)
    }

    /// Assignable members in first-seen order
    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.available.iter().copied()
    }

    /// Number of assignable members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.available.len()
    }

    /// True when nobody is assignable
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// "instance-slot" label for a member already assigned on this date
    #[inline]
    #[must_use]
    pub fn assignment_label(&self, member_id: MemberId) -> Option<&str> {
        self.assigned_labels.get(&member_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rota_model::{
        AssignmentId, AssignmentStatus, AttendanceResponse, BusinessDayId, ResponseKind,
        ShiftAssignment, ShiftSlot, SlotId,
    };

    fn respond(member: MemberId, date: TargetDateId, kind: ResponseKind) -> AttendanceResponse {
        AttendanceResponse::new(
            member,
            date,
            kind,
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        )
    }

    fn slot() -> ShiftSlot {
        ShiftSlot {
            id: SlotId::new(),
            business_day_id: BusinessDayId::new(),
            instance: None,
            required_count: 2,
            priority: 0,
            start: "09:00:00".parse().unwrap(),
            end: "13:00:00".parse().unwrap(),
        }
    }

    fn confirmed(slot_id: SlotId, member_id: MemberId) -> ShiftAssignment {
        ShiftAssignment {
            id: AssignmentId::new(),
            slot_id,
            member_id,
            status: AssignmentStatus::Confirmed,
            note: None,
        }
    }

    #[test]
    fn pool_is_attending_minus_assigned() {
        let date = TargetDateId::new();
        let free = MemberId::new();
        let busy = MemberId::new();
        let absent = MemberId::new();
        let book = ResponseBook::aggregate(&[
            respond(free, date, ResponseKind::Attending),
            respond(busy, date, ResponseKind::Attending),
            respond(absent, date, ResponseKind::Absent),
        ]);
        let s = slot();
        let board = SlotBoard::build(&[s.clone()], &[confirmed(s.id, busy)]);

        let pool = AvailabilityPool::resolve(date, &book, &board);
        assert!(pool.contains(free));
        assert!(!pool.contains(busy));
        assert!(!pool.contains(absent));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn assignment_anywhere_on_the_day_excludes() {
        // Confirmed on slot B excludes the member from the pool even
        // when slot A is the one being edited.
        let date = TargetDateId::new();
        let member = MemberId::new();
        let book = ResponseBook::aggregate(&[respond(member, date, ResponseKind::Attending)]);
        let a = slot();
        let b = slot();
        let board = SlotBoard::build(&[a, b.clone()], &[confirmed(b.id, member)]);

        let pool = AvailabilityPool::resolve(date, &book, &board);
        assert!(!pool.contains(member));
    }

    #[test]
    fn assigned_members_carry_display_labels() {
        let date = TargetDateId::new();
        let member = MemberId::new();
        let book = ResponseBook::aggregate(&[respond(member, date, ResponseKind::Attending)]);
        let s = slot();
        let board = SlotBoard::build(&[s.clone()], &[confirmed(s.id, member)]);

        let pool = AvailabilityPool::resolve(date, &book, &board);
        assert_eq!(pool.assignment_label(member), Some("09:00-13:00"));
        assert_eq!(pool.assignment_label(MemberId::new()), None);
    }

    #[test]
    fn resolve_is_idempotent() {
        let date = TargetDateId::new();
        let member = MemberId::new();
        let book = ResponseBook::aggregate(&[respond(member, date, ResponseKind::Attending)]);
        let board = SlotBoard::build(&[slot()], &[]);

        let first = AvailabilityPool::resolve(date, &book, &board);
        let second = AvailabilityPool::resolve(date, &book, &board);
        assert_eq!(
            first.members().collect::<Vec<_>>(),
            second.members().collect::<Vec<_>>()
        );
    }
}
