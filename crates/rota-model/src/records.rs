//! Domain records for the reconciliation core
//!
//! Defines the validated record types the engine works with:
//! - Members, roles, and target dates
//! - Attendance responses with optional time windows and notes
//! - Business days, shift slots, and slot instances
//! - Shift assignments and their status

use crate::ids::{
    AssignmentId, BusinessDayId, CollectionId, InstanceId, MemberId, RoleId, SlotId, TargetDateId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A schedulable member
///
/// Immutable within a reconciliation session; role ids are used only for
/// filtering and grouping, never for assignment eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member identifier
    pub id: MemberId,
    /// Display name
    pub display_name: String,
    /// Roles held by this member
    pub role_ids: Vec<RoleId>,
}

impl Member {
    /// Create a member with no roles
    #[inline]
    #[must_use]
    pub fn new(id: MemberId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role_ids: Vec::new(),
        }
    }

    /// With roles
    #[inline]
    #[must_use]
    pub fn with_roles(mut self, role_ids: Vec<RoleId>) -> Self {
        self.role_ids = role_ids;
        self
    }

    /// Check whether the member holds the given role
    #[inline]
    #[must_use]
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }
}

/// A display role (grouping/filtering only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier
    pub id: RoleId,
    /// Role name
    pub name: String,
    /// Display color (hex string as delivered by the directory service)
    pub color: String,
    /// Display order within role lists
    pub display_order: i32,
}

/// A date under attendance collection
///
/// Identified separately from the calendar date; two collections may ask
/// about the same calendar date under different target-date ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDate {
    /// Target-date identifier
    pub id: TargetDateId,
    /// Owning collection
    pub collection_id: CollectionId,
    /// Calendar date
    pub date: NaiveDate,
    /// Display order within the collection
    pub display_order: i32,
}

/// An attendance collection and the dates it asks about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCollection {
    /// Collection identifier
    pub id: CollectionId,
    /// Collection title
    pub title: String,
    /// Dates under collection, in display order
    pub target_dates: Vec<TargetDate>,
}

impl AttendanceCollection {
    /// Target dates sorted by display order
    #[must_use]
    pub fn ordered_dates(&self) -> Vec<&TargetDate> {
        let mut dates: Vec<&TargetDate> = self.target_dates.iter().collect();
        dates.sort_by_key(|d| d.display_order);
        dates
    }
}

/// Attendance answer for one (member, target date) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Member will attend
    Attending,
    /// Member will not attend
    Absent,
    /// Member has not decided
    Undecided,
}

impl ResponseKind {
    /// True for [`ResponseKind::Attending`]
    #[inline]
    #[must_use]
    pub fn is_attending(self) -> bool {
        matches!(self, Self::Attending)
    }
}

/// Optional availability window attached to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Earliest available time, if stated
    pub from: Option<NaiveTime>,
    /// Latest available time, if stated
    pub to: Option<NaiveTime>,
}

impl TimeWindow {
    /// Build a window; `None` when neither bound is present
    #[inline]
    #[must_use]
    pub fn new(from: Option<NaiveTime>, to: Option<NaiveTime>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            None
        } else {
            Some(Self { from, to })
        }
    }
}

/// A member's answer for one target date
///
/// At most one response per (member, target date) is current; when the
/// collaborator delivers duplicates, the one with the latest
/// `responded_at` wins (resolved by the aggregator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    /// Responding member
    pub member_id: MemberId,
    /// Target date answered
    pub target_date_id: TargetDateId,
    /// The answer
    pub kind: ResponseKind,
    /// Optional availability window
    pub window: Option<TimeWindow>,
    /// Optional free-text note
    pub note: Option<String>,
    /// When the response was recorded
    pub responded_at: DateTime<Utc>,
}

impl AttendanceResponse {
    /// Create a bare response
    #[inline]
    #[must_use]
    pub fn new(
        member_id: MemberId,
        target_date_id: TargetDateId,
        kind: ResponseKind,
        responded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id,
            target_date_id,
            kind,
            window: None,
            note: None,
            responded_at,
        }
    }

    /// With availability window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// With note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// An operating-day definition owning zero or more shift slots
///
/// Matched to a [`TargetDate`] by calendar-date equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDay {
    /// Business-day identifier
    pub id: BusinessDayId,
    /// Calendar date
    pub date: NaiveDate,
    /// Opening time, if defined
    pub open: Option<NaiveTime>,
    /// Closing time, if defined
    pub close: Option<NaiveTime>,
}

/// Logical sub-grouping of slots within one business day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInstance {
    /// Instance identifier
    pub id: InstanceId,
    /// Instance display name
    pub name: String,
}

/// A capacity-bounded shift requiring a fixed number of members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    /// Slot identifier
    pub id: SlotId,
    /// Owning business day
    pub business_day_id: BusinessDayId,
    /// Instance grouping; `None` means unclassified
    pub instance: Option<SlotInstance>,
    /// Number of members this slot requires
    pub required_count: u32,
    /// Display precedence within its instance (lower = earlier)
    pub priority: i32,
    /// Shift start time
    pub start: NaiveTime,
    /// Shift end time
    pub end: NaiveTime,
}

impl ShiftSlot {
    /// Compact "HH:MM-HH:MM" label for display
    #[must_use]
    pub fn time_label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }

    /// "instance-slot" display label used to annotate attendee lists
    ///
    /// Unclassified slots are labelled by time range alone.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.instance {
            Some(instance) => format!("{}-{}", instance.name, self.time_label()),
            None => self.time_label(),
        }
    }
}

/// Assignment lifecycle status
///
/// `Cancelled` is terminal; there is no reactivation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Active binding of member to slot
    Confirmed,
    /// Terminally cancelled
    Cancelled,
}

/// Binding of one member to one slot
///
/// Created and cancelled exclusively through the assignment command
/// layer; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Assignment identifier
    pub id: AssignmentId,
    /// Assigned slot
    pub slot_id: SlotId,
    /// Assigned member
    pub member_id: MemberId,
    /// Current status
    pub status: AssignmentStatus,
    /// Optional note recorded at creation
    pub note: Option<String>,
}

impl ShiftAssignment {
    /// True while the assignment is active
    #[inline]
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == AssignmentStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BusinessDayId, InstanceId, MemberId, RoleId, SlotId};
    use pretty_assertions::assert_eq;

    fn slot_at(start: &str, end: &str) -> ShiftSlot {
        ShiftSlot {
            id: SlotId::new(),
            business_day_id: BusinessDayId::new(),
            instance: None,
            required_count: 2,
            priority: 0,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
        }
    }

    #[test]
    fn member_role_membership() {
        let role = RoleId::new();
        let member = Member::new(MemberId::new(), "Aoi").with_roles(vec![role]);
        assert!(member.has_role(role));
        assert!(!member.has_role(RoleId::new()));
    }

    #[test]
    fn time_window_requires_a_bound() {
        assert!(TimeWindow::new(None, None).is_none());
        let w = TimeWindow::new(Some("09:00:00".parse().unwrap()), None).unwrap();
        assert!(w.from.is_some());
        assert!(w.to.is_none());
    }

    #[test]
    fn unclassified_slot_labels_by_time() {
        let slot = slot_at("09:00:00", "13:30:00");
        assert_eq!(slot.display_label(), "09:00-13:30");
    }

    #[test]
    fn instanced_slot_labels_with_instance_name() {
        let mut slot = slot_at("10:00:00", "14:00:00");
        slot.instance = Some(SlotInstance {
            id: InstanceId::new(),
            name: "Hall A".to_string(),
        });
        assert_eq!(slot.display_label(), "Hall A-10:00-14:00");
    }

    #[test]
    fn cancelled_assignment_is_not_confirmed() {
        let assignment = ShiftAssignment {
            id: crate::ids::AssignmentId::new(),
            slot_id: SlotId::new(),
            member_id: MemberId::new(),
            status: AssignmentStatus::Cancelled,
            note: None,
        };
        assert!(!assignment.is_confirmed());
    }
}
