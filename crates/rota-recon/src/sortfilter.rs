//! Sorting, filtering, and role grouping for the response matrix
//!
//! Drives both the review table and the assignment picker:
//! - role filter with OR semantics across selected roles
//! - sort keys: name, attending count, per-date answer rank
//! - direction toggle on re-selecting the active key
//! - grouping by first matching role when two or more roles are selected
//!
//! Every comparator ends in a member-id tie-break so orderings are total
//! and toggling direction reverses them exactly.

use crate::aggregate::ResponseBook;
use indexmap::IndexSet;
use rota_model::{Member, MemberId, ResponseKind, RoleId, TargetDateId};
use std::cmp::Ordering;

/// Answer rank for per-date sorting: attending < undecided < absent < none
#[inline]
#[must_use]
pub fn attendance_rank(kind: Option<ResponseKind>) -> u8 {
    match kind {
        Some(ResponseKind::Attending) => 0,
        Some(ResponseKind::Undecided) => 1,
        Some(ResponseKind::Absent) => 2,
        None => 3,
    }
}

/// Selected roles, in selection order
///
/// A member passes when the selection is empty or the member holds any
/// selected role. Selection order is semantic: it defines the grouping
/// order when two or more roles are selected.
#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    selected: IndexSet<RoleId>,
}

impl RoleFilter {
    /// Empty filter (everybody passes)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role to the selection; re-selecting keeps its position
    pub fn select(&mut self, role_id: RoleId) {
        self.selected.insert(role_id);
    }

    /// Remove a role from the selection, preserving the order of the rest
    pub fn deselect(&mut self, role_id: RoleId) {
        self.selected.shift_remove(&role_id);
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Number of selected roles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// True when nothing is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True when the member passes the filter (OR across roles)
    #[must_use]
    pub fn passes(&self, member: &Member) -> bool {
        self.is_empty() || self.first_match_index(member).is_some()
    }

    /// Index of the first selected role the member holds, in selection order
    #[must_use]
    pub fn first_match_index(&self, member: &Member) -> Option<usize> {
        self.selected
            .iter()
            .position(|role_id| member.has_role(*role_id))
    }

    /// Grouping applies only with two or more selected roles
    #[inline]
    #[must_use]
    pub fn grouping_active(&self) -> bool {
        self.selected.len() >= 2
    }
}

/// Active sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Display name
    Name,
    /// Count of `attending` answers across all dates
    AttendingCount,
    /// Answer rank for one target date
    DateAttending(TargetDateId),
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Lowest first
    Ascending,
    /// Highest first
    Descending,
}

impl SortDirection {
    /// The opposite direction
    #[inline]
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Current sort selection with toggle semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    /// Active key
    pub key: SortKey,
    /// Active direction
    pub direction: SortDirection,
}

impl SortState {
    /// Initial state: ascending by the given key
    #[inline]
    #[must_use]
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Select a key: the same key flips direction, a different key
    /// resets to ascending. Leaving `DateAttending` drops the
    /// remembered date with the replaced key. Selecting `DateAttending`
    /// for a different date counts as a different key.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortKey::Name)
    }
}

/// Filter + sort over the member list, backed by aggregated responses
#[derive(Debug, Clone, Default)]
pub struct RosterQuery {
    /// Role filter
    pub filter: RoleFilter,
    /// Sort selection
    pub sort: SortState,
}

impl RosterQuery {
    /// Apply filter, grouping, and sort, returning borrowed members
    ///
    /// With two or more roles selected the primary comparator is the
    /// index of the first matching role in selection order; the active
    /// sort key only orders within each group and the direction toggle
    /// never reorders the groups themselves.
    #[must_use]
    pub fn apply<'a>(&self, members: &'a [Member], book: &ResponseBook) -> Vec<&'a Member> {
        let mut rows: Vec<&Member> = members
            .iter()
            .filter(|member| self.filter.passes(member))
            .collect();

        let grouping = self.filter.grouping_active();
        rows.sort_by(|a, b| {
            if grouping {
                let ga = self.filter.first_match_index(a);
                let gb = self.filter.first_match_index(b);
                ga.cmp(&gb)
                    .then_with(|| self.sort.direction.apply(self.key_cmp(a, b, book)))
            } else {
                self.sort.direction.apply(self.key_cmp(a, b, book))
            }
        });
        rows
    }

    fn key_cmp(&self, a: &Member, b: &Member, book: &ResponseBook) -> Ordering {
        match self.sort.key {
            SortKey::Name => name_cmp(a, b),
            SortKey::AttendingCount => book
                .attending_count(a.id)
                .cmp(&book.attending_count(b.id))
                .then_with(|| name_cmp(a, b)),
            SortKey::DateAttending(date_id) => {
                let ra = attendance_rank(book.kind_for(a.id, date_id));
                let rb = attendance_rank(book.kind_for(b.id, date_id));
                ra.cmp(&rb).then_with(|| name_cmp(a, b))
            }
        }
    }
}

fn name_cmp(a: &Member, b: &Member) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| member_id_cmp(a.id, b.id))
}

fn member_id_cmp(a: MemberId, b: MemberId) -> Ordering {
    a.0.cmp(&b.0)
}
