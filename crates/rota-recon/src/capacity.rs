//! Slot capacity tracking
//!
//! Groups a business day's shift slots by logical instance, orders the
//! groups and the slots within them, and derives capacity figures per
//! slot. Read-only: this module never mutates assignments.

use indexmap::IndexMap;
use rota_model::{InstanceId, ShiftAssignment, ShiftSlot, SlotId};
use std::collections::HashMap;

/// Grouping key: a slot's instance, or the sentinel unclassified bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    /// Slots belonging to a named instance
    Instance(InstanceId),
    /// Slots lacking an instance reference
    Unclassified,
}

/// One slot plus its confirmed assignments and derived capacity figures
#[derive(Debug, Clone)]
pub struct SlotStatus {
    /// The slot definition
    pub slot: ShiftSlot,
    /// Confirmed assignments currently on the slot
    pub confirmed: Vec<ShiftAssignment>,
}

impl SlotStatus {
    /// Number of confirmed assignments
    #[inline]
    #[must_use]
    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }

    /// Open seats left on the slot
    ///
    /// Saturates at zero: a slot observed over capacity (a concurrent
    /// actor raced us) reports no remaining seats rather than a negative
    /// number. `confirmed_count` stays truthful in that case.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u32 {
        (self.slot.required_count as u64).saturating_sub(self.confirmed.len() as u64) as u32
    }

    /// True when no seats remain
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.confirmed.len() >= self.slot.required_count as usize
    }
}

/// Ordered group of slots sharing an instance
#[derive(Debug, Clone)]
pub struct InstanceGroup {
    /// Grouping key
    pub key: InstanceKey,
    /// Instance name; `None` for the unclassified group
    pub name: Option<String>,
    /// Slots in display order (ascending priority, slot id tie-break)
    pub slots: Vec<SlotStatus>,
}

/// The capacity view over one business day's slots
#[derive(Debug, Clone, Default)]
pub struct SlotBoard {
    groups: Vec<InstanceGroup>,
    by_slot: HashMap<SlotId, (usize, usize)>,
}

impl SlotBoard {
    /// Build the board from a day's slots and their assignments
    ///
    /// Only confirmed assignments count toward capacity; cancelled rows
    /// are ignored. Group order is case-insensitive lexicographic by
    /// instance name with the unclassified group always last; within a
    /// group slots sort by ascending priority, slot id as tie-break.
    #[must_use]
    pub fn build(slots: &[ShiftSlot], assignments: &[ShiftAssignment]) -> Self {
        let mut confirmed_by_slot: HashMap<SlotId, Vec<ShiftAssignment>> = HashMap::new();
        for assignment in assignments {
            if assignment.is_confirmed() {
                confirmed_by_slot
                    .entry(assignment.slot_id)
                    .or_default()
                    .push(assignment.clone());
            }
        }

        let mut grouped: IndexMap<InstanceKey, InstanceGroup> = IndexMap::new();
        for slot in slots {
            let (key, name) = match &slot.instance {
                Some(instance) => (InstanceKey::Instance(instance.id), Some(instance.name.clone())),
                None => (InstanceKey::Unclassified, None),
            };
            let group = grouped.entry(key).or_insert_with(|| InstanceGroup {
                key,
                name,
                slots: Vec::new(),
            });
            group.slots.push(SlotStatus {
                slot: slot.clone(),
                confirmed: confirmed_by_slot.remove(&slot.id).unwrap_or_default(),
            });
        }

        let mut groups: Vec<InstanceGroup> = grouped.into_values().collect();
        groups.sort_by_key(|g| {
            (
                matches!(g.key, InstanceKey::Unclassified),
                g.name.as_deref().map(str::to_lowercase),
            )
        });
        for group in &mut groups {
            group
                .slots
                .sort_by_key(|s| (s.slot.priority, s.slot.id.0));
        }

        let mut by_slot = HashMap::new();
        for (gi, group) in groups.iter().enumerate() {
            for (si, status) in group.slots.iter().enumerate() {
                by_slot.insert(status.slot.id, (gi, si));
            }
        }

        Self { groups, by_slot }
    }

    /// Ordered instance groups
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[InstanceGroup] {
        &self.groups
    }

    /// Status for one slot
    #[must_use]
    pub fn slot_status(&self, slot_id: SlotId) -> Option<&SlotStatus> {
        let (gi, si) = *self.by_slot.get(&slot_id)?;
        Some(&self.groups[gi].slots[si])
    }

    /// All slot statuses in display order
    pub fn statuses(&self) -> impl Iterator<Item = &SlotStatus> {
        self.groups.iter().flat_map(|g| g.slots.iter())
    }

    /// All confirmed assignments across the board's slots
    pub fn confirmed_assignments(&self) -> impl Iterator<Item = &ShiftAssignment> {
        self.statuses().flat_map(|s| s.confirmed.iter())
    }

    /// Total number of slots on the board
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.by_slot.len()
    }

    /// True when the board holds no slots (empty-state view)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }
}
