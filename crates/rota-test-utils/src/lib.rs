//! Testing utilities for the Rota workspace
//!
//! Shared fixtures and an in-memory backend implementing all five
//! collaborator services, with failure injection for race and
//! best-effort scenarios.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rota_client::{
    AssignmentFilter, AssignmentService, AttendanceService, BusinessDayService, DirectoryService,
    ServiceError, ShiftSlotService,
};
use rota_model::{
    AssignmentId, AssignmentStatus, AttendanceCollection, AttendanceResponse, BusinessDay,
    BusinessDayId, CollectionId, EventId, Member, MemberId, RawAssignment, RawBusinessDay,
    RawShiftSlot, ResponseKind, Role, RoleId, ShiftAssignment, ShiftSlot, SlotId, SlotInstance,
    TargetDate, TargetDateId,
};
use std::collections::HashMap;
use std::sync::Mutex;

// ---- fixtures --------------------------------------------------------

pub fn member(name: &str) -> Member {
    Member::new(MemberId::new(), name)
}

pub fn member_with_roles(name: &str, roles: Vec<RoleId>) -> Member {
    Member::new(MemberId::new(), name).with_roles(roles)
}

pub fn role(name: &str, display_order: i32) -> Role {
    Role {
        id: RoleId::new(),
        name: name.to_string(),
        color: "#6699cc".to_string(),
        display_order,
    }
}

pub fn target_date(collection_id: CollectionId, date: &str, display_order: i32) -> TargetDate {
    TargetDate {
        id: TargetDateId::new(),
        collection_id,
        date: date.parse().unwrap(),
        display_order,
    }
}

pub fn collection(title: &str, target_dates: Vec<TargetDate>) -> AttendanceCollection {
    let id = target_dates
        .first()
        .map(|d| d.collection_id)
        .unwrap_or_else(CollectionId::new);
    AttendanceCollection {
        id,
        title: title.to_string(),
        target_dates,
    }
}

pub fn business_day(date: &str) -> BusinessDay {
    BusinessDay {
        id: BusinessDayId::new(),
        date: date.parse().unwrap(),
        open: Some("09:00:00".parse().unwrap()),
        close: Some("18:00:00".parse().unwrap()),
    }
}

pub fn shift_slot(business_day_id: BusinessDayId, required_count: u32) -> ShiftSlot {
    ShiftSlot {
        id: SlotId::new(),
        business_day_id,
        instance: None,
        required_count,
        priority: 0,
        start: "09:00:00".parse().unwrap(),
        end: "13:00:00".parse().unwrap(),
    }
}

pub fn slot_in_instance(
    business_day_id: BusinessDayId,
    instance: &SlotInstance,
    required_count: u32,
    priority: i32,
) -> ShiftSlot {
    ShiftSlot {
        instance: Some(instance.clone()),
        priority,
        ..shift_slot(business_day_id, required_count)
    }
}

pub fn response(
    member_id: MemberId,
    target_date_id: TargetDateId,
    kind: ResponseKind,
    hour: u32,
) -> AttendanceResponse {
    AttendanceResponse::new(
        member_id,
        target_date_id,
        kind,
        Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0).unwrap(),
    )
}

pub fn confirmed(slot_id: SlotId, member_id: MemberId) -> ShiftAssignment {
    ShiftAssignment {
        id: AssignmentId::new(),
        slot_id,
        member_id,
        status: AssignmentStatus::Confirmed,
        note: None,
    }
}

// ---- raw payload conversion ------------------------------------------

fn raw_of_day(day: &BusinessDay) -> RawBusinessDay {
    RawBusinessDay {
        id: Some(day.id.to_string()),
        date: Some(day.date.format("%Y-%m-%d").to_string()),
        open: day.open.map(|t| t.format("%H:%M").to_string()),
        close: day.close.map(|t| t.format("%H:%M").to_string()),
    }
}

fn raw_of_slot(slot: &ShiftSlot) -> RawShiftSlot {
    RawShiftSlot {
        id: Some(slot.id.to_string()),
        business_day_id: Some(slot.business_day_id.to_string()),
        instance_id: slot.instance.as_ref().map(|i| i.id.to_string()),
        instance_name: slot.instance.as_ref().map(|i| i.name.clone()),
        required_count: Some(slot.required_count),
        priority: Some(slot.priority),
        start: Some(slot.start.format("%H:%M").to_string()),
        end: Some(slot.end.format("%H:%M").to_string()),
    }
}

fn raw_of_assignment(assignment: &ShiftAssignment) -> RawAssignment {
    RawAssignment {
        id: Some(assignment.id.to_string()),
        slot_id: Some(assignment.slot_id.to_string()),
        member_id: Some(assignment.member_id.to_string()),
        status: Some(
            match assignment.status {
                AssignmentStatus::Confirmed => "confirmed",
                AssignmentStatus::Cancelled => "cancelled",
            }
            .to_string(),
        ),
        note: assignment.note.clone(),
    }
}

// ---- in-memory backend -----------------------------------------------

struct BackendState {
    collections: HashMap<CollectionId, AttendanceCollection>,
    responses: HashMap<CollectionId, Vec<AttendanceResponse>>,
    business_days: HashMap<EventId, Vec<BusinessDay>>,
    slots: HashMap<BusinessDayId, Vec<ShiftSlot>>,
    assignments: Vec<ShiftAssignment>,
    members: Vec<Member>,
    roles: Vec<Role>,
    fail_next_create: Option<ServiceError>,
    fail_next_cancel: Option<ServiceError>,
    enforce_capacity: bool,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            responses: HashMap::new(),
            business_days: HashMap::new(),
            slots: HashMap::new(),
            assignments: Vec::new(),
            members: Vec::new(),
            roles: Vec::new(),
            fail_next_create: None,
            fail_next_cancel: None,
            enforce_capacity: true,
        }
    }
}

/// In-memory stand-in for all five collaborator services
///
/// Enforces the capacity invariant authoritatively on `create`, retains
/// cancelled assignments, and treats a cancel of a cancelled assignment
/// as idempotent success. Failure injection covers one-shot create and
/// cancel faults for race and best-effort scenarios.
#[derive(Default)]
pub struct InMemoryShiftBackend {
    state: Mutex<BackendState>,
}

impl InMemoryShiftBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the authoritative capacity check on `create`
    ///
    /// Disabling models a server whose check raced: two sessions'
    /// creates both pass and the slot ends up over capacity, which is
    /// the state the non-atomic bulk path must report truthfully.
    pub fn set_enforce_capacity(&self, enforce: bool) {
        self.state.lock().unwrap().enforce_capacity = enforce;
    }

    pub fn add_member(&self, member: Member) {
        self.state.lock().unwrap().members.push(member);
    }

    pub fn add_role(&self, role: Role) {
        self.state.lock().unwrap().roles.push(role);
    }

    pub fn add_collection(&self, collection: AttendanceCollection) {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(collection.id, collection);
    }

    pub fn push_response(&self, collection_id: CollectionId, response: AttendanceResponse) {
        self.state
            .lock()
            .unwrap()
            .responses
            .entry(collection_id)
            .or_default()
            .push(response);
    }

    pub fn add_business_day(&self, event_id: EventId, day: BusinessDay) {
        self.state
            .lock()
            .unwrap()
            .business_days
            .entry(event_id)
            .or_default()
            .push(day);
    }

    pub fn add_slot(&self, slot: ShiftSlot) {
        self.state
            .lock()
            .unwrap()
            .slots
            .entry(slot.business_day_id)
            .or_default()
            .push(slot);
    }

    /// Insert a confirmed assignment directly, as a concurrent actor would
    pub fn insert_confirmed(&self, slot_id: SlotId, member_id: MemberId) -> AssignmentId {
        let assignment = confirmed(slot_id, member_id);
        let id = assignment.id;
        self.state.lock().unwrap().assignments.push(assignment);
        id
    }

    pub fn fail_next_create(&self, error: ServiceError) {
        self.state.lock().unwrap().fail_next_create = Some(error);
    }

    pub fn fail_next_cancel(&self, error: ServiceError) {
        self.state.lock().unwrap().fail_next_cancel = Some(error);
    }

    /// Snapshot of every assignment row, cancelled included
    pub fn assignments(&self) -> Vec<ShiftAssignment> {
        self.state.lock().unwrap().assignments.clone()
    }

    /// Confirmed assignments currently on a slot
    pub fn confirmed_count(&self, slot_id: SlotId) -> usize {
        self.state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.slot_id == slot_id && a.is_confirmed())
            .count()
    }

    fn find_slot(state: &BackendState, slot_id: SlotId) -> Option<ShiftSlot> {
        state
            .slots
            .values()
            .flatten()
            .find(|s| s.id == slot_id)
            .cloned()
    }
}

#[async_trait]
impl AttendanceService for InMemoryShiftBackend {
    async fn get_collection(
        &self,
        id: CollectionId,
    ) -> Result<AttendanceCollection, ServiceError> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("collection {id}")))
    }

    async fn list_responses(
        &self,
        id: CollectionId,
    ) -> Result<Vec<AttendanceResponse>, ServiceError> {
        self.state
            .lock()
            .unwrap()
            .responses
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("collection {id}")))
    }
}

#[async_trait]
impl ShiftSlotService for InMemoryShiftBackend {
    async fn list_slots(
        &self,
        business_day_id: BusinessDayId,
    ) -> Result<Vec<RawShiftSlot>, ServiceError> {
        self.state
            .lock()
            .unwrap()
            .slots
            .get(&business_day_id)
            .map(|slots| slots.iter().map(raw_of_slot).collect())
            .ok_or_else(|| ServiceError::NotFound(format!("business day {business_day_id}")))
    }
}

#[async_trait]
impl AssignmentService for InMemoryShiftBackend {
    async fn list_assignments(
        &self,
        filter: AssignmentFilter,
    ) -> Result<Vec<RawAssignment>, ServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assignments
            .iter()
            .filter(|a| filter.slot_id.map_or(true, |id| a.slot_id == id))
            .filter(|a| filter.member_id.map_or(true, |id| a.member_id == id))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .map(raw_of_assignment)
            .collect())
    }

    async fn create(
        &self,
        slot_id: SlotId,
        member_id: MemberId,
        note: Option<String>,
    ) -> Result<RawAssignment, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_next_create.take() {
            return Err(error);
        }
        let slot = Self::find_slot(&state, slot_id)
            .ok_or_else(|| ServiceError::NotFound(format!("slot {slot_id}")))?;

        // Authoritative capacity check: this is where a race surfaces.
        if state.enforce_capacity {
            let confirmed_count = state
                .assignments
                .iter()
                .filter(|a| a.slot_id == slot_id && a.is_confirmed())
                .count();
            if confirmed_count >= slot.required_count as usize {
                return Err(ServiceError::Conflict);
            }
        }

        let mut assignment = confirmed(slot_id, member_id);
        assignment.note = note;
        let raw = raw_of_assignment(&assignment);
        state.assignments.push(assignment);
        Ok(raw)
    }

    async fn cancel(&self, assignment_id: AssignmentId) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_next_cancel.take() {
            return Err(error);
        }
        let assignment = state
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| ServiceError::NotFound(format!("assignment {assignment_id}")))?;
        // Idempotent: cancelling a cancelled row stays cancelled.
        assignment.status = AssignmentStatus::Cancelled;
        Ok(())
    }
}

#[async_trait]
impl DirectoryService for InMemoryShiftBackend {
    async fn list_active_members(&self) -> Result<Vec<Member>, ServiceError> {
        Ok(self.state.lock().unwrap().members.clone())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        Ok(self.state.lock().unwrap().roles.clone())
    }
}

#[async_trait]
impl BusinessDayService for InMemoryShiftBackend {
    async fn list_business_days(
        &self,
        event_id: EventId,
    ) -> Result<Vec<RawBusinessDay>, ServiceError> {
        self.state
            .lock()
            .unwrap()
            .business_days
            .get(&event_id)
            .map(|days| days.iter().map(raw_of_day).collect())
            .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))
    }
}

/// Helper for NaiveDate literals in tests
pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}
