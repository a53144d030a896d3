//! Boundary validation for collaborator payloads
//!
//! The business-day and slot services deliver loosely-typed shapes:
//! string ids, string dates and times, optional fields. Each raw shape is
//! validated exactly once here; everything past this module works with
//! the typed records in [`crate::records`].

use crate::error::ModelError;
use crate::ids::{AssignmentId, BusinessDayId, InstanceId, MemberId, SlotId};
use crate::records::{
    AssignmentStatus, BusinessDay, ShiftAssignment, ShiftSlot, SlotInstance,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

/// Business day as delivered by the business-day service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBusinessDay {
    /// Id as string
    pub id: Option<String>,
    /// Calendar date, "YYYY-MM-DD"
    pub date: Option<String>,
    /// Opening time, "HH:MM" or "HH:MM:SS"
    pub open: Option<String>,
    /// Closing time, "HH:MM" or "HH:MM:SS"
    pub close: Option<String>,
}

impl RawBusinessDay {
    /// Validate into a typed [`BusinessDay`]
    ///
    /// # Errors
    /// Missing id/date, malformed id, or unparseable date/time.
    pub fn validate(self) -> Result<BusinessDay, ModelError> {
        let id = require_id::<BusinessDayId>("business_day", "id", self.id)?;
        let date = require_date("business_day", "date", self.date)?;
        let open = parse_opt_time("open", self.open)?;
        let close = parse_opt_time("close", self.close)?;
        Ok(BusinessDay {
            id,
            date,
            open,
            close,
        })
    }
}

/// Shift slot as delivered by the slot service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShiftSlot {
    /// Id as string
    pub id: Option<String>,
    /// Owning business day id as string
    pub business_day_id: Option<String>,
    /// Instance id, absent for unclassified slots
    pub instance_id: Option<String>,
    /// Instance name, absent for unclassified slots
    pub instance_name: Option<String>,
    /// Required member count
    pub required_count: Option<u32>,
    /// Display precedence (lower = earlier); defaults to 0
    pub priority: Option<i32>,
    /// Start time, "HH:MM" or "HH:MM:SS"
    pub start: Option<String>,
    /// End time, "HH:MM" or "HH:MM:SS"
    pub end: Option<String>,
}

impl RawShiftSlot {
    /// Validate into a typed [`ShiftSlot`]
    ///
    /// An instance reference is kept only when both id and name are
    /// present; a dangling half-reference degrades to unclassified.
    ///
    /// # Errors
    /// Missing or malformed required fields, or `required_count == 0`.
    pub fn validate(self) -> Result<ShiftSlot, ModelError> {
        let id = require_id::<SlotId>("shift_slot", "id", self.id)?;
        let business_day_id =
            require_id::<BusinessDayId>("shift_slot", "business_day_id", self.business_day_id)?;
        let required_count = self.required_count.ok_or(ModelError::MissingField {
            record: "shift_slot",
            field: "required_count",
        })?;
        if required_count == 0 {
            return Err(ModelError::ZeroRequiredCount { slot_id: id });
        }
        let start = require_time("shift_slot", "start", self.start)?;
        let end = require_time("shift_slot", "end", self.end)?;

        let instance = match (self.instance_id, self.instance_name) {
            (Some(raw_id), Some(name)) => Some(SlotInstance {
                id: InstanceId::from(parse_uuid("instance_id", &raw_id)?),
                name,
            }),
            _ => None,
        };

        Ok(ShiftSlot {
            id,
            business_day_id,
            instance,
            required_count,
            priority: self.priority.unwrap_or(0),
            start,
            end,
        })
    }
}

/// Assignment as delivered by the assignment service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssignment {
    /// Id as string
    pub id: Option<String>,
    /// Slot id as string
    pub slot_id: Option<String>,
    /// Member id as string
    pub member_id: Option<String>,
    /// Status, "confirmed" or "cancelled"
    pub status: Option<String>,
    /// Optional note
    pub note: Option<String>,
}

impl RawAssignment {
    /// Validate into a typed [`ShiftAssignment`]
    ///
    /// # Errors
    /// Missing or malformed required fields, or an unknown status string.
    pub fn validate(self) -> Result<ShiftAssignment, ModelError> {
        let id = require_id::<AssignmentId>("assignment", "id", self.id)?;
        let slot_id = require_id::<SlotId>("assignment", "slot_id", self.slot_id)?;
        let member_id = require_id::<MemberId>("assignment", "member_id", self.member_id)?;
        let status = match self.status.as_deref() {
            Some("confirmed") => AssignmentStatus::Confirmed,
            Some("cancelled") => AssignmentStatus::Cancelled,
            Some(other) => return Err(ModelError::UnknownStatus(other.to_string())),
            None => {
                return Err(ModelError::MissingField {
                    record: "assignment",
                    field: "status",
                })
            }
        };
        Ok(ShiftAssignment {
            id,
            slot_id,
            member_id,
            status,
            note: self.note,
        })
    }
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, ModelError> {
    Uuid::parse_str(value).map_err(|_| ModelError::InvalidId {
        field,
        value: value.to_string(),
    })
}

fn require_id<T: From<Uuid>>(
    record: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<T, ModelError> {
    let raw = value.ok_or(ModelError::MissingField { record, field })?;
    Ok(T::from(parse_uuid(field, &raw)?))
}

fn require_date(
    record: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<NaiveDate, ModelError> {
    let raw = value.ok_or(ModelError::MissingField { record, field })?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ModelError::InvalidDate {
        field,
        value: raw,
    })
}

fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, ModelError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ModelError::InvalidTime {
            field,
            value: raw.to_string(),
        })
}

fn parse_opt_time(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveTime>, ModelError> {
    value.as_deref().map(|raw| parse_time(field, raw)).transpose()
}

fn require_time(
    record: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<NaiveTime, ModelError> {
    let raw = value.ok_or(ModelError::MissingField { record, field })?;
    parse_time(field, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_slot() -> RawShiftSlot {
        RawShiftSlot {
            id: Some(Uuid::new_v4().to_string()),
            business_day_id: Some(Uuid::new_v4().to_string()),
            instance_id: None,
            instance_name: None,
            required_count: Some(2),
            priority: Some(1),
            start: Some("09:00".to_string()),
            end: Some("13:00".to_string()),
        }
    }

    #[test]
    fn business_day_validates_minimal_shape() {
        let raw = RawBusinessDay {
            id: Some(Uuid::new_v4().to_string()),
            date: Some("2026-08-10".to_string()),
            open: Some("09:00".to_string()),
            close: None,
        };
        let day = raw.validate().unwrap();
        assert_eq!(day.date.to_string(), "2026-08-10");
        assert!(day.open.is_some());
        assert!(day.close.is_none());
    }

    #[test]
    fn business_day_rejects_bad_date() {
        let raw = RawBusinessDay {
            id: Some(Uuid::new_v4().to_string()),
            date: Some("10/08/2026".to_string()),
            open: None,
            close: None,
        };
        assert!(matches!(
            raw.validate(),
            Err(ModelError::InvalidDate { field: "date", .. })
        ));
    }

    #[test]
    fn slot_accepts_both_time_formats() {
        let mut raw = raw_slot();
        raw.start = Some("09:00:00".to_string());
        let slot = raw.validate().unwrap();
        assert_eq!(slot.time_label(), "09:00-13:00");
    }

    #[test]
    fn slot_rejects_zero_capacity() {
        let mut raw = raw_slot();
        raw.required_count = Some(0);
        assert!(matches!(
            raw.validate(),
            Err(ModelError::ZeroRequiredCount { .. })
        ));
    }

    #[test]
    fn slot_half_instance_reference_degrades_to_unclassified() {
        let mut raw = raw_slot();
        raw.instance_id = Some(Uuid::new_v4().to_string());
        raw.instance_name = None;
        let slot = raw.validate().unwrap();
        assert!(slot.instance.is_none());
    }

    #[test]
    fn assignment_rejects_unknown_status() {
        let raw = RawAssignment {
            id: Some(Uuid::new_v4().to_string()),
            slot_id: Some(Uuid::new_v4().to_string()),
            member_id: Some(Uuid::new_v4().to_string()),
            status: Some("pending".to_string()),
            note: None,
        };
        assert!(matches!(
            raw.validate(),
            Err(ModelError::UnknownStatus(s)) if s == "pending"
        ));
    }

    #[test]
    fn assignment_parses_from_json() {
        let json = format!(
            r#"{{"id":"{}","slot_id":"{}","member_id":"{}","status":"confirmed"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let raw: RawAssignment = serde_json::from_str(&json).unwrap();
        let assignment = raw.validate().unwrap();
        assert!(assignment.is_confirmed());
    }
}
