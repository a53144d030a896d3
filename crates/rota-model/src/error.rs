//! Error types for boundary validation
//!
//! Covers the single point where loosely-typed collaborator payloads are
//! converted into typed records. The reconciliation core never handles
//! untyped data, so these errors occur at ingress only.

/// Errors raised while validating raw collaborator payloads
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Required field absent from the payload
    #[error("missing field '{field}' on {record}")]
    MissingField {
        /// Record kind being validated
        record: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Id field present but not a valid UUID
    #[error("invalid id in '{field}': {value}")]
    InvalidId {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Date field present but unparseable
    #[error("invalid date in '{field}': {value}")]
    InvalidDate {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Time field present but unparseable
    #[error("invalid time in '{field}': {value}")]
    InvalidTime {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Status string not part of the assignment lifecycle
    #[error("unknown assignment status: '{0}'")]
    UnknownStatus(String),

    /// A slot must require at least one member
    #[error("slot {slot_id} has required_count 0")]
    ZeroRequiredCount {
        /// Offending slot
        slot_id: crate::ids::SlotId,
    },
}
