//! Error taxonomy for the command layer
//!
//! Four classes with distinct handling:
//! - [`ValidationError`]: local, raised before any network call
//! - [`EngineError::Conflict`]: the authoritative capacity-race signal,
//!   never retried automatically
//! - [`EngineError::NotFound`]: degrades to an empty-state view at load
//! - [`EngineError::Transient`]: surfaced verbatim, manual retry only

use chrono::NaiveDate;
use rota_model::{MemberId, ModelError, SlotId};

/// Local precondition failures; block submission without a network call
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Nothing selected
    #[error("no members selected")]
    EmptySelection,

    /// More members selected than the slot requires
    #[error("selected {selected} members for a slot requiring {required}")]
    SelectionExceedsCapacity {
        /// Selection size
        selected: usize,
        /// Slot requirement
        required: u32,
    },

    /// No business day matches the target date
    #[error("no business day matches {date}")]
    NoBusinessDay {
        /// Unmatched calendar date
        date: NaiveDate,
    },

    /// Member is not in the availability pool for the date
    #[error("member {member_id} is not assignable on this date")]
    NotInPool {
        /// Rejected member
        member_id: MemberId,
    },

    /// The slot has no remaining seats (known before the call)
    #[error("slot {slot_id} has no remaining seats")]
    SlotFull {
        /// Full slot
        slot_id: SlotId,
    },

    /// A mutation for the same control is still in flight
    #[error("operation already pending for {key}")]
    OperationPending {
        /// Pending operation key
        key: String,
    },
}

/// Remote failure classification as reported by a collaborator
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The authoritative capacity-violation response
    #[error("capacity conflict")]
    Conflict,

    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else: network failure, server error
    #[error("transient failure: {0}")]
    Transient(String),
}

/// Top-level error for reconciliation operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Local precondition failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Capacity race lost to a concurrent actor
    ///
    /// Never retried automatically; the caller must refresh the slot
    /// board before trying again.
    #[error("slot {slot_id} reached capacity during the request")]
    Conflict {
        /// Raced slot
        slot_id: SlotId,
    },

    /// Referenced entity missing server-side
    #[error("not found: {0}")]
    NotFound(String),

    /// Surfaced verbatim; manual retry only
    #[error("transient failure: {0}")]
    Transient(String),
}

impl EngineError {
    /// Whether a manual retry without refreshing state is reasonable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether this is the capacity-race signal
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Classify a failure from an assignment-create call
    #[must_use]
    pub(crate) fn from_create_failure(err: ServiceError, slot_id: SlotId) -> Self {
        match err {
            ServiceError::Conflict => Self::Conflict { slot_id },
            ServiceError::NotFound(what) => Self::NotFound(what),
            ServiceError::Transient(message) => Self::Transient(message),
        }
    }

    /// Classify a failure from a read or cancel call
    ///
    /// A conflict response outside assignment creation has no slot to
    /// attach to and no race semantics; it is surfaced as transient.
    #[must_use]
    pub(crate) fn from_fetch_failure(err: ServiceError) -> Self {
        match err {
            ServiceError::Conflict => Self::Transient("unexpected capacity conflict".to_string()),
            ServiceError::NotFound(what) => Self::NotFound(what),
            ServiceError::Transient(message) => Self::Transient(message),
        }
    }
}

impl From<ModelError> for EngineError {
    /// A malformed collaborator payload is not locally fixable and not a
    /// race; it surfaces as a transient failure with the decode message.
    fn from(err: ModelError) -> Self {
        Self::Transient(err.to_string())
    }
}
