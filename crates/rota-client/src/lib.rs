//! Rota Client - the command layer over the reconciliation reducer
//!
//! Drives the abstract collaborator services and feeds their results
//! back into the pure reducer:
//! - Collaborator traits (attendance, slots, assignments, directory,
//!   business days)
//! - Local validation, conflict classification, transient surfacing
//! - The assignment mutator with pessimistic, non-retrying discipline
//! - The full-refetch reconciliation cycle
//!
//! # Example
//!
//! ```rust,ignore
//! use rota_client::{Collaborators, SessionContext, ShiftReconciler};
//!
//! # async fn example(collaborators: Collaborators) -> Result<(), rota_client::EngineError> {
//! let session = SessionContext::new("session-token").with_actor("admin");
//! let engine = ShiftReconciler::new(collaborators, session);
//!
//! let collection = engine.load_collection(collection_id).await?;
//! let snapshot = engine.load_day(event_id, collection.ordered_dates()[0]).await?;
//! let refreshed = engine.assign(event_id, &snapshot, slot_id, member_id, None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod mutator;
pub mod reconciler;
pub mod services;
pub mod session;

// Re-exports for convenience
pub use error::{EngineError, ServiceError, ValidationError};
pub use mutator::{BulkFailure, BulkReplaceReport, RosterEditor};
pub use reconciler::{Collaborators, DaySnapshot, Directory, ShiftReconciler};
pub use services::{
    AssignmentFilter, AssignmentService, AttendanceService, BusinessDayService, DirectoryService,
    ShiftSlotService,
};
pub use session::SessionContext;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Rota engine
    pub use crate::{
        Collaborators, DaySnapshot, EngineError, RosterEditor, SessionContext, ShiftReconciler,
        ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
