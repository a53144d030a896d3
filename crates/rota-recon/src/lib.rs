//! Rota Recon - the pure reconciliation reducer
//!
//! The side-effect-free core of the shift-slot assignment engine:
//! - Aggregates attendance responses into lookup structures
//! - Tracks slot capacity per instance group
//! - Resolves the per-date availability pool
//! - Sorts, filters, and groups the member response matrix
//!
//! Nothing here performs I/O; every structure is rebuilt from fresh
//! collaborator data after each mutation.
//!
//! # Example
//!
//! ```rust,ignore
//! use rota_recon::{AvailabilityPool, ResponseBook, SlotBoard};
//!
//! let book = ResponseBook::aggregate(&responses);
//! let board = SlotBoard::build(&slots, &assignments);
//! let pool = AvailabilityPool::resolve(date_id, &book, &board);
//! ```

#![warn(unreachable_pub)]

pub mod aggregate;
pub mod capacity;
pub mod pool;
pub mod sortfilter;

// Re-exports for convenience
pub use aggregate::ResponseBook;
pub use capacity::{InstanceGroup, InstanceKey, SlotBoard, SlotStatus};
pub use pool::AvailabilityPool;
pub use sortfilter::{
    attendance_rank, RoleFilter, RosterQuery, SortDirection, SortKey, SortState,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
