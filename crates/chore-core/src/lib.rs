//! Core domain logic for recurring task tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Perceptions: timestamped observation/execution reports per task
//! - Reconciliation: turning a perception history into completed intervals
//! - Metrics: average interval duration and next due date
//! - Registry: the owned, sortable collection of tracked items
//!
//! Everything here is synchronous and free of I/O. Timestamps are supplied by
//! the caller.

pub mod interval;
pub mod item;
pub mod metrics;
pub mod perception;
pub mod reconcile;
pub mod registry;
pub mod types;

pub use interval::{CompletedInterval, IntervalError};
pub use item::{ItemError, TrackedItem};
pub use metrics::Metrics;
pub use perception::{Perception, PerceptionKind, PerceptionLog};
pub use reconcile::{Reconciler, reconcile};
pub use registry::{Registry, RegistryError, SortKey, SortOrder};
pub use types::{ItemName, ValidationError};
