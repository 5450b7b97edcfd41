//! Core domain logic for break tracking.
//!
//! This crate contains the pure engine behind the dashboard:
//! - Status state machine: validating and applying work/break actions
//! - Aggregation: replaying a day's event log into break and work time
//! - Break policy: the daily break cap
//! - Stats: status counts for the admin view
//!
//! Storage is reached only through the traits in [`store`]; the
//! [`Tracker`] wires everything together.

mod aggregate;
pub mod event;
mod machine;
pub mod policy;
mod stats;
pub mod status;
pub mod store;
mod tracker;
pub mod types;
pub mod user;
pub mod window;

pub use aggregate::{DayTotals, aggregate_day, aggregate_day_from};
pub use event::TimeLogEvent;
pub use machine::{ActionError, Transition, apply_action};
pub use policy::{BreakPolicy, can_start_break, is_exceeded};
pub use stats::{StatsCounts, reduce_stats};
pub use status::{Action, Status};
pub use store::{EventLogStore, StorageError, Store, UserStore};
pub use tracker::{DaySummary, Tracker, TrackerError};
pub use types::{Role, UserId, ValidationError};
pub use user::{InconsistentSnapshot, UserPatch, UserSnapshot};
pub use window::DayWindow;
