//! Domain models for the approval workflow.
//!
//! The `Event` aggregate (event plus its sub-events) is the unit the
//! workflow mutates and the store loads and saves atomically.

pub mod club;
pub mod event;
pub mod sub_event;
pub mod user;

// Re-export all models for convenient access
pub use club::Club;
pub use event::{ApproverRole, Decision, DecisionStatus, Event, EventStage};
pub use sub_event::{BudgetItem, PocStatus, SubEvent};
pub use user::{User, UserRole};
