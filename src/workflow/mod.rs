//! The approval/budget workflow core.
//!
//! Every function here operates on the in-memory [`Event`](crate::models::Event)
//! aggregate and is pure with respect to collaborators: mutations happen
//! on the aggregate, and side effects come back as notification
//! dispatches for the caller to persist and forward. The services layer
//! wraps each call in one load → mutate → save round trip.

pub mod budget;
pub mod override_authority;
pub mod poc_gate;
pub mod state_machine;
pub mod visibility;

pub use budget::{reconcile, ReconciledBudget};
pub use override_authority::OverrideOutcome;
pub use poc_gate::{PocDecision, PocOutcome};
pub use state_machine::DecisionOutcome;
