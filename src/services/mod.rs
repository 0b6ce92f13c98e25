//! Orchestration services: the operations the boundary layer wraps.
//!
//! Each mutating operation is one atomic load → mutate-in-memory → save
//! round trip against the event store; notification dispatch happens
//! after the save and is fire-and-forget.

pub mod approval_service;
pub mod event_service;
pub mod poc_service;

pub use approval_service::{ApprovalService, DecisionRequest};
pub use event_service::{CreateEventRequest, EventService, SubEventRequest};
pub use poc_service::{PocDecisionRequest, PocService};

use crate::notify::{Dispatch, NotificationSink};
use std::sync::Arc;
use tracing::warn;

/// Forward workflow dispatches to the sink, logging (never propagating)
/// delivery failures.
pub(crate) async fn dispatch_all(sink: &Arc<dyn NotificationSink>, dispatches: Vec<Dispatch>) {
    for dispatch in dispatches {
        let recipient = dispatch.recipient;
        if let Err(reason) = sink.notify(dispatch).await {
            warn!(?recipient, %reason, "notification delivery failed");
        }
    }
}
