use crate::error::{AppError, AppResult};
use crate::models::{ApproverRole, DecisionStatus, Event, User};
use crate::notify::NotificationSink;
use crate::services::dispatch_all;
use crate::store::EventStore;
use crate::workflow::{override_authority, state_machine};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// An approver's decision on an event
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub approve: bool,
    pub remark: Option<String>,
}

/// Service for role decisions along the review sequence and for the
/// administrative override path
pub struct ApprovalService {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn EventStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    /// Apply an approver's decision at the event's current review stage.
    /// A decision against an already-terminal event is silently ignored
    /// and returns the event unchanged.
    pub async fn decide(
        &self,
        approver: &User,
        event_id: Uuid,
        request: DecisionRequest,
    ) -> AppResult<Event> {
        info!(approver = %approver.username, %event_id, approve = request.approve, "role decision");

        let mut event = self.require_event(event_id).await?;
        let outcome =
            state_machine::decide(&mut event, approver, request.approve, request.remark.as_deref())?;

        let event = if outcome.applied {
            self.store.save(&event).await?
        } else {
            event
        };
        dispatch_all(&self.notifier, outcome.dispatches).await;
        Ok(event)
    }

    /// Set a decision slot out of band and force-recompute the stage.
    /// Administrative accounts only.
    pub async fn override_decision(
        &self,
        actor: &User,
        event_id: Uuid,
        target: ApproverRole,
        status: DecisionStatus,
        remark: Option<String>,
    ) -> AppResult<Event> {
        if !actor.role.is_administrative() {
            return Err(AppError::Unauthorized(
                "Only administrators can override decisions".to_string(),
            ));
        }
        info!(actor = %actor.username, %event_id, target = target.as_str(), status = status.as_str(), "override decision");

        let mut event = self.require_event(event_id).await?;
        let outcome = override_authority::apply(&mut event, target, status, remark.as_deref())?;

        let event = self.store.save(&event).await?;
        dispatch_all(&self.notifier, outcome.dispatches).await;
        debug_assert_eq!(event.stage, outcome.stage);
        Ok(event)
    }

    /// Events currently sitting at the approver's review stage, newest
    /// first. Roles without a review stage see nothing.
    pub async fn list_pending_for_role(&self, approver: &User) -> AppResult<Vec<Event>> {
        match approver.role.approver_role() {
            Some(role) => self.store.list_by_stage(role.review_stage()).await,
            None => Ok(Vec::new()),
        }
    }

    /// Events the approver's role has already decided on, most recently
    /// updated first.
    pub async fn list_history_for_role(&self, approver: &User) -> AppResult<Vec<Event>> {
        match approver.role.approver_role() {
            Some(role) => self.store.list_decided_for_role(role).await,
            None => Ok(Vec::new()),
        }
    }

    async fn require_event(&self, event_id: Uuid) -> AppResult<Event> {
        self.store
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", event_id)))
    }
}
