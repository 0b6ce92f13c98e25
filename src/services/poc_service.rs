use crate::config::BudgetHeadPolicy;
use crate::error::{AppError, AppResult};
use crate::models::{BudgetItem, SubEvent, User};
use crate::notify::NotificationSink;
use crate::services::dispatch_all;
use crate::store::EventStore;
use crate::workflow::poc_gate::{self, PocDecision};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A POC's accept/decline submission for one sub-event
#[derive(Debug, Clone, Default)]
pub struct PocDecisionRequest {
    pub accept: bool,
    pub budget_head: Option<String>,
    pub budget_items: Option<Vec<BudgetItem>>,
}

/// Service for the per-sub-event POC acceptance gate
pub struct PocService {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn NotificationSink>,
    budget_policy: BudgetHeadPolicy,
}

impl PocService {
    pub fn new(
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn NotificationSink>,
        budget_policy: BudgetHeadPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            budget_policy,
        }
    }

    /// Sub-events still awaiting this POC's decision
    pub async fn list_pending(&self, poc: &User) -> AppResult<Vec<SubEvent>> {
        self.store.list_pending_poc(poc.id).await
    }

    /// Apply a POC decision. Idempotent after the first decision: the
    /// stored state comes back unchanged and nothing further happens.
    pub async fn decide(
        &self,
        poc: &User,
        sub_event_id: Uuid,
        request: PocDecisionRequest,
    ) -> AppResult<SubEvent> {
        info!(poc = %poc.username, %sub_event_id, accept = request.accept, "POC decision");

        let mut event = self
            .store
            .find_by_sub_event(sub_event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))?;

        let outcome = poc_gate::decide(
            &mut event,
            sub_event_id,
            poc,
            PocDecision {
                accept: request.accept,
                budget_head: request.budget_head,
                budget_items: request.budget_items,
            },
            self.budget_policy,
        )?;

        let event = if outcome.applied {
            self.store.save(&event).await?
        } else {
            event
        };
        dispatch_all(&self.notifier, outcome.dispatches).await;

        event
            .sub_event(sub_event_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))
    }
}
