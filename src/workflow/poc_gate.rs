//! Per-sub-event POC acceptance gate.
//!
//! A sub-event becomes usable by its parent only once the delegated POC
//! has accepted it, at which point its budget is reconciled and frozen.
//! A single decline short-circuits the whole event to rejection. Full
//! acceptance across all sub-events is the sole trigger that moves an
//! event from POC review into institutional review.

use crate::config::BudgetHeadPolicy;
use crate::error::{AppError, AppResult};
use crate::models::{BudgetItem, DecisionStatus, Event, EventStage, PocStatus, User, UserRole};
use crate::notify::{Dispatch, Notification};
use crate::workflow::budget;
use uuid::Uuid;

/// Remark written onto the SA slot when a POC declines
pub const POC_DECLINED_REMARK: &str = "Rejected because POC declined";

/// A POC's accept/decline submission. On accept, a head and items may be
/// supplied to replace the budget proposed at event creation; omitted
/// fields fall back to what is already stored on the sub-event.
#[derive(Debug, Clone, Default)]
pub struct PocDecision {
    pub accept: bool,
    pub budget_head: Option<String>,
    pub budget_items: Option<Vec<BudgetItem>>,
}

/// Result of a POC decision against the in-memory aggregate
#[derive(Debug, Clone)]
pub struct PocOutcome {
    /// False when the sub-event had already left `PENDING` and the call
    /// was a tolerated no-op
    pub applied: bool,
    pub poc_status: PocStatus,
    pub dispatches: Vec<Dispatch>,
}

/// Apply a POC decision to the aggregate.
///
/// Fails with `Unauthorized` unless `actor` is the resolved POC of the
/// sub-event. Idempotent once the sub-event has left `PENDING`: the
/// existing state is returned unchanged and nothing is emitted.
pub fn decide(
    event: &mut Event,
    sub_event_id: Uuid,
    actor: &User,
    decision: PocDecision,
    policy: BudgetHeadPolicy,
) -> AppResult<PocOutcome> {
    let sub = event
        .sub_event(sub_event_id)
        .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))?;

    if sub.poc_id != actor.id {
        return Err(AppError::Unauthorized(
            "User cannot act on this sub-event".to_string(),
        ));
    }

    if sub.poc_status != PocStatus::Pending {
        return Ok(PocOutcome {
            applied: false,
            poc_status: sub.poc_status,
            dispatches: Vec::new(),
        });
    }

    if decision.accept {
        let head = match decision.budget_head.as_deref() {
            Some(h) if !h.trim().is_empty() => h.to_string(),
            _ => sub.budget_head.clone(),
        };
        let items = match &decision.budget_items {
            Some(items) if !items.is_empty() => items.clone(),
            _ => sub.budget_breakdown.clone(),
        };
        let reconciled = budget::reconcile(policy, &head, &items)?;

        let sub = event
            .sub_event_mut(sub_event_id)
            .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))?;
        sub.budget_head = reconciled.head;
        sub.budget_total = reconciled.total;
        sub.budget_breakdown = reconciled.items;
        sub.poc_status = PocStatus::Accepted;

        // Full acceptance starts institutional review
        if event.stage == EventStage::PocReview && event.all_pocs_accepted() {
            event.stage = EventStage::SaReview;
        }
    } else {
        let sub = event
            .sub_event_mut(sub_event_id)
            .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))?;
        sub.poc_status = PocStatus::Declined;

        // A decline terminates the event immediately, short-circuiting
        // the later review stages
        event.stage = EventStage::Rejected;
        event.sa.status = DecisionStatus::Rejected;
        event.sa.remark = Some(POC_DECLINED_REMARK.to_string());
    }

    event.touch_updated_at();

    let (sub_name, poc_name, poc_status) = {
        let sub = event
            .sub_event(sub_event_id)
            .ok_or_else(|| AppError::NotFound(format!("Sub-event not found: {}", sub_event_id)))?;
        (sub.name.clone(), sub.poc_name.clone(), sub.poc_status)
    };
    let mut dispatches = vec![Dispatch::to_user(
        event.student_id,
        Notification::PocDecision {
            event_id: event.id,
            event_title: event.title.clone(),
            sub_event_id,
            sub_event_name: sub_name,
            poc_name,
            accepted: decision.accept,
            stage: event.stage,
        },
    )];
    if event.stage == EventStage::SaReview {
        dispatches.push(Dispatch::to_role(
            UserRole::SaOffice,
            Notification::AwaitingApproval {
                event_id: event.id,
                event_title: event.title.clone(),
                stage: event.stage,
            },
        ));
    }

    Ok(PocOutcome {
        applied: true,
        poc_status,
        dispatches,
    })
}
