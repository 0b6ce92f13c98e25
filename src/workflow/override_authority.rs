//! Administrative override: set any decision slot and recompute the
//! stage from scratch.
//!
//! This is the one operation allowed to move the stage backward as well
//! as forward. The workflow applies it unconditionally; the service
//! layer restricts it to administrative accounts.

use crate::error::{AppError, AppResult};
use crate::models::{ApproverRole, DecisionStatus, Event, EventStage};
use crate::notify::{Dispatch, Notification};

/// Result of an override against the aggregate
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    pub stage: EventStage,
    pub dispatches: Vec<Dispatch>,
}

/// Write the targeted decision slot and force-recompute the stage.
///
/// Unlike the normal path there is no stage-match precondition; the only
/// validation is that a rejection carries a non-blank remark.
pub fn apply(
    event: &mut Event,
    target: ApproverRole,
    status: DecisionStatus,
    remark: Option<&str>,
) -> AppResult<OverrideOutcome> {
    let remark = remark.map(str::trim).filter(|r| !r.is_empty());
    if status == DecisionStatus::Rejected && remark.is_none() {
        return Err(AppError::Validation(
            "Rejections require a remark".to_string(),
        ));
    }

    let slot = event.decision_mut(target);
    slot.status = status;
    slot.remark = remark.map(str::to_string);

    event.stage = recompute_stage(event);
    event.touch_updated_at();

    let mut dispatches = vec![Dispatch::to_user(
        event.student_id,
        Notification::DecisionRecorded {
            event_id: event.id,
            event_title: event.title.clone(),
            role: target,
            status,
            remark: event.decision(target).remark.clone(),
            stage: event.stage,
        },
    )];
    if let Some(owning_role) = event.stage.reviewing_role() {
        dispatches.push(Dispatch::to_role(
            owning_role.user_role(),
            Notification::AwaitingApproval {
                event_id: event.id,
                event_title: event.title.clone(),
                stage: event.stage,
            },
        ));
    }

    Ok(OverrideOutcome {
        stage: event.stage,
        dispatches,
    })
}

/// Recompute the stage from the three decision slots alone, scanning in
/// fixed SA → Faculty → Dean order. The first non-approved slot
/// determines the stage: its own review stage if pending, REJECTED if
/// rejected. All three approved means APPROVED.
pub fn recompute_stage(event: &Event) -> EventStage {
    for role in ApproverRole::IN_ORDER {
        match event.decision(role).status {
            DecisionStatus::Approved => continue,
            DecisionStatus::Pending => return role.review_stage(),
            DecisionStatus::Rejected => return EventStage::Rejected,
        }
    }
    EventStage::Approved
}
