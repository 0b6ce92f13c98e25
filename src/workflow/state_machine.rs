//! Event-level approval state machine.
//!
//! Stages run POC_REVIEW → SA_REVIEW → FACULTY_REVIEW → DEAN_REVIEW and
//! terminate in APPROVED or REJECTED. Each review stage is owned by one
//! approver role; a decision is only accepted from the role whose review
//! stage the event currently sits at.

use crate::error::{AppError, AppResult};
use crate::models::{DecisionStatus, Event, EventStage, User};
use crate::notify::{Dispatch, Notification};

/// Result of applying a role decision to the aggregate
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// False when the event was already terminal and the decision was
    /// silently ignored
    pub applied: bool,
    pub stage: EventStage,
    pub dispatches: Vec<Dispatch>,
}

impl DecisionOutcome {
    fn ignored(stage: EventStage) -> Self {
        Self {
            applied: false,
            stage,
            dispatches: Vec::new(),
        }
    }
}

/// Apply an approver's decision to the event.
///
/// A decision against an already-terminal event is a tolerated no-op,
/// not an error; callers that care must check `applied` on the outcome.
/// Decisions cannot precede full POC acceptance (`Workflow` error), and
/// only the role owning the current review stage may decide
/// (`Unauthorized` otherwise). Rejection requires a non-blank remark.
pub fn decide(
    event: &mut Event,
    approver: &User,
    approve: bool,
    remark: Option<&str>,
) -> AppResult<DecisionOutcome> {
    if event.is_terminal() {
        return Ok(DecisionOutcome::ignored(event.stage));
    }
    if event.stage == EventStage::PocReview {
        return Err(AppError::Workflow(
            "All POCs must respond before approvals can proceed".to_string(),
        ));
    }

    let role = approver
        .role
        .approver_role()
        .ok_or_else(|| AppError::Unauthorized("User cannot decide on this stage".to_string()))?;
    if role.review_stage() != event.stage {
        return Err(AppError::Unauthorized(
            "User cannot decide on this stage".to_string(),
        ));
    }

    let remark = remark.map(str::trim).filter(|r| !r.is_empty());
    if !approve && remark.is_none() {
        return Err(AppError::Validation(
            "Rejections require a remark".to_string(),
        ));
    }

    let status = if approve {
        DecisionStatus::Approved
    } else {
        DecisionStatus::Rejected
    };
    let slot = event.decision_mut(role);
    slot.status = status;
    slot.remark = remark.map(str::to_string);

    event.stage = if approve {
        role.stage_after_approval()
    } else {
        EventStage::Rejected
    };
    event.touch_updated_at();

    let mut dispatches = vec![Dispatch::to_user(
        event.student_id,
        Notification::DecisionRecorded {
            event_id: event.id,
            event_title: event.title.clone(),
            role,
            status,
            remark: event.decision(role).remark.clone(),
            stage: event.stage,
        },
    )];
    if let Some(next_role) = event.stage.reviewing_role() {
        dispatches.push(Dispatch::to_role(
            next_role.user_role(),
            Notification::AwaitingApproval {
                event_id: event.id,
                event_title: event.title.clone(),
                stage: event.stage,
            },
        ));
    }

    Ok(DecisionOutcome {
        applied: true,
        stage: event.stage,
        dispatches,
    })
}
