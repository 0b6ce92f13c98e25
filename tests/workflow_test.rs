mod helpers;

use campus_approvals::config::BudgetHeadPolicy;
use campus_approvals::error::AppError;
use campus_approvals::models::*;
use campus_approvals::workflow::poc_gate::{self, PocDecision, POC_DECLINED_REMARK};
use campus_approvals::workflow::{override_authority, state_machine, visibility};
use helpers::*;

fn users() -> (User, User, User) {
    (
        User::new("alice", "Alice", UserRole::Student),
        User::new("bob", "Bob", UserRole::Student),
        User::new("carol", "Carol", UserRole::Student),
    )
}

fn accept() -> PocDecision {
    PocDecision {
        accept: true,
        ..Default::default()
    }
}

fn decline() -> PocDecision {
    PocDecision::default()
}

/// P1: the event stays in POC review until every POC has accepted
#[test]
fn test_stage_holds_until_all_pocs_accept() {
    let (student, poc_a, poc_b) = users();
    let mut event = bare_event(&student, &[&poc_a, &poc_b]);
    let first = event.sub_events[0].id;
    let second = event.sub_events[1].id;

    poc_gate::decide(&mut event, first, &poc_a, accept(), BudgetHeadPolicy::Label).unwrap();
    assert_eq!(event.stage, EventStage::PocReview);

    poc_gate::decide(&mut event, second, &poc_b, accept(), BudgetHeadPolicy::Label).unwrap();
    assert_eq!(event.stage, EventStage::SaReview);
}

/// P2 + scenario: one decline rejects the event outright
#[test]
fn test_decline_short_circuits_to_rejected() {
    let (student, poc_a, poc_b) = users();
    let mut event = bare_event(&student, &[&poc_a, &poc_b]);
    let first = event.sub_events[0].id;
    let second = event.sub_events[1].id;

    let dec_a = PocDecision {
        accept: true,
        budget_head: Some("Dept X".to_string()),
        budget_items: Some(vec![BudgetItem::new("Catering", dec("500.00"))]),
    };
    poc_gate::decide(&mut event, first, &poc_a, dec_a, BudgetHeadPolicy::Label).unwrap();
    poc_gate::decide(&mut event, second, &poc_b, decline(), BudgetHeadPolicy::Label).unwrap();

    assert_eq!(event.stage, EventStage::Rejected);
    assert_eq!(event.sa.status, DecisionStatus::Rejected);
    assert_eq!(event.sa.remark.as_deref(), Some(POC_DECLINED_REMARK));
    assert_eq!(event.sub_events[1].poc_status, PocStatus::Declined);
}

/// P5 + scenario: accepted budget totals the normalized line amounts
#[test]
fn test_accept_reconciles_budget_total() {
    let (student, poc_a, _) = users();
    let mut event = bare_event(&student, &[&poc_a]);
    let sub_id = event.sub_events[0].id;

    let decision = PocDecision {
        accept: true,
        budget_head: Some("Dept X".to_string()),
        budget_items: Some(vec![
            BudgetItem::new("Venue", dec("1000.00")),
            BudgetItem::new("Printing", dec("250.50")),
        ]),
    };
    poc_gate::decide(&mut event, sub_id, &poc_a, decision, BudgetHeadPolicy::Label).unwrap();

    let sub = event.sub_event(sub_id).unwrap();
    assert_eq!(sub.budget_total, dec("1250.50"));
    assert_eq!(sub.poc_status, PocStatus::Accepted);
    // Single sub-event accepted, so review starts
    assert_eq!(event.stage, EventStage::SaReview);
}

/// Budget reordering does not change the total
#[test]
fn test_budget_total_is_order_independent() {
    let items = vec![
        BudgetItem::new("Venue", dec("999.99")),
        BudgetItem::new("Printing", dec("0.015")),
        BudgetItem::new("Catering", dec("500.00")),
    ];
    let forward =
        campus_approvals::workflow::reconcile(BudgetHeadPolicy::Label, "Dept X", &items).unwrap();
    let mut reversed = items.clone();
    reversed.reverse();
    let backward =
        campus_approvals::workflow::reconcile(BudgetHeadPolicy::Label, "Dept X", &reversed)
            .unwrap();
    assert_eq!(forward.total, backward.total);
}

/// P6: a second POC decision is a no-op returning the first result
#[test]
fn test_poc_decision_is_idempotent() {
    let (student, poc_a, _) = users();
    let mut event = bare_event(&student, &[&poc_a]);
    let sub_id = event.sub_events[0].id;

    let first = poc_gate::decide(&mut event, sub_id, &poc_a, accept(), BudgetHeadPolicy::Label)
        .unwrap();
    assert!(first.applied);
    assert_eq!(first.poc_status, PocStatus::Accepted);

    let second = poc_gate::decide(&mut event, sub_id, &poc_a, decline(), BudgetHeadPolicy::Label)
        .unwrap();
    assert!(!second.applied);
    assert_eq!(second.poc_status, PocStatus::Accepted);
    assert!(second.dispatches.is_empty());
    assert_eq!(event.stage, EventStage::SaReview);
}

/// Only the resolved POC may decide on a sub-event
#[test]
fn test_poc_decision_requires_the_resolved_poc() {
    let (student, poc_a, poc_b) = users();
    let mut event = bare_event(&student, &[&poc_a]);
    let sub_id = event.sub_events[0].id;

    let err = poc_gate::decide(&mut event, sub_id, &poc_b, accept(), BudgetHeadPolicy::Label)
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(event.sub_events[0].poc_status, PocStatus::Pending);
}

fn reviewed_event() -> Event {
    let (student, poc_a, _) = users();
    let mut event = bare_event(&student, &[&poc_a]);
    let sub_id = event.sub_events[0].id;
    poc_gate::decide(
        &mut event,
        sub_id,
        &poc_a,
        PocDecision {
            accept: true,
            ..Default::default()
        },
        BudgetHeadPolicy::Label,
    )
    .unwrap();
    event
}

fn approver(role: UserRole) -> User {
    User::new("approver", "Approver", role)
}

/// P3: approvals walk the stage sequence; a reject jumps to REJECTED
#[test]
fn test_sequential_approval_chain() {
    let mut event = reviewed_event();
    assert_eq!(event.stage, EventStage::SaReview);

    state_machine::decide(&mut event, &approver(UserRole::SaOffice), true, None).unwrap();
    assert_eq!(event.stage, EventStage::FacultyReview);
    assert_eq!(event.sa.status, DecisionStatus::Approved);

    state_machine::decide(&mut event, &approver(UserRole::FacultyCoordinator), true, None)
        .unwrap();
    assert_eq!(event.stage, EventStage::DeanReview);

    // Scenario: dean approves with no remark
    let outcome =
        state_machine::decide(&mut event, &approver(UserRole::Dean), true, None).unwrap();
    assert!(outcome.applied);
    assert_eq!(event.stage, EventStage::Approved);
    assert_eq!(event.dean.status, DecisionStatus::Approved);
}

/// Scenario: SA rejects with a remark; later slots stay pending
#[test]
fn test_reject_leaves_later_slots_pending() {
    let mut event = reviewed_event();

    state_machine::decide(
        &mut event,
        &approver(UserRole::SaOffice),
        false,
        Some("Over budget"),
    )
    .unwrap();

    assert_eq!(event.stage, EventStage::Rejected);
    assert_eq!(event.sa.status, DecisionStatus::Rejected);
    assert_eq!(event.sa.remark.as_deref(), Some("Over budget"));
    assert_eq!(event.faculty.status, DecisionStatus::Pending);
    assert_eq!(event.dean.status, DecisionStatus::Pending);
}

/// P4: rejecting without a remark fails validation
#[test]
fn test_reject_requires_remark() {
    let mut event = reviewed_event();

    let err = state_machine::decide(&mut event, &approver(UserRole::SaOffice), false, Some("  "))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(event.stage, EventStage::SaReview);

    // Non-blank remark succeeds given the correct stage/role
    state_machine::decide(
        &mut event,
        &approver(UserRole::SaOffice),
        false,
        Some("Over budget"),
    )
    .unwrap();
    assert_eq!(event.stage, EventStage::Rejected);
}

/// Decisions cannot precede full POC acceptance
#[test]
fn test_decide_during_poc_review_is_a_workflow_error() {
    let (student, poc_a, _) = users();
    let mut event = bare_event(&student, &[&poc_a]);

    let err = state_machine::decide(&mut event, &approver(UserRole::SaOffice), true, None)
        .unwrap_err();
    assert!(matches!(err, AppError::Workflow(_)));
}

/// A role deciding outside its own review stage is rejected
#[test]
fn test_wrong_role_for_stage_is_unauthorized() {
    let mut event = reviewed_event();

    let err =
        state_machine::decide(&mut event, &approver(UserRole::Dean), true, None).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(event.stage, EventStage::SaReview);
}

/// Decisions after a terminal stage are silently ignored, not errors
#[test]
fn test_terminal_redecision_is_a_tolerated_noop() {
    let mut event = reviewed_event();
    state_machine::decide(
        &mut event,
        &approver(UserRole::SaOffice),
        false,
        Some("Over budget"),
    )
    .unwrap();
    assert_eq!(event.stage, EventStage::Rejected);

    let outcome =
        state_machine::decide(&mut event, &approver(UserRole::SaOffice), true, None).unwrap();
    assert!(!outcome.applied);
    assert!(outcome.dispatches.is_empty());
    assert_eq!(event.stage, EventStage::Rejected);
    assert_eq!(event.sa.status, DecisionStatus::Rejected);
}

/// P7: the recomputed stage follows the first non-approved slot, over
/// every combination of the three decision slots
#[test]
fn test_override_recomputation_over_all_slot_combinations() {
    let statuses = [
        DecisionStatus::Pending,
        DecisionStatus::Approved,
        DecisionStatus::Rejected,
    ];
    let (student, poc_a, _) = users();

    for sa in statuses {
        for faculty in statuses {
            for dean in statuses {
                let mut event = bare_event(&student, &[&poc_a]);
                event.sa.status = sa;
                event.faculty.status = faculty;
                event.dean.status = dean;

                let expected = match (sa, faculty, dean) {
                    (DecisionStatus::Rejected, _, _) => EventStage::Rejected,
                    (DecisionStatus::Pending, _, _) => EventStage::SaReview,
                    (_, DecisionStatus::Rejected, _) => EventStage::Rejected,
                    (_, DecisionStatus::Pending, _) => EventStage::FacultyReview,
                    (_, _, DecisionStatus::Rejected) => EventStage::Rejected,
                    (_, _, DecisionStatus::Pending) => EventStage::DeanReview,
                    _ => EventStage::Approved,
                };
                assert_eq!(
                    override_authority::recompute_stage(&event),
                    expected,
                    "sa={:?} faculty={:?} dean={:?}",
                    sa,
                    faculty,
                    dean
                );
            }
        }
    }
}

/// An override can move the stage backward, which the normal path never does
#[test]
fn test_override_moves_stage_backward() {
    let mut event = reviewed_event();
    state_machine::decide(&mut event, &approver(UserRole::SaOffice), true, None).unwrap();
    assert_eq!(event.stage, EventStage::FacultyReview);

    let outcome = override_authority::apply(
        &mut event,
        ApproverRole::Sa,
        DecisionStatus::Pending,
        None,
    )
    .unwrap();
    assert_eq!(outcome.stage, EventStage::SaReview);
    assert_eq!(event.stage, EventStage::SaReview);
}

/// Override rejections need a remark like any other rejection
#[test]
fn test_override_reject_requires_remark() {
    let mut event = reviewed_event();
    let err = override_authority::apply(
        &mut event,
        ApproverRole::Dean,
        DecisionStatus::Rejected,
        Some(""),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    override_authority::apply(
        &mut event,
        ApproverRole::Dean,
        DecisionStatus::Rejected,
        Some("Withdrawn"),
    )
    .unwrap();
    assert_eq!(event.stage, EventStage::Rejected);
}

#[test]
fn test_visibility_matrix() {
    let (student, poc_a, other) = users();
    let mut event = bare_event(&student, &[&poc_a]);

    let admin = User::new("admin", "Admin", UserRole::Admin);
    let dev = User::new("dev", "Dev", UserRole::Dev);
    let sa = approver(UserRole::SaOffice);
    let faculty = approver(UserRole::FacultyCoordinator);
    let dean = approver(UserRole::Dean);

    // During POC review only the owner, the POC, and admins see it
    assert!(visibility::can_view(&admin, &event));
    assert!(visibility::can_view(&dev, &event));
    assert!(visibility::can_view(&student, &event));
    assert!(visibility::can_view(&poc_a, &event));
    assert!(!visibility::can_view(&other, &event));
    assert!(!visibility::can_view(&sa, &event));
    assert!(!visibility::can_view(&faculty, &event));
    assert!(!visibility::can_view(&dean, &event));

    // At SA review the SA office gains visibility; later stages wait
    event.stage = EventStage::SaReview;
    assert!(visibility::can_view(&sa, &event));
    assert!(!visibility::can_view(&faculty, &event));

    // Once past their checkpoint, reviewers who acted keep visibility
    event.stage = EventStage::FacultyReview;
    event.sa.status = DecisionStatus::Approved;
    assert!(visibility::can_view(&sa, &event));
    assert!(visibility::can_view(&faculty, &event));
    assert!(!visibility::can_view(&dean, &event));

    // A recorded decision grants visibility regardless of stage
    let mut early = bare_event(&student, &[&poc_a]);
    early.dean.status = DecisionStatus::Approved;
    assert!(visibility::can_view(&dean, &early));

    // Terminal stages sit at or past every checkpoint
    event.stage = EventStage::Rejected;
    assert!(visibility::can_view(&dean, &event));
}

#[test]
fn test_require_view_surfaces_unauthorized() {
    let (student, poc_a, other) = users();
    let event = bare_event(&student, &[&poc_a]);
    let err = visibility::require_view(&other, &event).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

/// Stage rank table is the ordering contract
#[test]
fn test_stage_rank_ordering() {
    let order = [
        EventStage::PocReview,
        EventStage::SaReview,
        EventStage::FacultyReview,
        EventStage::DeanReview,
        EventStage::Approved,
    ];
    for pair in order.windows(2) {
        assert!(pair[0].rank() < pair[1].rank());
    }
    assert!(EventStage::Approved.is_terminal());
    assert!(EventStage::Rejected.is_terminal());
    assert!(!EventStage::DeanReview.is_terminal());
}

#[test]
fn test_stage_string_round_trip() {
    for stage in [
        EventStage::PocReview,
        EventStage::SaReview,
        EventStage::FacultyReview,
        EventStage::DeanReview,
        EventStage::Approved,
        EventStage::Rejected,
    ] {
        assert_eq!(EventStage::from_str(stage.as_str()).unwrap(), stage);
    }
    assert!(EventStage::from_str("LIMBO").is_err());
}
