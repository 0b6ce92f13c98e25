//! Notification emission for workflow transitions.
//!
//! The workflow only decides *that* a notification is due and to whom;
//! delivery (mail, push, anything else) belongs to whoever implements
//! [`NotificationSink`]. Dispatch is fire-and-forget: a sink failure is
//! logged by the caller and never rolls back the transition that
//! triggered it.

use crate::models::{ApproverRole, DecisionStatus, EventStage, UserRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a notification is addressed to: a single user, or every holder
/// of a role (a broadcast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    User(Uuid),
    Role(UserRole),
}

/// Structured notification payloads mirroring the workflow's side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A POC accepted or declined a sub-event; addressed to the owning student
    PocDecision {
        event_id: Uuid,
        event_title: String,
        sub_event_id: Uuid,
        sub_event_name: String,
        poc_name: String,
        accepted: bool,
        stage: EventStage,
    },
    /// An approver (or an override) recorded a decision; addressed to the
    /// owning student
    DecisionRecorded {
        event_id: Uuid,
        event_title: String,
        role: ApproverRole,
        status: DecisionStatus,
        remark: Option<String>,
        stage: EventStage,
    },
    /// The event entered a review stage; broadcast to that stage's role
    AwaitingApproval {
        event_id: Uuid,
        event_title: String,
        stage: EventStage,
    },
}

/// A notification paired with its addressee, as produced by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub recipient: Recipient,
    pub notification: Notification,
}

impl Dispatch {
    pub fn to_user(user_id: Uuid, notification: Notification) -> Self {
        Self {
            recipient: Recipient::User(user_id),
            notification,
        }
    }

    pub fn to_role(role: UserRole, notification: Notification) -> Self {
        Self {
            recipient: Recipient::Role(role),
            notification,
        }
    }
}

/// Delivery collaborator. Errors are the implementation's to report; the
/// workflow neither blocks on nor inspects delivery results.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, dispatch: Dispatch) -> Result<(), String>;
}

/// Sink that records deliveries to the tracing log. Default collaborator
/// when no real delivery channel is wired in.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, dispatch: Dispatch) -> Result<(), String> {
        tracing::info!(
            recipient = ?dispatch.recipient,
            notification = ?dispatch.notification,
            "notification emitted"
        );
        Ok(())
    }
}
