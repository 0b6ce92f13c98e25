use crate::models::sub_event::{PocStatus, SubEvent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position of an event in the fixed review sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStage {
    PocReview,
    SaReview,
    FacultyReview,
    DeanReview,
    Approved,
    Rejected,
}

impl EventStage {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "POC_REVIEW" => Ok(EventStage::PocReview),
            "SA_REVIEW" => Ok(EventStage::SaReview),
            "FACULTY_REVIEW" => Ok(EventStage::FacultyReview),
            "DEAN_REVIEW" => Ok(EventStage::DeanReview),
            "APPROVED" => Ok(EventStage::Approved),
            "REJECTED" => Ok(EventStage::Rejected),
            _ => Err(format!("Invalid stage: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStage::PocReview => "POC_REVIEW",
            EventStage::SaReview => "SA_REVIEW",
            EventStage::FacultyReview => "FACULTY_REVIEW",
            EventStage::DeanReview => "DEAN_REVIEW",
            EventStage::Approved => "APPROVED",
            EventStage::Rejected => "REJECTED",
        }
    }

    /// Explicit position in the review sequence. Visibility and
    /// "already passed this checkpoint" comparisons go through this
    /// table rather than enum declaration order, so reordering variants
    /// cannot silently change workflow behavior.
    pub fn rank(&self) -> u8 {
        match self {
            EventStage::PocReview => 0,
            EventStage::SaReview => 1,
            EventStage::FacultyReview => 2,
            EventStage::DeanReview => 3,
            EventStage::Approved => 4,
            EventStage::Rejected => 5,
        }
    }

    /// Terminal stages accept no further decisions
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStage::Approved | EventStage::Rejected)
    }

    /// Whether this stage is one of the three institutional review stages
    pub fn is_review(&self) -> bool {
        matches!(
            self,
            EventStage::SaReview | EventStage::FacultyReview | EventStage::DeanReview
        )
    }

    /// The approver role that reviews at this stage, if any
    pub fn reviewing_role(&self) -> Option<ApproverRole> {
        match self {
            EventStage::SaReview => Some(ApproverRole::Sa),
            EventStage::FacultyReview => Some(ApproverRole::Faculty),
            EventStage::DeanReview => Some(ApproverRole::Dean),
            _ => None,
        }
    }
}

/// One role's decision on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
}

impl DecisionStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(DecisionStatus::Pending),
            "APPROVED" => Ok(DecisionStatus::Approved),
            "REJECTED" => Ok(DecisionStatus::Rejected),
            _ => Err(format!("Invalid decision status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Pending => "PENDING",
            DecisionStatus::Approved => "APPROVED",
            DecisionStatus::Rejected => "REJECTED",
        }
    }
}

/// The three approver roles that own decision slots, in review order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
    Sa,
    Faculty,
    Dean,
}

impl ApproverRole {
    /// All approver roles in fixed review order. Override recomputation
    /// and stage advancement scan in exactly this order.
    pub const IN_ORDER: [ApproverRole; 3] =
        [ApproverRole::Sa, ApproverRole::Faculty, ApproverRole::Dean];

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "SA" => Ok(ApproverRole::Sa),
            "FACULTY" => Ok(ApproverRole::Faculty),
            "DEAN" => Ok(ApproverRole::Dean),
            _ => Err(format!("Unknown approver target: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverRole::Sa => "SA",
            ApproverRole::Faculty => "FACULTY",
            ApproverRole::Dean => "DEAN",
        }
    }

    /// The event stage at which this role reviews
    pub fn review_stage(&self) -> EventStage {
        match self {
            ApproverRole::Sa => EventStage::SaReview,
            ApproverRole::Faculty => EventStage::FacultyReview,
            ApproverRole::Dean => EventStage::DeanReview,
        }
    }

    /// The stage a successful approval advances the event to
    pub fn stage_after_approval(&self) -> EventStage {
        match self {
            ApproverRole::Sa => EventStage::FacultyReview,
            ApproverRole::Faculty => EventStage::DeanReview,
            ApproverRole::Dean => EventStage::Approved,
        }
    }

    /// The user role that holds this decision slot
    pub fn user_role(&self) -> crate::models::UserRole {
        match self {
            ApproverRole::Sa => crate::models::UserRole::SaOffice,
            ApproverRole::Faculty => crate::models::UserRole::FacultyCoordinator,
            ApproverRole::Dean => crate::models::UserRole::Dean,
        }
    }
}

/// One role's `{status, remark}` pair on an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: DecisionStatus,
    pub remark: Option<String>,
}

impl Decision {
    pub fn pending() -> Self {
        Self {
            status: DecisionStatus::Pending,
            remark: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DecisionStatus::Pending
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::pending()
    }
}

/// A student's event submission: the aggregate root of the approval
/// workflow. Sub-events are loaded and saved together with the event;
/// `version` guards against concurrent writers clobbering each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub student_id: Uuid,
    pub stage: EventStage,
    pub sa: Decision,
    pub faculty: Decision,
    pub dean: Decision,
    pub sub_events: Vec<SubEvent>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub version: i64,
}

impl Event {
    /// Create a new Event in POC review with all decision slots pending
    pub fn new(student_id: Uuid, title: String, description: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            student_id,
            stage: EventStage::PocReview,
            sa: Decision::pending(),
            faculty: Decision::pending(),
            dean: Decision::pending(),
            sub_events: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// The decision slot owned by the given approver role
    pub fn decision(&self, role: ApproverRole) -> &Decision {
        match role {
            ApproverRole::Sa => &self.sa,
            ApproverRole::Faculty => &self.faculty,
            ApproverRole::Dean => &self.dean,
        }
    }

    pub fn decision_mut(&mut self, role: ApproverRole) -> &mut Decision {
        match role {
            ApproverRole::Sa => &mut self.sa,
            ApproverRole::Faculty => &mut self.faculty,
            ApproverRole::Dean => &mut self.dean,
        }
    }

    pub fn sub_event(&self, sub_event_id: Uuid) -> Option<&SubEvent> {
        self.sub_events.iter().find(|se| se.id == sub_event_id)
    }

    pub fn sub_event_mut(&mut self, sub_event_id: Uuid) -> Option<&mut SubEvent> {
        self.sub_events.iter_mut().find(|se| se.id == sub_event_id)
    }

    /// True once every sub-event's POC has accepted
    pub fn all_pocs_accepted(&self) -> bool {
        self.sub_events
            .iter()
            .all(|se| se.poc_status == PocStatus::Accepted)
    }

    /// Whether the given user is the resolved POC of any sub-event
    pub fn has_poc(&self, user_id: Uuid) -> bool {
        self.sub_events.iter().any(|se| se.poc_id == user_id)
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn touch_updated_at(&mut self) {
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}
