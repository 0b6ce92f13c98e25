use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POC acceptance state for a sub-event. Set exactly once; leaving
/// `Pending` is terminal for the sub-workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PocStatus {
    Pending,
    Accepted,
    Declined,
}

impl PocStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(PocStatus::Pending),
            "ACCEPTED" => Ok(PocStatus::Accepted),
            "DECLINED" => Ok(PocStatus::Declined),
            _ => Err(format!("Invalid POC status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PocStatus::Pending => "PENDING",
            PocStatus::Accepted => "ACCEPTED",
            PocStatus::Declined => "DECLINED",
        }
    }
}

/// One line of an itemized budget breakdown.
///
/// The persisted form is a JSON array of these objects; the amount
/// serializes as a string and deserializes from either a string or a
/// number, which keeps stored breakdowns from older datasets readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub description: String,
    pub amount: Decimal,
}

impl BudgetItem {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// A delegated portion of an event, assigned to a POC and carrying its
/// own budget. Lifetime is bound to the owning event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub club_id: Uuid,
    pub club_name: String,
    /// Resolved POC account; the only user who may accept or decline
    pub poc_id: Uuid,
    /// Free-text contact labels, independent of the resolved account
    pub poc_name: String,
    pub poc_phone: String,
    pub poc_status: PocStatus,
    /// Sanctioning-authority label for the budget
    pub budget_head: String,
    /// Sum of the normalized breakdown amounts, 2-decimal scale
    pub budget_total: Decimal,
    pub budget_breakdown: Vec<BudgetItem>,
}

impl SubEvent {
    pub fn is_pending(&self) -> bool {
        self.poc_status == PocStatus::Pending
    }
}
