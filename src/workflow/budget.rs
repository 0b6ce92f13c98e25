//! Budget reconciliation for a single sub-event.
//!
//! Pure: validates a head + itemized breakdown, normalizes every amount
//! to two decimals (half-up) and computes the total. The caller persists
//! the result onto the sub-event.

use crate::config::BudgetHeadPolicy;
use crate::error::{AppError, AppResult};
use crate::models::BudgetItem;
use rust_decimal::{Decimal, RoundingStrategy};

/// A validated, normalized budget ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledBudget {
    pub head: String,
    pub total: Decimal,
    pub items: Vec<BudgetItem>,
}

/// Normalize a monetary amount to 2-decimal scale, rounding half-up.
/// Amounts here are always positive, so midpoint-away-from-zero is
/// exactly half-up.
pub fn normalize_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate and normalize a budget head + breakdown.
///
/// Fails with `Validation` if the head is blank, the breakdown is empty,
/// any line lacks a description, or any amount is not strictly positive.
/// Under [`BudgetHeadPolicy::NumericCap`] the head must additionally
/// parse as a positive amount equal to the normalized breakdown sum.
pub fn reconcile(
    policy: BudgetHeadPolicy,
    head: &str,
    items: &[BudgetItem],
) -> AppResult<ReconciledBudget> {
    if head.trim().is_empty() {
        return Err(AppError::Validation(
            "Budget head is required".to_string(),
        ));
    }
    if items.is_empty() {
        return Err(AppError::Validation(
            "Please add at least one budget line item".to_string(),
        ));
    }

    let mut normalized = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;
    for item in items {
        if item.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Each budget line needs a description".to_string(),
            ));
        }
        if item.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Budget line amounts must be positive".to_string(),
            ));
        }
        let amount = normalize_amount(item.amount);
        total += amount;
        normalized.push(BudgetItem::new(item.description.trim(), amount));
    }

    if policy == BudgetHeadPolicy::NumericCap {
        let cap: Decimal = head.trim().parse().map_err(|_| {
            AppError::Validation("Budget head must be a numeric amount".to_string())
        })?;
        if cap <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Budget head must be greater than zero".to_string(),
            ));
        }
        if normalize_amount(cap) != total {
            return Err(AppError::Validation(
                "Budget breakdown must add up to the budget head total".to_string(),
            ));
        }
    }

    Ok(ReconciledBudget {
        head: head.trim().to_string(),
        total,
        items: normalized,
    })
}
