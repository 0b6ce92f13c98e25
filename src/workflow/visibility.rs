//! Read-access policy for events.
//!
//! Consulted by the boundary layer before returning an event to a
//! caller. A reviewer gains visibility once the event reaches their
//! checkpoint and keeps it after acting, regardless of later stage
//! movement; owners, POCs, and administrative accounts always see the
//! event.

use crate::error::{AppError, AppResult};
use crate::models::{Event, User, UserRole};

/// Whether `user` may read `event`
pub fn can_view(user: &User, event: &Event) -> bool {
    if user.role.is_administrative() {
        return true;
    }

    if user.role == UserRole::Student && event.student_id == user.id {
        return true;
    }

    if event.has_poc(user.id) {
        return true;
    }

    if let Some(role) = user.role.approver_role() {
        // Visible once the reviewer has acted, or once the event has
        // reached or passed their checkpoint
        return !event.decision(role).is_pending()
            || event.stage.rank() >= role.review_stage().rank();
    }

    false
}

/// Enforce `can_view`, surfacing `Unauthorized` on failure
pub fn require_view(user: &User, event: &Event) -> AppResult<()> {
    if can_view(user, event) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "User cannot view this event".to_string(),
        ))
    }
}
