//! Collaborator seams the workflow services are written against.
//!
//! The core is specified against an abstract transactional store rather
//! than a database: [`EventStore`] loads and saves whole event
//! aggregates, and the directories resolve the identities the workflow
//! validates against. Postgres implementations live under
//! `repositories`; the in-memory implementations here back the test
//! suite and embedded use.

pub mod memory;

use crate::error::AppResult;
use crate::models::{ApproverRole, Club, Event, EventStage, SubEvent, User, UserRole};
use async_trait::async_trait;
use uuid::Uuid;

/// Transactional store for event aggregates (event + sub-events loaded
/// and saved together).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a newly created aggregate
    async fn create(&self, event: Event) -> AppResult<Event>;

    /// Load an aggregate by id
    async fn find(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// Load the aggregate owning the given sub-event
    async fn find_by_sub_event(&self, sub_event_id: Uuid) -> AppResult<Option<Event>>;

    /// Save a mutated aggregate. The stored version must match the
    /// version the aggregate was loaded at; otherwise the write is
    /// rejected with `Conflict` and nothing is applied. The returned
    /// aggregate carries the bumped version.
    async fn save(&self, event: &Event) -> AppResult<Event>;

    /// Events owned by a student, newest first
    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Event>>;

    /// Events sitting at a stage, newest first
    async fn list_by_stage(&self, stage: EventStage) -> AppResult<Vec<Event>>;

    /// Events where the given role's decision slot is no longer pending,
    /// most recently updated first (the reviewer's history view)
    async fn list_decided_for_role(&self, role: ApproverRole) -> AppResult<Vec<Event>>;

    /// Sub-events awaiting a decision from the given POC
    async fn list_pending_poc(&self, poc_id: Uuid) -> AppResult<Vec<SubEvent>>;

    /// Every event, newest first (administrative surface)
    async fn list_all(&self) -> AppResult<Vec<Event>>;
}

/// Resolves usernames and ids to user records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>>;
}

/// Resolves club references at sub-event creation
#[async_trait]
pub trait ClubDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Club>>;
}
