//! Approval and budget workflow engine for student event submissions.
//!
//! An event carries 1..=15 delegated sub-events, each assigned to a POC
//! who must accept or decline responsibility (and budget) before
//! institutional review starts. Review then runs through a fixed stage
//! sequence (SA office, faculty coordinator, dean) with per-role
//! decision slots, plus an administrative override path that can set any
//! slot and force-recompute the stage.
//!
//! The workflow core (`workflow`) is pure over the in-memory `Event`
//! aggregate; `services` wraps each operation in one transactional
//! round trip against an abstract `EventStore`, with Postgres
//! (`repositories`) and in-memory (`store::memory`) implementations.
//! Transport, sessions, and notification delivery stay outside.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod notify;
pub mod repositories;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod workflow;

// Re-export commonly used types
pub use config::{AppConfig, BudgetHeadPolicy};
pub use error::{AppError, AppResult};

use database::Database;
use notify::{NotificationSink, TracingSink};
use repositories::{ClubRepository, EventRepository, UserRepository};
use services::{ApprovalService, EventService, PocService};
use std::sync::Arc;
use store::{ClubDirectory, EventStore, UserDirectory};

/// Application state wiring the Postgres repositories into the services
pub struct AppState {
    pub database: Database,
    pub event_store: Arc<dyn EventStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub club_directory: Arc<dyn ClubDirectory>,
    pub notifier: Arc<dyn NotificationSink>,
    pub event_service: Arc<EventService>,
    pub poc_service: Arc<PocService>,
    pub approval_service: Arc<ApprovalService>,
}

impl AppState {
    /// Create a new AppState over the given pool, logging notifications
    /// through the tracing sink
    pub fn new(pool: sqlx::PgPool, config: &AppConfig) -> Self {
        Self::with_notifier(pool, config, Arc::new(TracingSink))
    }

    /// Create a new AppState with a custom notification sink
    pub fn with_notifier(
        pool: sqlx::PgPool,
        config: &AppConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let database = Database::new(pool.clone());
        let event_store: Arc<dyn EventStore> = Arc::new(EventRepository::new(pool.clone()));
        let user_directory: Arc<dyn UserDirectory> = Arc::new(UserRepository::new(pool.clone()));
        let club_directory: Arc<dyn ClubDirectory> = Arc::new(ClubRepository::new(pool));

        let event_service = Arc::new(EventService::new(
            event_store.clone(),
            user_directory.clone(),
            club_directory.clone(),
            notifier.clone(),
            config.budget_head_policy,
        ));
        let poc_service = Arc::new(PocService::new(
            event_store.clone(),
            notifier.clone(),
            config.budget_head_policy,
        ));
        let approval_service = Arc::new(ApprovalService::new(
            event_store.clone(),
            notifier.clone(),
        ));

        Self {
            database,
            event_store,
            user_directory,
            club_directory,
            notifier,
            event_service,
            poc_service,
            approval_service,
        }
    }
}
