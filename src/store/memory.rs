//! In-memory store and directory implementations.
//!
//! Back the hermetic test suite and small embedded deployments. A single
//! `RwLock` over the aggregate map serializes writers per store, and
//! `save` enforces the same version check as the Postgres repository, so
//! concurrency behavior matches what tests assert against production.

use crate::error::{AppError, AppResult};
use crate::models::{ApproverRole, Club, Event, EventStage, PocStatus, SubEvent, User, UserRole};
use crate::store::{ClubDirectory, EventStore, UserDirectory};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory event aggregate store
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: Event) -> AppResult<Event> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(AppError::Conflict(format!(
                "Event already exists: {}",
                event.id
            )));
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn find_by_sub_event(&self, sub_event_id: Uuid) -> AppResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .find(|e| e.sub_events.iter().any(|se| se.id == sub_event_id))
            .cloned())
    }

    async fn save(&self, event: &Event) -> AppResult<Event> {
        let mut events = self.events.write().await;
        let stored = events
            .get(&event.id)
            .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", event.id)))?;
        if stored.version != event.version {
            return Err(AppError::Conflict(format!(
                "Event {} was modified concurrently",
                event.id
            )));
        }
        let mut saved = event.clone();
        saved.version += 1;
        events.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(newest_first(
            events
                .values()
                .filter(|e| e.student_id == student_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_stage(&self, stage: EventStage) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(newest_first(
            events
                .values()
                .filter(|e| e.stage == stage)
                .cloned()
                .collect(),
        ))
    }

    async fn list_decided_for_role(&self, role: ApproverRole) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut decided: Vec<Event> = events
            .values()
            .filter(|e| !e.decision(role).is_pending())
            .cloned()
            .collect();
        decided.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(decided)
    }

    async fn list_pending_poc(&self, poc_id: Uuid) -> AppResult<Vec<SubEvent>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .flat_map(|e| e.sub_events.iter())
            .filter(|se| se.poc_id == poc_id && se.poc_status == PocStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(newest_first(events.values().cloned().collect()))
    }
}

/// In-memory user and club directory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, User>>,
    clubs: RwLock<HashMap<Uuid, Club>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) -> User {
        self.users.write().await.insert(user.id, user.clone());
        user
    }

    pub async fn add_club(&self, club: Club) -> Club {
        self.clubs.write().await.insert(club.id, club.clone());
        club
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClubDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Club>> {
        Ok(self.clubs.read().await.get(&id).cloned())
    }
}
