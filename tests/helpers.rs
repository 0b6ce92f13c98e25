#![allow(dead_code)]

use async_trait::async_trait;
use campus_approvals::config::BudgetHeadPolicy;
use campus_approvals::models::*;
use campus_approvals::notify::{Dispatch, NotificationSink};
use campus_approvals::services::*;
use campus_approvals::store::memory::{InMemoryDirectory, InMemoryEventStore};
use campus_approvals::store::{ClubDirectory, EventStore, UserDirectory};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Notification sink that records every dispatch for assertions
#[derive(Default)]
pub struct RecordingSink {
    pub dispatches: Mutex<Vec<Dispatch>>,
}

impl RecordingSink {
    pub async fn recorded(&self) -> Vec<Dispatch> {
        self.dispatches.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.dispatches.lock().await.clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, dispatch: Dispatch) -> Result<(), String> {
        self.dispatches.lock().await.push(dispatch);
        Ok(())
    }
}

/// Wired-up services over the in-memory store, with one user per role
pub struct TestEnv {
    pub store: Arc<InMemoryEventStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub sink: Arc<RecordingSink>,
    pub events: EventService,
    pub pocs: PocService,
    pub approvals: ApprovalService,
    pub student: User,
    pub poc_a: User,
    pub poc_b: User,
    pub sa: User,
    pub faculty: User,
    pub dean: User,
    pub admin: User,
    pub club: Club,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_policy(BudgetHeadPolicy::Label).await
    }

    pub async fn with_policy(policy: BudgetHeadPolicy) -> Self {
        let store = Arc::new(InMemoryEventStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let sink = Arc::new(RecordingSink::default());

        let student = directory
            .add_user(User::new("alice", "Alice", UserRole::Student))
            .await;
        let poc_a = directory
            .add_user(User::new("bob", "Bob", UserRole::Student))
            .await;
        let poc_b = directory
            .add_user(User::new("carol", "Carol", UserRole::Student))
            .await;
        let sa = directory
            .add_user(User::new("sa", "SA Office", UserRole::SaOffice))
            .await;
        let faculty = directory
            .add_user(User::new("faculty", "Faculty Coordinator", UserRole::FacultyCoordinator))
            .await;
        let dean = directory
            .add_user(User::new("dean", "Dean", UserRole::Dean))
            .await;
        let admin = directory
            .add_user(User::new("admin", "Admin", UserRole::Admin))
            .await;
        let club = directory.add_club(Club::new("Robotics Club")).await;

        let store_dyn: Arc<dyn EventStore> = store.clone();
        let users_dyn: Arc<dyn UserDirectory> = directory.clone();
        let clubs_dyn: Arc<dyn ClubDirectory> = directory.clone();
        let sink_dyn: Arc<dyn NotificationSink> = sink.clone();

        let events = EventService::new(
            store_dyn.clone(),
            users_dyn,
            clubs_dyn,
            sink_dyn.clone(),
            policy,
        );
        let pocs = PocService::new(store_dyn.clone(), sink_dyn.clone(), policy);
        let approvals = ApprovalService::new(store_dyn, sink_dyn);

        Self {
            store,
            directory,
            sink,
            events,
            pocs,
            approvals,
            student,
            poc_a,
            poc_b,
            sa,
            faculty,
            dean,
            admin,
            club,
        }
    }

    /// Submit an event with one sub-event per listed POC
    pub async fn submit(&self, pocs: &[&User]) -> Event {
        let sub_events = pocs
            .iter()
            .enumerate()
            .map(|(i, poc)| self.sub_request(poc, &format!("Session {}", i + 1)))
            .collect();
        self.events
            .create_event(
                &self.student,
                CreateEventRequest {
                    title: "Tech Fest".to_string(),
                    description: "Annual technical festival".to_string(),
                    sub_events,
                },
            )
            .await
            .expect("event creation failed")
    }

    pub fn sub_request(&self, poc: &User, name: &str) -> SubEventRequest {
        SubEventRequest {
            name: name.to_string(),
            club_id: self.club.id,
            poc_username: poc.username.clone(),
            poc_name: poc.display_name.clone(),
            poc_phone: "9999999999".to_string(),
            budget_head: "Dept X".to_string(),
            budget_items: vec![BudgetItem::new("Catering", dec("500.00"))],
        }
    }

    /// Accept every sub-event as its POC, moving the event to SA review
    pub async fn accept_all(&self, event: &Event, pocs: &[&User]) {
        for (sub, poc) in event.sub_events.iter().zip(pocs) {
            self.pocs
                .decide(poc, sub.id, PocDecisionRequest { accept: true, ..Default::default() })
                .await
                .expect("POC accept failed");
        }
    }

    pub async fn reload(&self, event: &Event) -> Event {
        self.store
            .find(event.id)
            .await
            .unwrap()
            .expect("event missing")
    }
}

/// Build an in-memory aggregate directly, bypassing the services, for
/// pure workflow tests
pub fn bare_event(student: &User, pocs: &[&User]) -> Event {
    let mut event = Event::new(
        student.id,
        "Tech Fest".to_string(),
        "Annual technical festival".to_string(),
    );
    for (i, poc) in pocs.iter().enumerate() {
        event.sub_events.push(bare_sub_event(&event, poc, &format!("Session {}", i + 1)));
    }
    event
}

pub fn bare_sub_event(event: &Event, poc: &User, name: &str) -> SubEvent {
    SubEvent {
        id: uuid::Uuid::new_v4(),
        event_id: event.id,
        name: name.to_string(),
        club_id: uuid::Uuid::new_v4(),
        club_name: "Robotics Club".to_string(),
        poc_id: poc.id,
        poc_name: poc.display_name.clone(),
        poc_phone: "9999999999".to_string(),
        poc_status: PocStatus::Pending,
        budget_head: "Dept X".to_string(),
        budget_total: dec("500.00"),
        budget_breakdown: vec![BudgetItem::new("Catering", dec("500.00"))],
    }
}
