use crate::config::BudgetHeadPolicy;
use crate::error::{AppError, AppResult};
use crate::models::{BudgetItem, Event, EventStage, PocStatus, SubEvent, User, UserRole};
use crate::notify::{Dispatch, Notification, NotificationSink};
use crate::services::dispatch_all;
use crate::store::{ClubDirectory, EventStore, UserDirectory};
use crate::workflow::{budget, visibility};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One sub-event in a submission or addition
#[derive(Debug, Clone)]
pub struct SubEventRequest {
    pub name: String,
    pub club_id: Uuid,
    pub poc_username: String,
    pub poc_name: String,
    pub poc_phone: String,
    pub budget_head: String,
    pub budget_items: Vec<BudgetItem>,
}

/// A student's event submission
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub sub_events: Vec<SubEventRequest>,
}

/// Maximum sub-events an event may carry
pub const MAX_SUB_EVENTS: usize = 15;

/// Service for event submission, structure changes, and reads
pub struct EventService {
    store: Arc<dyn EventStore>,
    users: Arc<dyn UserDirectory>,
    clubs: Arc<dyn ClubDirectory>,
    notifier: Arc<dyn NotificationSink>,
    budget_policy: BudgetHeadPolicy,
}

impl EventService {
    pub fn new(
        store: Arc<dyn EventStore>,
        users: Arc<dyn UserDirectory>,
        clubs: Arc<dyn ClubDirectory>,
        notifier: Arc<dyn NotificationSink>,
        budget_policy: BudgetHeadPolicy,
    ) -> Self {
        Self {
            store,
            users,
            clubs,
            notifier,
            budget_policy,
        }
    }

    /// Create a new event with its sub-events, all in POC review
    pub async fn create_event(
        &self,
        student: &User,
        request: CreateEventRequest,
    ) -> AppResult<Event> {
        info!(student = %student.username, title = %request.title, "creating event");

        if student.role != UserRole::Student {
            return Err(AppError::Unauthorized(
                "Only students can submit events".to_string(),
            ));
        }
        if request.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if request.sub_events.is_empty() {
            return Err(AppError::Validation(
                "Please add at least one sub-event".to_string(),
            ));
        }
        if request.sub_events.len() > MAX_SUB_EVENTS {
            return Err(AppError::Validation(format!(
                "A maximum of {} sub-events is allowed",
                MAX_SUB_EVENTS
            )));
        }

        let mut event = Event::new(
            student.id,
            request.title.trim().to_string(),
            request.description,
        );
        for sub_request in &request.sub_events {
            let sub_event = self.build_sub_event(event.id, student, sub_request).await?;
            event.sub_events.push(sub_event);
        }

        let created = self.store.create(event).await?;
        info!(event_id = %created.id, "created event with {} sub-events", created.sub_events.len());
        Ok(created)
    }

    /// Add a sub-event to an existing event. Only the owning student may
    /// do this, and only before the event reaches a terminal stage. The
    /// new delegate starts pending, which puts the event back into POC
    /// review if it had already advanced.
    pub async fn add_sub_event(
        &self,
        student: &User,
        event_id: Uuid,
        request: SubEventRequest,
    ) -> AppResult<Event> {
        let mut event = self.require_owned_mutable(student, event_id).await?;

        if event.sub_events.len() >= MAX_SUB_EVENTS {
            return Err(AppError::Validation(format!(
                "A maximum of {} sub-events is allowed",
                MAX_SUB_EVENTS
            )));
        }

        let sub_event = self.build_sub_event(event.id, student, &request).await?;
        event.sub_events.push(sub_event);
        if !event.all_pocs_accepted() {
            event.stage = EventStage::PocReview;
        }
        event.touch_updated_at();

        self.store.save(&event).await
    }

    /// Remove a sub-event. The set may never become empty, and removal
    /// re-evaluates POC gating: dropping the last pending delegate can
    /// advance the event into SA review.
    pub async fn remove_sub_event(
        &self,
        student: &User,
        event_id: Uuid,
        sub_event_id: Uuid,
    ) -> AppResult<Event> {
        let mut event = self.require_owned_mutable(student, event_id).await?;

        if event.sub_event(sub_event_id).is_none() {
            return Err(AppError::NotFound(format!(
                "Sub-event not found: {}",
                sub_event_id
            )));
        }
        if event.sub_events.len() <= 1 {
            return Err(AppError::Validation(
                "An event needs at least one sub-event".to_string(),
            ));
        }

        event.sub_events.retain(|se| se.id != sub_event_id);

        let mut dispatches = Vec::new();
        if event.stage == EventStage::PocReview && event.all_pocs_accepted() {
            event.stage = EventStage::SaReview;
            dispatches.push(Dispatch::to_role(
                UserRole::SaOffice,
                Notification::AwaitingApproval {
                    event_id: event.id,
                    event_title: event.title.clone(),
                    stage: event.stage,
                },
            ));
        }
        event.touch_updated_at();

        let saved = self.store.save(&event).await?;
        dispatch_all(&self.notifier, dispatches).await;
        Ok(saved)
    }

    /// Visibility-checked read of a single event
    pub async fn get_event_for(&self, viewer: &User, event_id: Uuid) -> AppResult<Event> {
        let event = self.require_event(event_id).await?;
        visibility::require_view(viewer, &event)?;
        Ok(event)
    }

    /// Whether the viewer may read the event at all
    pub async fn can_view(&self, viewer: &User, event_id: Uuid) -> AppResult<bool> {
        let event = self.require_event(event_id).await?;
        Ok(visibility::can_view(viewer, &event))
    }

    /// Events owned by a student, newest first
    pub async fn list_for_student(&self, student: &User) -> AppResult<Vec<Event>> {
        self.store.list_by_student(student.id).await
    }

    /// Every event; administrative accounts only
    pub async fn list_all(&self, actor: &User) -> AppResult<Vec<Event>> {
        if !actor.role.is_administrative() {
            return Err(AppError::Unauthorized(
                "Only administrators can list all events".to_string(),
            ));
        }
        self.store.list_all().await
    }

    async fn require_event(&self, event_id: Uuid) -> AppResult<Event> {
        self.store
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", event_id)))
    }

    async fn require_owned_mutable(&self, student: &User, event_id: Uuid) -> AppResult<Event> {
        let event = self.require_event(event_id).await?;
        if event.student_id != student.id {
            return Err(AppError::Unauthorized(
                "Only the owning student can change this event".to_string(),
            ));
        }
        if event.is_terminal() {
            return Err(AppError::Workflow(
                "Event has reached a terminal stage and can no longer change".to_string(),
            ));
        }
        Ok(event)
    }

    /// Resolve the POC and club, reconcile the proposed budget, and
    /// build the sub-event in pending state
    async fn build_sub_event(
        &self,
        event_id: Uuid,
        student: &User,
        request: &SubEventRequest,
    ) -> AppResult<SubEvent> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Sub-event name is required".to_string(),
            ));
        }

        let poc = self
            .users
            .find_by_username(&request.poc_username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("POC username not found: {}", request.poc_username))
            })?;
        if poc.role != UserRole::Student {
            return Err(AppError::Validation(
                "POC must be a student user".to_string(),
            ));
        }
        if poc.id == student.id {
            return Err(AppError::Validation(
                "POC cannot be the event creator".to_string(),
            ));
        }

        let club = self
            .clubs
            .find_by_id(request.club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club not found: {}", request.club_id)))?;

        let reconciled = budget::reconcile(
            self.budget_policy,
            &request.budget_head,
            &request.budget_items,
        )?;

        Ok(SubEvent {
            id: Uuid::new_v4(),
            event_id,
            name: request.name.trim().to_string(),
            club_id: club.id,
            club_name: club.name,
            poc_id: poc.id,
            poc_name: request.poc_name.clone(),
            poc_phone: request.poc_phone.clone(),
            poc_status: PocStatus::Pending,
            budget_head: reconciled.head,
            budget_total: reconciled.total,
            budget_breakdown: reconciled.items,
        })
    }
}
