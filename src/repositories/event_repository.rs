use crate::error::{AppResult, RepositoryError};
use crate::models::{
    ApproverRole, BudgetItem, Decision, DecisionStatus, Event, EventStage, PocStatus, SubEvent,
};
use crate::store::EventStore;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

/// Postgres-backed event aggregate store.
///
/// The aggregate (event row + its sub-event rows) is written inside one
/// transaction; the event row carries a version column checked on every
/// save so concurrent writers fail loudly instead of clobbering each
/// other.
pub struct EventRepository {
    pool: PgPool,
}

const EVENT_COLUMNS: &str = "id, title, description, student_id, stage, \
     sa_status, sa_remark, faculty_status, faculty_remark, dean_status, dean_remark, \
     created_at, updated_at, version";

const SUB_EVENT_COLUMNS: &str = "id, event_id, name, club_id, club_name, \
     poc_id, poc_name, poc_phone, poc_status, budget_head, budget_total, budget_breakdown";

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn event_from_row(row: &PgRow) -> Result<Event, RepositoryError> {
        let stage: String = row.try_get("stage")?;
        Ok(Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            student_id: row.try_get("student_id")?,
            stage: EventStage::from_str(&stage).map_err(RepositoryError::InvalidData)?,
            sa: Self::decision_from_row(row, "sa_status", "sa_remark")?,
            faculty: Self::decision_from_row(row, "faculty_status", "faculty_remark")?,
            dean: Self::decision_from_row(row, "dean_status", "dean_remark")?,
            sub_events: Vec::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
        })
    }

    fn decision_from_row(
        row: &PgRow,
        status_column: &str,
        remark_column: &str,
    ) -> Result<Decision, RepositoryError> {
        let status: String = row.try_get(status_column)?;
        Ok(Decision {
            status: DecisionStatus::from_str(&status).map_err(RepositoryError::InvalidData)?,
            remark: row.try_get(remark_column)?,
        })
    }

    fn sub_event_from_row(row: &PgRow) -> Result<SubEvent, RepositoryError> {
        let poc_status: String = row.try_get("poc_status")?;
        let breakdown: serde_json::Value = row.try_get("budget_breakdown")?;
        let budget_breakdown: Vec<BudgetItem> = serde_json::from_value(breakdown)
            .map_err(|e| RepositoryError::InvalidData(format!("Bad budget breakdown: {}", e)))?;
        Ok(SubEvent {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            name: row.try_get("name")?,
            club_id: row.try_get("club_id")?,
            club_name: row.try_get("club_name")?,
            poc_id: row.try_get("poc_id")?,
            poc_name: row.try_get("poc_name")?,
            poc_phone: row.try_get("poc_phone")?,
            poc_status: PocStatus::from_str(&poc_status).map_err(RepositoryError::InvalidData)?,
            budget_head: row.try_get("budget_head")?,
            budget_total: row.try_get("budget_total")?,
            budget_breakdown,
        })
    }

    async fn load_sub_events(&self, event: &mut Event) -> Result<(), RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sub_events WHERE event_id = $1 ORDER BY position",
            SUB_EVENT_COLUMNS
        ))
        .bind(event.id)
        .fetch_all(&self.pool)
        .await?;
        event.sub_events = rows
            .iter()
            .map(Self::sub_event_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    async fn load_aggregates(
        &self,
        query: &str,
        bind: Option<Uuid>,
    ) -> AppResult<Vec<Event>> {
        let mut q = sqlx::query(query);
        if let Some(id) = bind {
            q = q.bind(id);
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut event = Self::event_from_row(row)?;
            self.load_sub_events(&mut event).await?;
            events.push(event);
        }
        Ok(events)
    }

    async fn insert_sub_events(
        tx: &mut Transaction<'_, Postgres>,
        event: &Event,
    ) -> Result<(), RepositoryError> {
        for (position, sub) in event.sub_events.iter().enumerate() {
            let breakdown = serde_json::to_value(&sub.budget_breakdown)
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
            sqlx::query(
                "INSERT INTO sub_events \
                 (id, event_id, name, club_id, club_name, poc_id, poc_name, poc_phone, \
                  poc_status, budget_head, budget_total, budget_breakdown, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(sub.id)
            .bind(sub.event_id)
            .bind(&sub.name)
            .bind(sub.club_id)
            .bind(&sub.club_name)
            .bind(sub.poc_id)
            .bind(&sub.poc_name)
            .bind(&sub.poc_phone)
            .bind(sub.poc_status.as_str())
            .bind(&sub.budget_head)
            .bind(sub.budget_total)
            .bind(&breakdown)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn create(&self, event: Event) -> AppResult<Event> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        sqlx::query(
            "INSERT INTO events \
             (id, title, description, student_id, stage, sa_status, sa_remark, \
              faculty_status, faculty_remark, dean_status, dean_remark, \
              created_at, updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.student_id)
        .bind(event.stage.as_str())
        .bind(event.sa.status.as_str())
        .bind(&event.sa.remark)
        .bind(event.faculty.status.as_str())
        .bind(&event.faculty.remark)
        .bind(event.dean.status.as_str())
        .bind(&event.dean.remark)
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(event.version)
        .execute(&mut tx)
        .await
        .map_err(RepositoryError::from)?;

        Self::insert_sub_events(&mut tx, &event).await?;
        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(event)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        match row {
            Some(row) => {
                let mut event = Self::event_from_row(&row)?;
                self.load_sub_events(&mut event).await?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    async fn find_by_sub_event(&self, sub_event_id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query("SELECT event_id FROM sub_events WHERE id = $1")
            .bind(sub_event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        match row {
            Some(row) => {
                let event_id: Uuid = row.try_get("event_id").map_err(RepositoryError::from)?;
                self.find(event_id).await
            }
            None => Ok(None),
        }
    }

    async fn save(&self, event: &Event) -> AppResult<Event> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let result = sqlx::query(
            "UPDATE events SET \
             title = $3, description = $4, stage = $5, \
             sa_status = $6, sa_remark = $7, \
             faculty_status = $8, faculty_remark = $9, \
             dean_status = $10, dean_remark = $11, \
             updated_at = $12, version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(event.id)
        .bind(event.version)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.stage.as_str())
        .bind(event.sa.status.as_str())
        .bind(&event.sa.remark)
        .bind(event.faculty.status.as_str())
        .bind(&event.faculty.remark)
        .bind(event.dean.status.as_str())
        .bind(&event.dean.remark)
        .bind(event.updated_at)
        .execute(&mut tx)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::StaleAggregate(format!(
                "Event {} was modified concurrently",
                event.id
            ))
            .into());
        }

        // Sub-events are rewritten wholesale with the aggregate
        sqlx::query("DELETE FROM sub_events WHERE event_id = $1")
            .bind(event.id)
            .execute(&mut tx)
            .await
            .map_err(RepositoryError::from)?;
        Self::insert_sub_events(&mut tx, event).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        let mut saved = event.clone();
        saved.version += 1;
        Ok(saved)
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Event>> {
        self.load_aggregates(
            &format!(
                "SELECT {} FROM events WHERE student_id = $1 ORDER BY created_at DESC",
                EVENT_COLUMNS
            ),
            Some(student_id),
        )
        .await
    }

    async fn list_by_stage(&self, stage: EventStage) -> AppResult<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM events WHERE stage = $1 ORDER BY created_at DESC",
            EVENT_COLUMNS
        ))
        .bind(stage.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut event = Self::event_from_row(row)?;
            self.load_sub_events(&mut event).await?;
            events.push(event);
        }
        Ok(events)
    }

    async fn list_decided_for_role(&self, role: ApproverRole) -> AppResult<Vec<Event>> {
        // Fixed column per role; never interpolates caller input
        let status_column = match role {
            ApproverRole::Sa => "sa_status",
            ApproverRole::Faculty => "faculty_status",
            ApproverRole::Dean => "dean_status",
        };
        self.load_aggregates(
            &format!(
                "SELECT {} FROM events WHERE {} <> 'PENDING' ORDER BY updated_at DESC",
                EVENT_COLUMNS, status_column
            ),
            None,
        )
        .await
    }

    async fn list_pending_poc(&self, poc_id: Uuid) -> AppResult<Vec<SubEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sub_events WHERE poc_id = $1 AND poc_status = 'PENDING'",
            SUB_EVENT_COLUMNS
        ))
        .bind(poc_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;
        Ok(rows
            .iter()
            .map(Self::sub_event_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_all(&self) -> AppResult<Vec<Event>> {
        self.load_aggregates(
            &format!("SELECT {} FROM events ORDER BY created_at DESC", EVENT_COLUMNS),
            None,
        )
        .await
    }
}
