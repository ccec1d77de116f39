use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::schedule::{Schedule, ScheduleCounter};
use crate::schedules::store::{ScheduleCounterStore, ScheduleStore};

/// PostgreSQL-backed schedule store.
pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        PgScheduleStore { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn get_by_id(&self, schedule_id: i32) -> Result<Option<Schedule>, AppError> {
        Ok(
            sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
                .bind(schedule_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_by_event(&self, event_id: i32) -> Result<Vec<Schedule>, AppError> {
        Ok(sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE event_id = $1 AND is_active = TRUE ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update(&self, schedule: &Schedule) -> Result<Schedule, AppError> {
        Ok(sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules
            SET name = $2, event_id = $3, limit_count = $4, is_active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(schedule.id)
        .bind(&schedule.name)
        .bind(schedule.event_id)
        .bind(schedule.limit_count)
        .bind(schedule.is_active)
        .fetch_one(&self.pool)
        .await?)
    }
}

/// PostgreSQL-backed counter view. The `schedule_counters` table is kept
/// current by a trigger on `registrations`; this store never writes it.
pub struct PgScheduleCounterStore {
    pool: PgPool,
}

impl PgScheduleCounterStore {
    pub fn new(pool: PgPool) -> Self {
        PgScheduleCounterStore { pool }
    }
}

#[async_trait]
impl ScheduleCounterStore for PgScheduleCounterStore {
    async fn get_count(&self, schedule_id: i32) -> Result<Option<ScheduleCounter>, AppError> {
        Ok(sqlx::query_as::<_, ScheduleCounter>(
            "SELECT schedule_id, count FROM schedule_counters WHERE schedule_id = $1",
        )
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
