use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::page::PageRequest;
use crate::models::registration::{
    NewRegistration, Registration, RegistrationFilter, RegistrationPageItem,
};
use crate::registrations::store::RegistrationStore;

/// PostgreSQL-backed registration store.
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        PgRegistrationStore { pool }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn find_by_subject_and_event(
        &self,
        subject_id: Uuid,
        event_id: i32,
    ) -> Result<Option<Registration>, AppError> {
        Ok(sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE subject_id = $1 AND event_id = $2",
        )
        .bind(subject_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create(&self, new: &NewRegistration) -> Result<Option<Registration>, AppError> {
        Ok(sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations
                (subject_id, schedule_id, event_id, address_detail, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.subject_id)
        .bind(new.schedule_id)
        .bind(new.event_id)
        .bind(&new.address_detail)
        .bind(new.created_at)
        .bind(&new.created_by)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_page(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> Result<(Vec<RegistrationPageItem>, i64), AppError> {
        let page = page.normalized();

        // A NULL filter bind matches every row; LIMIT NULL lists everything.
        let items = sqlx::query_as::<_, RegistrationPageItem>(
            r#"
            SELECT
                r.id,
                r.subject_id,
                r.schedule_id,
                s.name AS schedule_name,
                r.event_id,
                r.address_detail,
                r.created_at,
                r.created_by
            FROM registrations r
            INNER JOIN schedules s ON r.schedule_id = s.id
            WHERE ($1::int IS NULL OR r.event_id = $1)
              AND ($2::int IS NULL OR r.schedule_id = $2)
            ORDER BY r.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.event_id)
        .bind(filter.schedule_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_records: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM registrations r
            WHERE ($1::int IS NULL OR r.event_id = $1)
              AND ($2::int IS NULL OR r.schedule_id = $2)
            "#,
        )
        .bind(filter.event_id)
        .bind(filter.schedule_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total_records))
    }
}
