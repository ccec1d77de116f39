use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A committed claim by one subject on one schedule slot for one event.
/// Created once per (subject_id, event_id); never updated or deleted here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i32,
    pub subject_id: Uuid,
    pub schedule_id: i32,
    pub event_id: i32,
    pub address_detail: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// Insert payload for a registration. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub subject_id: Uuid,
    pub schedule_id: i32,
    pub event_id: i32,
    pub address_detail: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// Equality filters for the paged listing. Absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationFilter {
    pub event_id: Option<i32>,
    pub schedule_id: Option<i32>,
}

/// One row of the paged listing, with the schedule name joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationPageItem {
    pub id: i32,
    pub subject_id: Uuid,
    pub schedule_id: i32,
    pub schedule_name: String,
    pub event_id: i32,
    pub address_detail: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}
