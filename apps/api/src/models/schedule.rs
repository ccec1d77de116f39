use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A capacity-bounded time-track an applicant selects when registering for
/// an event. `limit_count` of NULL or ≤ 0 means unlimited. Once the slot is
/// exhausted the admission flow flips `is_active` off; reactivation is an
/// administrative action outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: i32,
    pub name: String,
    pub event_id: i32,
    pub limit_count: Option<i32>,
    pub is_active: bool,
}

/// Derived count of registrations attributed to a schedule. Maintained by a
/// database trigger; this service only reads it. An absent row reads as 0.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScheduleCounter {
    pub schedule_id: i32,
    pub count: i32,
}
