use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::schedule::{Schedule, ScheduleCounter};

/// Persistence seam for schedule slots.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get_by_id(&self, schedule_id: i32) -> Result<Option<Schedule>, AppError>;

    /// Active schedules for an event, ordered by id.
    async fn list_by_event(&self, event_id: i32) -> Result<Vec<Schedule>, AppError>;

    /// Full-row update. Callers pass the complete current Schedule, not a
    /// partial patch; every field on it is persisted.
    async fn update(&self, schedule: &Schedule) -> Result<Schedule, AppError>;
}

/// Read-only view of the trigger-maintained registration counters.
/// An absent row reads as a count of 0.
#[async_trait]
pub trait ScheduleCounterStore: Send + Sync {
    async fn get_count(&self, schedule_id: i32) -> Result<Option<ScheduleCounter>, AppError>;
}
