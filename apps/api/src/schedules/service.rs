use std::sync::Arc;

use crate::errors::AppError;
use crate::models::schedule::Schedule;
use crate::schedules::store::{ScheduleCounterStore, ScheduleStore};

/// Read-side schedule catalog: slot detail, the active slots of an event,
/// and a least-loaded suggestion for applicants who have no preference.
#[derive(Clone)]
pub struct ScheduleService {
    schedules: Arc<dyn ScheduleStore>,
    counters: Arc<dyn ScheduleCounterStore>,
}

impl ScheduleService {
    pub fn new(schedules: Arc<dyn ScheduleStore>, counters: Arc<dyn ScheduleCounterStore>) -> Self {
        ScheduleService {
            schedules,
            counters,
        }
    }

    pub async fn get_schedule(&self, schedule_id: i32) -> Result<Option<Schedule>, AppError> {
        self.schedules.get_by_id(schedule_id).await
    }

    pub async fn list_by_event(&self, event_id: i32) -> Result<Vec<Schedule>, AppError> {
        self.schedules.list_by_event(event_id).await
    }

    /// Suggests the active slot of an event with the fewest registrations.
    /// Ties keep the earliest slot (lowest id). `None` when the event has no
    /// active slots.
    pub async fn suggest_slot(&self, event_id: i32) -> Result<Option<Schedule>, AppError> {
        let mut best: Option<(Schedule, i32)> = None;
        for schedule in self.schedules.list_by_event(event_id).await? {
            let count = self
                .counters
                .get_count(schedule.id)
                .await?
                .map(|c| c.count)
                .unwrap_or(0);
            if best.as_ref().map_or(true, |(_, b)| count < *b) {
                best = Some((schedule, count));
            }
        }
        Ok(best.map(|(schedule, _)| schedule))
    }
}
