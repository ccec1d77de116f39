use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::page::{PageRequest, Paginated};
use crate::models::registration::{
    NewRegistration, Registration, RegistrationFilter, RegistrationPageItem,
};
use crate::registrations::store::RegistrationStore;
use crate::schedules::store::{ScheduleCounterStore, ScheduleStore};

/// Typed outcomes of a registration attempt. `errors.rs` maps these onto
/// HTTP statuses at the handler boundary.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("You have already selected a schedule for this event.")]
    DuplicateRegistration,

    #[error("The selected schedule does not exist.")]
    ScheduleNotFound,

    #[error("The selected schedule has reached its registration limit.")]
    CapacityExceeded,

    #[error("The registration could not be created.")]
    CreateFailed,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::DuplicateRegistration | RegistrationError::CapacityExceeded => {
                AppError::Conflict(err.to_string())
            }
            RegistrationError::ScheduleNotFound => AppError::NotFound(err.to_string()),
            RegistrationError::CreateFailed => AppError::Server(err.to_string()),
            RegistrationError::Store(e) => e,
        }
    }
}

/// Body of `POST /api/v1/registrations`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationCreateRequest {
    pub subject_id: Uuid,
    pub schedule_id: i32,
    pub event_id: i32,
    #[serde(default)]
    pub address_detail: String,
}

/// Decides whether a registration attempt is admitted, executes it, and keeps
/// the schedule's active flag consistent with its capacity.
///
/// The capacity check is optimistic: the registration that fills the last
/// seat is still admitted, and the slot is closed for callers after it. Both
/// the duplicate check and the capacity check are separated in time from the
/// write, so concurrent callers can slip past them; the store's constraints
/// are the only harder guarantee.
#[derive(Clone)]
pub struct RegistrationService {
    registrations: Arc<dyn RegistrationStore>,
    schedules: Arc<dyn ScheduleStore>,
    counters: Arc<dyn ScheduleCounterStore>,
}

impl RegistrationService {
    pub fn new(
        registrations: Arc<dyn RegistrationStore>,
        schedules: Arc<dyn ScheduleStore>,
        counters: Arc<dyn ScheduleCounterStore>,
    ) -> Self {
        RegistrationService {
            registrations,
            schedules,
            counters,
        }
    }

    /// Runs the admission flow for one registration attempt.
    ///
    /// `actor` is the audit identity of the caller, threaded in explicitly
    /// rather than read from ambient request state.
    pub async fn register(
        &self,
        request: RegistrationCreateRequest,
        actor: &str,
    ) -> Result<Registration, RegistrationError> {
        let existing = self
            .registrations
            .find_by_subject_and_event(request.subject_id, request.event_id)
            .await?;
        if existing.is_some() {
            return Err(RegistrationError::DuplicateRegistration);
        }

        let mut schedule = self
            .schedules
            .get_by_id(request.schedule_id)
            .await?
            .ok_or(RegistrationError::ScheduleNotFound)?;

        // limit_count of NULL or <= 0 means the slot is unlimited.
        let limit = schedule.limit_count.unwrap_or(0);
        let before = self.counter_value(request.schedule_id).await?;
        if limit > 0 && before >= limit {
            return Err(RegistrationError::CapacityExceeded);
        }

        let created = self
            .registrations
            .create(&NewRegistration {
                subject_id: request.subject_id,
                schedule_id: request.schedule_id,
                event_id: request.event_id,
                address_detail: request.address_detail,
                created_at: Utc::now(),
                created_by: actor.to_string(),
            })
            .await?
            .ok_or(RegistrationError::CreateFailed)?;

        // Re-check after the write: once a fresh counter read reaches the
        // limit, close the slot for subsequent callers. Losing this update
        // must not take the just-created registration down with it.
        let after = self.counter_value(request.schedule_id).await?;
        if limit > 0 && after >= limit && schedule.is_active {
            schedule.is_active = false;
            if let Err(e) = self.schedules.update(&schedule).await {
                warn!(
                    schedule_id = schedule.id,
                    "Failed to deactivate exhausted schedule: {e}"
                );
            }
        }

        info!(
            registration_id = created.id,
            subject_id = %created.subject_id,
            schedule_id = created.schedule_id,
            event_id = created.event_id,
            "Registration created"
        );
        Ok(created)
    }

    /// Looks up a subject's registration for an event.
    pub async fn get_registration(
        &self,
        subject_id: Uuid,
        event_id: i32,
    ) -> Result<Option<Registration>, AppError> {
        self.registrations
            .find_by_subject_and_event(subject_id, event_id)
            .await
    }

    /// Filtered, paginated listing for recruiter-facing UIs.
    pub async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> Result<Paginated<RegistrationPageItem>, AppError> {
        let page = page.normalized();
        let (items, total_records) = self.registrations.list_page(filter, page).await?;
        Ok(Paginated::new(items, total_records, page))
    }

    async fn counter_value(&self, schedule_id: i32) -> Result<i32, AppError> {
        Ok(self
            .counters
            .get_count(schedule_id)
            .await?
            .map(|c| c.count)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::schedule::{Schedule, ScheduleCounter};

    /// In-memory stand-in for all three stores. The counter is derived from
    /// the registration rows, which mimics the trigger-maintained table.
    struct MemoryStores {
        registrations: Mutex<Vec<Registration>>,
        schedules: Mutex<HashMap<i32, Schedule>>,
        next_id: AtomicI32,
        update_calls: AtomicUsize,
        fail_updates: bool,
    }

    impl MemoryStores {
        fn new(schedules: Vec<Schedule>) -> Arc<Self> {
            Arc::new(MemoryStores {
                registrations: Mutex::new(Vec::new()),
                schedules: Mutex::new(schedules.into_iter().map(|s| (s.id, s)).collect()),
                next_id: AtomicI32::new(1),
                update_calls: AtomicUsize::new(0),
                fail_updates: false,
            })
        }

        fn with_failing_updates(schedules: Vec<Schedule>) -> Arc<Self> {
            let mut stores = MemoryStores::new(schedules);
            Arc::get_mut(&mut stores).unwrap().fail_updates = true;
            stores
        }

        fn schedule(&self, id: i32) -> Schedule {
            self.schedules.lock().unwrap().get(&id).unwrap().clone()
        }

        fn registration_count(&self) -> usize {
            self.registrations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RegistrationStore for MemoryStores {
        async fn find_by_subject_and_event(
            &self,
            subject_id: Uuid,
            event_id: i32,
        ) -> Result<Option<Registration>, AppError> {
            Ok(self
                .registrations
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.subject_id == subject_id && r.event_id == event_id)
                .cloned())
        }

        async fn create(&self, new: &NewRegistration) -> Result<Option<Registration>, AppError> {
            let registration = Registration {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                subject_id: new.subject_id,
                schedule_id: new.schedule_id,
                event_id: new.event_id,
                address_detail: new.address_detail.clone(),
                created_at: new.created_at,
                created_by: new.created_by.clone(),
            };
            self.registrations.lock().unwrap().push(registration.clone());
            Ok(Some(registration))
        }

        async fn list_page(
            &self,
            filter: &RegistrationFilter,
            page: PageRequest,
        ) -> Result<(Vec<RegistrationPageItem>, i64), AppError> {
            let schedules = self.schedules.lock().unwrap();
            let matching: Vec<RegistrationPageItem> = self
                .registrations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| filter.event_id.map_or(true, |e| r.event_id == e))
                .filter(|r| filter.schedule_id.map_or(true, |s| r.schedule_id == s))
                .map(|r| RegistrationPageItem {
                    id: r.id,
                    subject_id: r.subject_id,
                    schedule_id: r.schedule_id,
                    schedule_name: schedules
                        .get(&r.schedule_id)
                        .map(|s| s.name.clone())
                        .unwrap_or_default(),
                    event_id: r.event_id,
                    address_detail: r.address_detail.clone(),
                    created_at: r.created_at,
                    created_by: r.created_by.clone(),
                })
                .collect();
            let total = matching.len() as i64;
            let items = match page.limit() {
                Some(limit) => matching
                    .into_iter()
                    .skip(page.offset() as usize)
                    .take(limit as usize)
                    .collect(),
                None => matching,
            };
            Ok((items, total))
        }
    }

    #[async_trait]
    impl ScheduleStore for MemoryStores {
        async fn get_by_id(&self, schedule_id: i32) -> Result<Option<Schedule>, AppError> {
            Ok(self.schedules.lock().unwrap().get(&schedule_id).cloned())
        }

        async fn list_by_event(&self, event_id: i32) -> Result<Vec<Schedule>, AppError> {
            let mut schedules: Vec<Schedule> = self
                .schedules
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.event_id == event_id && s.is_active)
                .cloned()
                .collect();
            schedules.sort_by_key(|s| s.id);
            Ok(schedules)
        }

        async fn update(&self, schedule: &Schedule) -> Result<Schedule, AppError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates {
                return Err(AppError::Internal(anyhow::anyhow!("update rejected")));
            }
            self.schedules
                .lock()
                .unwrap()
                .insert(schedule.id, schedule.clone());
            Ok(schedule.clone())
        }
    }

    #[async_trait]
    impl ScheduleCounterStore for MemoryStores {
        async fn get_count(&self, schedule_id: i32) -> Result<Option<ScheduleCounter>, AppError> {
            let count = self
                .registrations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.schedule_id == schedule_id)
                .count() as i32;
            Ok((count > 0).then_some(ScheduleCounter { schedule_id, count }))
        }
    }

    fn schedule(id: i32, event_id: i32, limit_count: Option<i32>, is_active: bool) -> Schedule {
        Schedule {
            id,
            name: format!("Slot {id}"),
            event_id,
            limit_count,
            is_active,
        }
    }

    fn service_for(stores: &Arc<MemoryStores>) -> RegistrationService {
        RegistrationService::new(stores.clone(), stores.clone(), stores.clone())
    }

    fn request(subject_id: Uuid, schedule_id: i32, event_id: i32) -> RegistrationCreateRequest {
        RegistrationCreateRequest {
            subject_id,
            schedule_id,
            event_id,
            address_detail: "123 Main St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_records_audit_fields() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(5), true)]);
        let service = service_for(&stores);

        let subject = Uuid::new_v4();
        let created = service
            .register(request(subject, 1, 10), "recruiter-7")
            .await
            .unwrap();

        assert_eq!(created.subject_id, subject);
        assert_eq!(created.created_by, "recruiter-7");
        assert_eq!(created.address_detail, "123 Main St");
    }

    #[tokio::test]
    async fn test_second_registration_for_same_event_is_rejected() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(5), true)]);
        let service = service_for(&stores);
        let subject = Uuid::new_v4();

        service
            .register(request(subject, 1, 10), "tester")
            .await
            .unwrap();
        let err = service
            .register(request(subject, 1, 10), "tester")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::DuplicateRegistration));
        assert_eq!(stores.registration_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_keyed_by_event_not_schedule() {
        let stores = MemoryStores::new(vec![
            schedule(1, 10, Some(5), true),
            schedule(2, 10, Some(5), true),
        ]);
        let service = service_for(&stores);
        let subject = Uuid::new_v4();

        service
            .register(request(subject, 1, 10), "tester")
            .await
            .unwrap();
        // Same event through a different slot is still a duplicate.
        let err = service
            .register(request(subject, 2, 10), "tester")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::DuplicateRegistration));
    }

    #[tokio::test]
    async fn test_last_seat_is_admitted_then_slot_rejects() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(2), true)]);
        let service = service_for(&stores);

        service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();
        // Counter is at limit-1: this caller takes the last seat.
        service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();
        let err = service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::CapacityExceeded));
        assert_eq!(stores.registration_count(), 2);
    }

    #[tokio::test]
    async fn test_unlimited_schedule_never_reports_capacity() {
        for limit_count in [None, Some(0), Some(-3)] {
            let stores = MemoryStores::new(vec![schedule(1, 10, limit_count, true)]);
            let service = service_for(&stores);

            for _ in 0..5 {
                service
                    .register(request(Uuid::new_v4(), 1, 10), "tester")
                    .await
                    .unwrap();
            }

            assert!(stores.schedule(1).is_active);
            assert_eq!(stores.registration_count(), 5);
        }
    }

    #[tokio::test]
    async fn test_missing_schedule_is_rejected_without_writes() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(5), true)]);
        let service = service_for(&stores);

        let err = service
            .register(request(Uuid::new_v4(), 99, 10), "tester")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::ScheduleNotFound));
        assert_eq!(stores.registration_count(), 0);
    }

    #[tokio::test]
    async fn test_filling_last_seat_deactivates_schedule() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(2), true)]);
        let service = service_for(&stores);

        service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();
        assert!(stores.schedule(1).is_active);

        service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();
        assert!(!stores.schedule(1).is_active);

        let err = service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::CapacityExceeded));
    }

    #[tokio::test]
    async fn test_already_inactive_schedule_is_not_updated_again() {
        // An administratively closed slot that still has room: admission
        // proceeds, but the post-create deactivation must not re-fire.
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(1), false)]);
        let service = service_for(&stores);

        service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();

        assert_eq!(stores.update_calls.load(Ordering::SeqCst), 0);
        assert!(!stores.schedule(1).is_active);
    }

    #[tokio::test]
    async fn test_deactivation_failure_still_reports_success() {
        let stores = MemoryStores::with_failing_updates(vec![schedule(1, 10, Some(1), true)]);
        let service = service_for(&stores);

        let created = service
            .register(request(Uuid::new_v4(), 1, 10), "tester")
            .await
            .unwrap();

        assert_eq!(created.schedule_id, 1);
        assert_eq!(stores.update_calls.load(Ordering::SeqCst), 1);
        // The gate stays open; only the side effect was lost.
        assert!(stores.schedule(1).is_active);
    }

    #[tokio::test]
    async fn test_get_registration_returns_created_row() {
        let stores = MemoryStores::new(vec![schedule(1, 10, Some(5), true)]);
        let service = service_for(&stores);
        let subject = Uuid::new_v4();

        assert!(service.get_registration(subject, 10).await.unwrap().is_none());

        let created = service
            .register(request(subject, 1, 10), "tester")
            .await
            .unwrap();
        let found = service.get_registration(subject, 10).await.unwrap().unwrap();

        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let stores = MemoryStores::new(vec![
            schedule(1, 10, None, true),
            schedule(2, 20, None, true),
        ]);
        let service = service_for(&stores);

        for _ in 0..3 {
            service
                .register(request(Uuid::new_v4(), 1, 10), "tester")
                .await
                .unwrap();
        }
        service
            .register(request(Uuid::new_v4(), 2, 20), "tester")
            .await
            .unwrap();

        let filter = RegistrationFilter {
            event_id: Some(10),
            schedule_id: None,
        };
        let page = service
            .list_registrations(
                &filter,
                PageRequest {
                    page_number: 2,
                    page_size: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.total_records, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.current_page, 2);
        assert!(page.items.iter().all(|i| i.event_id == 10));
        assert_eq!(page.items[0].schedule_name, "Slot 1");
    }
}
