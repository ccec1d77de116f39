use crate::registrations::service::RegistrationService;
use crate::schedules::service::ScheduleService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Stores live behind `Arc<dyn Trait>` inside the services.
#[derive(Clone)]
pub struct AppState {
    pub registrations: RegistrationService,
    pub schedules: ScheduleService,
}
