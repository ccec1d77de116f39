pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::registrations::handlers as registrations;
use crate::schedules::handlers as schedules;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Registration API
        .route(
            "/api/v1/registrations",
            post(registrations::handle_create_registration),
        )
        .route(
            "/api/v1/registrations/filter",
            post(registrations::handle_filter_registrations),
        )
        .route(
            "/api/v1/registrations/:subject_id/:event_id",
            get(registrations::handle_get_registration),
        )
        // Schedule API
        .route(
            "/api/v1/schedules/detail/:id",
            get(schedules::handle_get_schedule),
        )
        .route(
            "/api/v1/schedules/event/:event_id",
            get(schedules::handle_list_schedules),
        )
        .route(
            "/api/v1/schedules/event/:event_id/suggest",
            get(schedules::handle_suggest_schedule),
        )
        .with_state(state)
}
