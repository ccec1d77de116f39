use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::schedule::Schedule;
use crate::state::AppState;

/// GET /api/v1/schedules/detail/:id
pub async fn handle_get_schedule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Schedule>, AppError> {
    let schedule = state
        .schedules
        .get_schedule(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Schedule {id} not found")))?;
    Ok(Json(schedule))
}

/// GET /api/v1/schedules/event/:event_id
pub async fn handle_list_schedules(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let schedules = state.schedules.list_by_event(event_id).await?;
    Ok(Json(schedules))
}

/// GET /api/v1/schedules/event/:event_id/suggest
pub async fn handle_suggest_schedule(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Json<Schedule>, AppError> {
    let schedule = state
        .schedules
        .suggest_slot(event_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Event {event_id} has no active schedules"))
        })?;
    Ok(Json(schedule))
}
