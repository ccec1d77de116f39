use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::page::{PageRequest, Paginated};
use crate::models::registration::{Registration, RegistrationFilter, RegistrationPageItem};
use crate::registrations::service::RegistrationCreateRequest;
use crate::state::AppState;

/// Audit identity of the caller, taken from the `x-user-id` header the
/// gateway sets after token validation. Absent header means `anonymous`.
pub struct Actor(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("anonymous")
            .to_string();
        Ok(Actor(actor))
    }
}

/// POST /api/v1/registrations
pub async fn handle_create_registration(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(req): Json<RegistrationCreateRequest>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let created = state.registrations.register(req, &actor).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/registrations/:subject_id/:event_id
pub async fn handle_get_registration(
    State(state): State<AppState>,
    Path((subject_id, event_id)): Path<(Uuid, i32)>,
) -> Result<Json<Registration>, AppError> {
    let registration = state
        .registrations
        .get_registration(subject_id, event_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No registration for subject {subject_id} and event {event_id}"
            ))
        })?;
    Ok(Json(registration))
}

/// POST /api/v1/registrations/filter?page_number=&page_size=
pub async fn handle_filter_registrations(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Json(filter): Json<RegistrationFilter>,
) -> Result<Json<Paginated<RegistrationPageItem>>, AppError> {
    let result = state.registrations.list_registrations(&filter, page).await?;
    Ok(Json(result))
}
