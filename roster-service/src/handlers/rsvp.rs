//! Rsvp handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

use crate::models::{Rsvp, RsvpResponse};
use crate::services::metrics::record_write;
use crate::startup::AppState;
use crate::utils::validation::{
    identifier_from_body, invalid_identifier, parse_identifier, require_bool, require_identifier,
};
use crate::utils::JsonBody;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteManyResponse {
    pub deleted_count: u64,
}

fn responses(rsvps: Vec<Rsvp>) -> Json<Vec<RsvpResponse>> {
    Json(rsvps.into_iter().map(RsvpResponse::from).collect())
}

/// GET /rsvp/all
pub async fn list_rsvps(
    State(state): State<AppState>,
) -> Result<Json<Vec<RsvpResponse>>, AppError> {
    Ok(responses(state.store.list_rsvps().await?))
}

/// GET /rsvp/user/:userId
pub async fn list_user_rsvps(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RsvpResponse>>, AppError> {
    let user_id = parse_identifier("userId", &user_id)?;
    Ok(responses(state.store.list_rsvps_by_user(user_id).await?))
}

/// GET /rsvp/event/:eventId
pub async fn list_event_rsvps(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<RsvpResponse>>, AppError> {
    let event_id = parse_identifier("eventId", &event_id)?;
    Ok(responses(state.store.list_rsvps_by_event(event_id).await?))
}

/// GET /rsvp/:id
pub async fn get_rsvp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<RsvpResponse>>, AppError> {
    let id = parse_identifier("id", &id)?;

    let rsvp = state.store.find_rsvp(id).await?;
    Ok(Json(rsvp.map(RsvpResponse::from)))
}

/// `user` is never a valid rsvp id, so the by-id lookup rejects it.
///
/// GET /rsvp/user
pub async fn get_rsvp_reserved_segment() -> Result<Json<Option<RsvpResponse>>, AppError> {
    Err(invalid_identifier("id"))
}

/// GET /rsvp/:userId/:eventId
pub async fn get_user_event_rsvp(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(String, String)>,
) -> Result<Json<Option<RsvpResponse>>, AppError> {
    let user_id = parse_identifier("userId", &user_id)?;
    let event_id = parse_identifier("eventId", &event_id)?;

    let rsvp = state
        .store
        .find_rsvp_by_user_and_event(user_id, event_id)
        .await?;
    Ok(Json(rsvp.map(RsvpResponse::from)))
}

/// Create an rsvp. The attendance flag always starts as `true`; any `rsvp` in the
/// body is ignored.
///
/// POST /rsvp/
pub async fn create_rsvp(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<RsvpResponse>, AppError> {
    let user_id = require_identifier(&body, "userId")?;
    let event_id = require_identifier(&body, "eventId")?;

    let rsvp = Rsvp::attending(user_id, event_id);
    state.store.insert_rsvp(&rsvp).await?;
    record_write("rsvps", "create");

    tracing::info!(
        rsvp_id = %rsvp.id,
        user_id = %rsvp.user_id,
        event_id = %rsvp.event_id,
        "Rsvp created"
    );

    Ok(Json(RsvpResponse::from(rsvp)))
}

/// PUT /rsvp/
pub async fn update_rsvp(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Option<RsvpResponse>>, AppError> {
    let rsvp_id = require_identifier(&body, "rsvpId")?;
    let attending = require_bool(&body, "rsvp")?;

    let rsvp = state.store.update_rsvp_flag(rsvp_id, attending).await?;
    if rsvp.is_some() {
        record_write("rsvps", "update");
    }

    Ok(Json(rsvp.map(RsvpResponse::from)))
}

/// DELETE /rsvp/
pub async fn delete_rsvp(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Option<RsvpResponse>>, AppError> {
    let id = identifier_from_body(&body)?;

    let rsvp = state.store.delete_rsvp(id).await?;
    if rsvp.is_some() {
        record_write("rsvps", "delete");
    }

    Ok(Json(rsvp.map(RsvpResponse::from)))
}

/// Remove every rsvp the user holds for the event.
///
/// DELETE /rsvp/user
pub async fn delete_user_event_rsvps(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<DeleteManyResponse>, AppError> {
    let user_id = require_identifier(&body, "userId")?;
    let event_id = require_identifier(&body, "eventId")?;

    let deleted_count = state
        .store
        .delete_rsvps_by_user_and_event(user_id, event_id)
        .await?;
    if deleted_count > 0 {
        record_write("rsvps", "delete");
    }

    tracing::info!(
        user_id = %user_id,
        event_id = %event_id,
        deleted_count,
        "Rsvps deleted"
    );

    Ok(Json(DeleteManyResponse { deleted_count }))
}
