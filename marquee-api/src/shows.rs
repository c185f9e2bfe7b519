use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use marquee_engine::DisplayStatus;
use marquee_shared::{SeatId, ShowKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::requester::optional_requester;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterShowRequest {
    subject_id: String,
    date: NaiveDate,
    time: NaiveTime,
}

#[derive(Debug, Serialize)]
struct RegisterShowResponse {
    show_id: Uuid,
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    show_id: Uuid,
    seats: BTreeMap<SeatId, DisplayStatus>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shows", post(register_show))
        .route("/v1/shows/{show_id}/seats", get(seat_map))
        .route("/v1/shows/{show_id}", delete(retire_show))
}

/// Idempotent: the same (subject, date, time) triple always answers with
/// the same show id.
async fn register_show(
    State(state): State<AppState>,
    Json(req): Json<RegisterShowRequest>,
) -> Result<Json<RegisterShowResponse>, AppError> {
    let key = ShowKey::new(req.subject_id, req.date, req.time);
    let show_id = state.engine.get_or_create_show(&key);
    info!(show = %show_id, subject = %key.subject_id, "show registered");
    Ok(Json(RegisterShowResponse {
        show_id: show_id.as_uuid(),
    }))
}

async fn seat_map(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SeatMapResponse>, AppError> {
    let viewer = optional_requester(&headers);
    let seats = state
        .engine
        .query_availability(show_id.into(), viewer.as_ref())?;
    Ok(Json(SeatMapResponse { show_id, seats }))
}

/// Soft retirement only; bookings stay readable and the show keeps
/// answering seat-map queries.
async fn retire_show(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    if state.engine.retire_show(show_id.into()) {
        info!(show = %show_id, "show retired");
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(marquee_engine::ReservationError::ShowNotFound.into())
    }
}
