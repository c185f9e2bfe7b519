use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_shared::{SeatId, ShowId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::requester::require_requester;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ReserveRequest {
    show_id: Uuid,
    seat_ids: Vec<SeatId>,
}

#[derive(Debug, Serialize)]
struct HoldResponse {
    hold_id: Uuid,
    show_id: Uuid,
    seats: Vec<SeatId>,
    expires_at: DateTime<Utc>,
    status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(reserve_seats))
        .route("/v1/holds/{hold_id}", get(hold_status))
        .route("/v1/holds/{hold_id}", delete(cancel_reservation))
}

async fn reserve_seats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    let requester = require_requester(&headers)?;
    let hold = state
        .engine
        .reserve(ShowId::from(req.show_id), &req.seat_ids, &requester)?;
    Ok(Json(HoldResponse {
        hold_id: hold.id.as_uuid(),
        show_id: hold.show_id.as_uuid(),
        seats: hold.seats,
        expires_at: hold.expires_at,
        status: "active".to_string(),
    }))
}

/// Owner-only snapshot, mostly for countdown display on the client.
async fn hold_status(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<HoldResponse>, AppError> {
    let requester = require_requester(&headers)?;
    let hold = state
        .engine
        .hold(hold_id.into())
        .ok_or(marquee_engine::ReservationError::HoldNotFound)?;
    if hold.requester != requester {
        return Err(marquee_engine::ReservationError::NotOwner.into());
    }
    let status = match hold.status {
        marquee_engine::HoldStatus::Active if hold.expires_at <= Utc::now() => "expired",
        marquee_engine::HoldStatus::Active => "active",
        marquee_engine::HoldStatus::Expired => "expired",
        marquee_engine::HoldStatus::Consumed => "consumed",
        marquee_engine::HoldStatus::Released => "released",
    };
    Ok(Json(HoldResponse {
        hold_id: hold.id.as_uuid(),
        show_id: hold.show_id.as_uuid(),
        seats: hold.seats,
        expires_at: hold.expires_at,
        status: status.to_string(),
    }))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(hold_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let requester = require_requester(&headers)?;
    state
        .engine
        .cancel_reservation(hold_id.into(), &requester)?;
    Ok(StatusCode::NO_CONTENT)
}
