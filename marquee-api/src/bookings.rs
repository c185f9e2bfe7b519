use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_shared::SeatId;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::requester::require_requester;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ConfirmBookingRequest {
    hold_id: Uuid,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    booking_id: Uuid,
    show_id: Uuid,
    seats: Vec<SeatId>,
    total_price_cents: i32,
    created_at: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(confirm_booking))
        .route("/v1/bookings/{booking_id}", get(get_booking))
}

/// Called by the checkout collaborator after payment succeeds. A Gone
/// response here means the hold lapsed mid-checkout; the caller must send
/// the user back to seat selection, never charge silently.
async fn confirm_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let requester = require_requester(&headers)?;
    let booking = state
        .engine
        .confirm_booking(req.hold_id.into(), &requester)
        .await?;
    info!(booking = %booking.id, requester = %requester, "booking confirmed");
    Ok(Json(BookingResponse {
        booking_id: booking.id.as_uuid(),
        show_id: booking.show_id.as_uuid(),
        seats: booking.seats,
        total_price_cents: booking.total_price,
        created_at: booking.created_at,
    }))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .engine
        .booking(booking_id.into())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {} not found", booking_id)))?;
    Ok(Json(BookingResponse {
        booking_id: booking.id.as_uuid(),
        show_id: booking.show_id.as_uuid(),
        seats: booking.seats,
        total_price_cents: booking.total_price,
        created_at: booking.created_at,
    }))
}
