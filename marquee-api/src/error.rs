use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_engine::ReservationError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Reservation(ReservationError),
    BadRequest(String),
    NotFound(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Reservation(err) => reservation_response(err),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// One place maps the engine taxonomy onto HTTP. Conflicts carry the
/// specific seat ids so the client can re-offer selection; Expired is
/// distinct from Conflict so the client can say "your hold timed out"
/// rather than "seat taken".
fn reservation_response(err: ReservationError) -> Response {
    let (status, body) = match &err {
        ReservationError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": msg, "reason": "validation" }),
        ),
        ReservationError::Conflict { seats } => (
            StatusCode::CONFLICT,
            json!({
                "error": "requested seats are unavailable",
                "reason": "conflict",
                "unavailable_seats": seats,
            }),
        ),
        ReservationError::Expired => (
            StatusCode::GONE,
            json!({ "error": "hold is no longer active", "reason": "hold-expired" }),
        ),
        ReservationError::NotOwner => (
            StatusCode::FORBIDDEN,
            json!({ "error": "hold does not belong to this requester", "reason": "not-owner" }),
        ),
        ReservationError::HoldNotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": "hold not found", "reason": "hold-not-found" }),
        ),
        ReservationError::ShowNotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": "show not found", "reason": "show-not-found" }),
        ),
        ReservationError::Storage(msg) => {
            tracing::error!("Storage error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal Server Error" }),
            )
        }
    };
    (status, Json(body)).into_response()
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        Self::Reservation(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
