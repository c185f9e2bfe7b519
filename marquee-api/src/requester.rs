use crate::error::AppError;
use axum::http::HeaderMap;
use marquee_shared::RequesterId;

pub const REQUESTER_HEADER: &str = "x-requester-id";

/// Requester identity as handed over by the session collaborator.
/// Authentication itself happens upstream; the engine only needs a stable
/// id to enforce hold ownership.
pub fn require_requester(headers: &HeaderMap) -> Result<RequesterId, AppError> {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(RequesterId::from)
        .ok_or_else(|| AppError::BadRequest("missing X-Requester-Id header".to_string()))
}

/// Optional variant for read paths: an anonymous viewer still gets a seat
/// map, just without held-by-you highlighting.
pub fn optional_requester(headers: &HeaderMap) -> Option<RequesterId> {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(RequesterId::from)
}
