use marquee_shared::SeatId;

/// The full rejection taxonomy exposed to the checkout collaborator.
/// Nothing here is retried internally; the only automatic recovery in the
/// engine is the hold reaper.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// Malformed input: empty seat list, duplicate ids, unknown seat,
    /// retired show. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested seat(s) already held or booked. Carries the specific
    /// conflicting ids so the caller can re-offer selection.
    #[error("Seats unavailable: {seats:?}")]
    Conflict { seats: Vec<SeatId> },

    /// Hold TTL passed (or the hold was released) before commit. Distinct
    /// from Conflict so the caller can say "your hold timed out" rather
    /// than "seat taken".
    #[error("Hold is no longer active")]
    Expired,

    /// Commit or cancel attempted by someone who does not own the hold.
    /// Security-relevant, not transient.
    #[error("Hold does not belong to this requester")]
    NotOwner,

    #[error("Hold not found")]
    HoldNotFound,

    #[error("Show not found")]
    ShowNotFound,

    /// Durable layer failure while recording a booking. The in-memory
    /// transition has been rolled back; the hold is intact.
    #[error("Storage error: {0}")]
    Storage(String),
}
