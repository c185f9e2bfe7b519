use chrono::{DateTime, Duration, Utc};
use marquee_shared::{BookingId, HoldId, RequesterId};
use serde::{Deserialize, Serialize};

/// Authoritative per-(show, seat) state. At most one of Held/Booked at any
/// instant; all transitions happen under the owning show's mutex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatState {
    Available,
    Held {
        hold_id: HoldId,
        requester: RequesterId,
        expires_at: DateTime<Utc>,
    },
    Booked {
        booking_id: BookingId,
        booked_at: DateTime<Utc>,
    },
}

impl SeatState {
    /// Expiry is data, not a timer: a held seat whose expiry has passed is
    /// treated as free by every reader, whether or not the reaper has run.
    pub fn is_claimable_at(
        &self,
        now: DateTime<Utc>,
        show_start: DateTime<Utc>,
        reopen_window: Duration,
    ) -> bool {
        match self {
            SeatState::Available => true,
            SeatState::Held { expires_at, .. } => *expires_at <= now,
            SeatState::Booked { booked_at, .. } => {
                reopens_at(*booked_at, now, show_start, reopen_window)
            }
        }
    }
}

/// Near-showtime reopen rule (no-show policy): a booked seat becomes
/// claimable again once fewer than `window` remains before the show
/// starts, provided the booking predates the opening of that window.
/// A booking made inside the final window never reopens.
pub fn reopens_at(
    booked_at: DateTime<Utc>,
    now: DateTime<Utc>,
    show_start: DateTime<Utc>,
    window: Duration,
) -> bool {
    now < show_start && show_start - now < window && booked_at < show_start - window
}

/// What a seat-map renderer sees. Derived from [`SeatState`] plus the
/// viewer's identity; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Available,
    HeldByYou,
    HeldByOther,
    Booked,
}
