use chrono::{DateTime, Duration, Utc};
use marquee_shared::{HoldId, RequesterId, SeatId, ShowId};
use serde::{Deserialize, Serialize};

/// A time-boxed exclusive claim on one or more seats, pending checkout.
/// Owned by the requester who created it until it expires, is released,
/// or is consumed into a booking. Expiry is a stored timestamp, never a
/// live timer; losing a hold on restart is acceptable because the seats
/// simply come back as available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub id: HoldId,
    pub show_id: ShowId,
    pub seats: Vec<SeatId>,
    pub requester: RequesterId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: HoldStatus,
    /// When the hold left Active. Terminal records stick around for a
    /// retention grace so a late confirm reads as expired rather than
    /// unknown, then the reaper drops them.
    #[serde(default)]
    pub terminated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    Active,
    Expired,
    Consumed,
    Released,
}

impl Hold {
    pub fn new(
        show_id: ShowId,
        seats: Vec<SeatId>,
        requester: RequesterId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: HoldId::generate(),
            show_id,
            seats,
            requester,
            created_at: now,
            expires_at: now + ttl,
            status: HoldStatus::Active,
            terminated_at: None,
        }
    }

    /// Move to a terminal status, stamping when it happened.
    pub(crate) fn terminate(&mut self, status: HoldStatus, now: DateTime<Utc>) {
        self.status = status;
        self.terminated_at = Some(now);
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == HoldStatus::Active && self.expires_at > now
    }

    /// Remaining lifetime, clamped at zero. For client countdown display.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}
