use crate::booking::{Booking, BookingRepository, BookingStore};
use crate::error::ReservationError;
use crate::hold::Hold;
use crate::lock::SeatLockManager;
use crate::show::{lock, ShowIndex};
use crate::status::{reopens_at, DisplayStatus, SeatState};
use chrono::{DateTime, Duration, Utc};
use marquee_shared::{BookingId, HoldId, RequesterId, SeatId, ShowId, ShowKey};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tunable business rules. TTL default 60 s, reopen window 30 min,
/// terminal hold records kept 10 min before the reaper evicts them.
#[derive(Debug, Clone)]
pub struct EngineRules {
    pub hold_ttl: Duration,
    pub reopen_window: Duration,
    pub terminal_hold_retention: Duration,
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            hold_ttl: Duration::seconds(60),
            reopen_window: Duration::minutes(30),
            terminal_hold_retention: Duration::minutes(10),
        }
    }
}

/// The public surface used by the booking/checkout collaborator. Composes
/// the show index, the seat lock manager, and the booking store; owns the
/// lifecycle transitions of holds and bookings exclusively.
pub struct ReservationEngine {
    index: Arc<ShowIndex>,
    locks: SeatLockManager,
    bookings: BookingStore,
    rules: EngineRules,
}

impl ReservationEngine {
    pub fn new(
        catalogue: Arc<marquee_layout::SeatCatalogue>,
        repo: Arc<dyn BookingRepository>,
        rules: EngineRules,
    ) -> Self {
        let index = Arc::new(ShowIndex::new(catalogue));
        let locks = SeatLockManager::new(
            index.clone(),
            rules.reopen_window,
            rules.terminal_hold_retention,
        );
        let bookings = BookingStore::new(index.clone(), repo);
        Self {
            index,
            locks,
            bookings,
            rules,
        }
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    pub fn catalogue(&self) -> &marquee_layout::SeatCatalogue {
        self.index.catalogue()
    }

    pub fn get_or_create_show(&self, key: &ShowKey) -> ShowId {
        self.index.get_or_create(key)
    }

    pub fn retire_show(&self, show_id: ShowId) -> bool {
        self.index.retire(show_id)
    }

    /// Derived, non-mutating seat map view for one show. Expired holds
    /// read as available even before the reaper runs, and booked seats
    /// read as available once the near-showtime reopen rule applies.
    pub fn query_availability(
        &self,
        show_id: ShowId,
        viewer: Option<&RequesterId>,
    ) -> Result<BTreeMap<SeatId, DisplayStatus>, ReservationError> {
        self.query_availability_at(show_id, viewer, Utc::now())
    }

    pub(crate) fn query_availability_at(
        &self,
        show_id: ShowId,
        viewer: Option<&RequesterId>,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<SeatId, DisplayStatus>, ReservationError> {
        let show = self.index.get(show_id).ok_or(ReservationError::ShowNotFound)?;
        let guard = lock(&show);

        let mut map = BTreeMap::new();
        for (id, state) in &guard.seats {
            let display = match state {
                SeatState::Available => DisplayStatus::Available,
                SeatState::Held {
                    requester,
                    expires_at,
                    ..
                } => {
                    if *expires_at <= now {
                        DisplayStatus::Available
                    } else if viewer.is_some_and(|v| v == requester) {
                        DisplayStatus::HeldByYou
                    } else {
                        DisplayStatus::HeldByOther
                    }
                }
                SeatState::Booked { booked_at, .. } => {
                    if reopens_at(*booked_at, now, guard.start_at, self.rules.reopen_window) {
                        DisplayStatus::Available
                    } else {
                        DisplayStatus::Booked
                    }
                }
            };
            map.insert(id.clone(), display);
        }
        Ok(map)
    }

    /// Acquire a hold on the given seats. Validates the request shape
    /// before touching the lock manager: non-empty, no duplicates, every
    /// seat known to the catalogue.
    pub fn reserve(
        &self,
        show_id: ShowId,
        seat_ids: &[SeatId],
        requester: &RequesterId,
    ) -> Result<Hold, ReservationError> {
        self.reserve_with_ttl(show_id, seat_ids, requester, self.rules.hold_ttl)
    }

    pub fn reserve_with_ttl(
        &self,
        show_id: ShowId,
        seat_ids: &[SeatId],
        requester: &RequesterId,
        ttl: Duration,
    ) -> Result<Hold, ReservationError> {
        self.reserve_at(show_id, seat_ids, requester, ttl, Utc::now())
    }

    pub(crate) fn reserve_at(
        &self,
        show_id: ShowId,
        seat_ids: &[SeatId],
        requester: &RequesterId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Hold, ReservationError> {
        if seat_ids.is_empty() {
            return Err(ReservationError::Validation(
                "seat selection is empty".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for id in seat_ids {
            if !seen.insert(id) {
                return Err(ReservationError::Validation(format!(
                    "duplicate seat id: {id}"
                )));
            }
            if !self.index.catalogue().contains(id) {
                return Err(ReservationError::Validation(format!(
                    "unknown seat id: {id}"
                )));
            }
        }
        if ttl <= Duration::zero() {
            return Err(ReservationError::Validation(
                "hold ttl must be positive".to_string(),
            ));
        }

        self.locks.acquire_at(show_id, seat_ids, requester, ttl, now)
    }

    /// Convert a hold into a permanent booking. Ownership is verified
    /// before any state moves; everything else is re-validated atomically
    /// inside the booking store.
    pub async fn confirm_booking(
        &self,
        hold_id: HoldId,
        requester: &RequesterId,
    ) -> Result<Booking, ReservationError> {
        self.confirm_booking_at(hold_id, requester, Utc::now()).await
    }

    pub(crate) async fn confirm_booking_at(
        &self,
        hold_id: HoldId,
        requester: &RequesterId,
        now: DateTime<Utc>,
    ) -> Result<Booking, ReservationError> {
        let hold = self
            .index
            .hold_snapshot(hold_id)
            .ok_or(ReservationError::HoldNotFound)?;
        if &hold.requester != requester {
            return Err(ReservationError::NotOwner);
        }
        self.bookings.commit_at(hold_id, now).await
    }

    /// Explicit early release. The TTL already guarantees abandoned holds
    /// expire; this just frees the seats immediately.
    pub fn cancel_reservation(
        &self,
        hold_id: HoldId,
        requester: &RequesterId,
    ) -> Result<(), ReservationError> {
        let hold = self
            .index
            .hold_snapshot(hold_id)
            .ok_or(ReservationError::HoldNotFound)?;
        if &hold.requester != requester {
            return Err(ReservationError::NotOwner);
        }
        self.locks.release(hold_id)
    }

    /// Sweep expired holds. Also reachable through lazy expiry everywhere,
    /// so callers may run this on any cadence, including never.
    pub fn reap(&self) -> usize {
        self.locks.reap()
    }

    pub fn hold(&self, hold_id: HoldId) -> Option<Hold> {
        self.index.hold_snapshot(hold_id)
    }

    pub async fn booking(&self, id: BookingId) -> Result<Option<Booking>, ReservationError> {
        self.bookings.get(id).await
    }

    pub async fn bookings_for_show(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<Booking>, ReservationError> {
        self.bookings.list_for_show(show_id).await
    }
}
