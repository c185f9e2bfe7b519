use crate::error::ReservationError;
use crate::hold::{Hold, HoldStatus};
use crate::show::{lock, Show, ShowIndex};
use crate::status::SeatState;
use chrono::{DateTime, Duration, Utc};
use marquee_shared::{HoldId, RequesterId, SeatId, ShowId};
use std::sync::Arc;
use tracing::{debug, info};

/// Short-lived exclusive claims on seats, first atomic claim wins.
///
/// Every check-then-act runs entirely under the owning show's mutex and
/// never touches I/O there, so two concurrent acquires for the same seat
/// can never both see it free. A losing request gets an immediate
/// Conflict, never a queued wait.
pub struct SeatLockManager {
    index: Arc<ShowIndex>,
    reopen_window: Duration,
    /// How long terminal hold records are kept before the reaper evicts
    /// them. Long enough that a late confirm still reads as expired.
    terminal_retention: Duration,
}

impl SeatLockManager {
    pub fn new(
        index: Arc<ShowIndex>,
        reopen_window: Duration,
        terminal_retention: Duration,
    ) -> Self {
        Self {
            index,
            reopen_window,
            terminal_retention,
        }
    }

    /// All-or-nothing acquisition: either every requested seat is claimable
    /// and all become held under one new hold, or nothing changes and the
    /// conflicting seat ids come back in the rejection.
    pub fn acquire(
        &self,
        show_id: ShowId,
        seat_ids: &[SeatId],
        requester: &RequesterId,
        ttl: Duration,
    ) -> Result<Hold, ReservationError> {
        self.acquire_at(show_id, seat_ids, requester, ttl, Utc::now())
    }

    pub(crate) fn acquire_at(
        &self,
        show_id: ShowId,
        seat_ids: &[SeatId],
        requester: &RequesterId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Hold, ReservationError> {
        let show = self.index.get(show_id).ok_or(ReservationError::ShowNotFound)?;
        let mut guard = lock(&show);

        if guard.retired {
            return Err(ReservationError::Validation(format!(
                "show {} is retired",
                show_id
            )));
        }

        let start_at = guard.start_at;
        let conflicts: Vec<SeatId> = seat_ids
            .iter()
            .filter(|id| match guard.seats.get(*id) {
                Some(state) => !state.is_claimable_at(now, start_at, self.reopen_window),
                // Unknown ids are caught by the engine's validation before
                // we get here; treat a miss as a conflict rather than panic.
                None => true,
            })
            .cloned()
            .collect();

        if !conflicts.is_empty() {
            debug!(show = %show_id, ?conflicts, "acquire rejected");
            return Err(ReservationError::Conflict { seats: conflicts });
        }

        let hold = Hold::new(show_id, seat_ids.to_vec(), requester.clone(), now, ttl);

        for id in seat_ids {
            // A seat we are taking over may sit under a lapsed hold; mark
            // that hold expired so its record matches reality.
            let stale = match guard.seats.get(id) {
                Some(SeatState::Held { hold_id, .. }) => Some(*hold_id),
                _ => None,
            };
            if let Some(stale) = stale {
                if let Some(prev) = guard.holds.get_mut(&stale) {
                    if prev.status == HoldStatus::Active {
                        prev.terminate(HoldStatus::Expired, now);
                    }
                }
            }
            guard.seats.insert(
                id.clone(),
                SeatState::Held {
                    hold_id: hold.id,
                    requester: requester.clone(),
                    expires_at: hold.expires_at,
                },
            );
        }
        guard.holds.insert(hold.id, hold.clone());
        drop(guard);

        self.index.route_hold(hold.id, show_id);
        info!(hold = %hold.id, show = %show_id, seats = seat_ids.len(), %requester, "hold acquired");
        Ok(hold)
    }

    /// Explicit early release. Idempotent: releasing an expired, consumed,
    /// or already-released hold is a no-op, and an unknown id is reported
    /// as such only so the engine can distinguish a bad handle.
    pub fn release(&self, hold_id: HoldId) -> Result<(), ReservationError> {
        self.release_at(hold_id, Utc::now())
    }

    pub(crate) fn release_at(
        &self,
        hold_id: HoldId,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        let show = self
            .index
            .locate_hold(hold_id)
            .ok_or(ReservationError::HoldNotFound)?;
        let mut guard = lock(&show);

        let hold = guard
            .holds
            .get_mut(&hold_id)
            .ok_or(ReservationError::HoldNotFound)?;

        match hold.status {
            HoldStatus::Active => {
                let next = if hold.expires_at <= now {
                    HoldStatus::Expired
                } else {
                    HoldStatus::Released
                };
                hold.terminate(next, now);
                let seats = hold.seats.clone();
                free_seats(&mut guard, hold_id, &seats);
                info!(hold = %hold_id, "hold released");
            }
            // Already terminal; nothing to free.
            HoldStatus::Expired | HoldStatus::Consumed | HoldStatus::Released => {}
        }
        Ok(())
    }

    /// Background sweep, two jobs: transition every hold past its expiry
    /// back to Available for its seats, and evict hold records that have
    /// been terminal for longer than the retention grace (along with
    /// their routing entries) so the maps stay bounded. Lazy
    /// expiry-on-read means correctness never depends on this having run;
    /// it makes status tables honest sooner and caps memory.
    pub fn reap(&self) -> usize {
        self.reap_at(Utc::now())
    }

    pub(crate) fn reap_at(&self, now: DateTime<Utc>) -> usize {
        let mut swept = 0;
        let mut evicted: Vec<HoldId> = Vec::new();
        let cutoff = now - self.terminal_retention;

        for show_id in self.index.show_ids() {
            let Some(show) = self.index.get(show_id) else {
                continue;
            };
            let mut guard = lock(&show);

            let lapsed: Vec<HoldId> = guard
                .holds
                .values()
                .filter(|h| h.status == HoldStatus::Active && h.expires_at <= now)
                .map(|h| h.id)
                .collect();

            for hold_id in lapsed {
                if let Some(hold) = guard.holds.get_mut(&hold_id) {
                    hold.terminate(HoldStatus::Expired, now);
                    let seats = hold.seats.clone();
                    free_seats(&mut guard, hold_id, &seats);
                    swept += 1;
                }
            }

            let stale: Vec<HoldId> = guard
                .holds
                .values()
                .filter(|h| h.status != HoldStatus::Active)
                .filter(|h| h.terminated_at.is_some_and(|t| t <= cutoff))
                .map(|h| h.id)
                .collect();
            for hold_id in &stale {
                guard.holds.remove(hold_id);
            }
            evicted.extend(stale);
        }

        self.index.unroute_holds(&evicted);
        if swept > 0 || !evicted.is_empty() {
            info!(swept, evicted = evicted.len(), "reaped holds");
        }
        swept
    }
}

/// Return the given hold's seats to Available, but only those still held
/// under it: a seat taken over after lazy expiry belongs to someone else.
fn free_seats(show: &mut Show, hold_id: HoldId, seats: &[SeatId]) {
    for id in seats {
        if matches!(show.seats.get(id), Some(SeatState::Held { hold_id: h, .. }) if *h == hold_id) {
            show.seats.insert(id.clone(), SeatState::Available);
        }
    }
}
