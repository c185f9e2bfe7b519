use crate::error::ReservationError;
use crate::hold::HoldStatus;
use crate::show::{lock, read, write, ShowIndex};
use crate::status::SeatState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_shared::{BookingId, Cents, HoldId, RequesterId, SeatId, ShowId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// A permanent sale. Created only by consuming an active hold; immutable
/// afterwards (refund/cancellation is a separate flow, not built here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub show_id: ShowId,
    pub seats: Vec<SeatId>,
    pub requester: RequesterId,
    pub total_price: Cents,
    pub created_at: DateTime<Utc>,
}

/// Durable seam for the booking ledger. Bookings must survive process
/// restarts; holds deliberately don't (a lost hold just reopens seats).
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: BookingId,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_show(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository for tests and single-node development.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    rows: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        write(&self.rows).insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: BookingId,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(read(&self.rows).get(&id).cloned())
    }

    async fn list_for_show(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(read(&self.rows)
            .values()
            .filter(|b| b.show_id == show_id)
            .cloned()
            .collect())
    }
}

/// Converts active holds into permanent bookings. The in-memory transition
/// (seats to Booked, hold to Consumed) happens atomically under the show
/// mutex; the repository write runs outside it so the critical section
/// never blocks on I/O.
pub struct BookingStore {
    index: Arc<ShowIndex>,
    repo: Arc<dyn BookingRepository>,
}

impl BookingStore {
    pub fn new(index: Arc<ShowIndex>, repo: Arc<dyn BookingRepository>) -> Self {
        Self { index, repo }
    }

    pub fn repository(&self) -> &Arc<dyn BookingRepository> {
        &self.repo
    }

    pub async fn commit(&self, hold_id: HoldId) -> Result<Booking, ReservationError> {
        self.commit_at(hold_id, Utc::now()).await
    }

    pub(crate) async fn commit_at(
        &self,
        hold_id: HoldId,
        now: DateTime<Utc>,
    ) -> Result<Booking, ReservationError> {
        let show = self
            .index
            .locate_hold(hold_id)
            .ok_or(ReservationError::HoldNotFound)?;

        // Phase 1: validate and transition, atomically.
        let (booking, prior_expiry) = {
            let mut guard = lock(&show);

            let hold = guard
                .holds
                .get(&hold_id)
                .ok_or(ReservationError::HoldNotFound)?;

            match hold.status {
                HoldStatus::Active if hold.expires_at <= now => {
                    // Lapsed but not yet reaped: expire it now and free the
                    // seats so the caller's retry sees honest availability.
                    let seats = hold.seats.clone();
                    if let Some(h) = guard.holds.get_mut(&hold_id) {
                        h.terminate(HoldStatus::Expired, now);
                    }
                    for id in &seats {
                        if matches!(guard.seats.get(id), Some(SeatState::Held { hold_id: h, .. }) if *h == hold_id)
                        {
                            guard.seats.insert(id.clone(), SeatState::Available);
                        }
                    }
                    return Err(ReservationError::Expired);
                }
                HoldStatus::Active => {}
                HoldStatus::Expired | HoldStatus::Released => {
                    return Err(ReservationError::Expired)
                }
                HoldStatus::Consumed => {
                    return Err(ReservationError::Validation(
                        "hold was already consumed into a booking".to_string(),
                    ))
                }
            }

            // Seats must still be held under this exact hold. With lazy
            // expiry handled above this cannot fail for an active hold,
            // but a broken invariant must reject, never double-sell.
            let still_held = hold.seats.iter().all(|id| {
                matches!(guard.seats.get(id), Some(SeatState::Held { hold_id: h, .. }) if *h == hold_id)
            });
            if !still_held {
                return Err(ReservationError::Expired);
            }

            let total_price = self
                .index
                .catalogue()
                .total_price(hold.seats.iter())
                .ok_or_else(|| {
                    ReservationError::Validation("hold references unknown seats".to_string())
                })?;

            let booking = Booking {
                id: BookingId::generate(),
                show_id: hold.show_id,
                seats: hold.seats.clone(),
                requester: hold.requester.clone(),
                total_price,
                created_at: now,
            };
            let prior_expiry = hold.expires_at;

            for id in &booking.seats {
                guard.seats.insert(
                    id.clone(),
                    SeatState::Booked {
                        booking_id: booking.id,
                        booked_at: now,
                    },
                );
            }
            if let Some(h) = guard.holds.get_mut(&hold_id) {
                h.terminate(HoldStatus::Consumed, now);
            }

            (booking, prior_expiry)
        };

        // Phase 2: make it durable, outside the critical section. The
        // seats read as Booked meanwhile, so no competitor can interleave.
        if let Err(e) = self.repo.create(&booking).await {
            error!(hold = %hold_id, error = %e, "booking persistence failed, rolling back");
            let mut guard = lock(&show);
            for id in &booking.seats {
                guard.seats.insert(
                    id.clone(),
                    SeatState::Held {
                        hold_id,
                        requester: booking.requester.clone(),
                        expires_at: prior_expiry,
                    },
                );
            }
            if let Some(h) = guard.holds.get_mut(&hold_id) {
                h.status = HoldStatus::Active;
                h.terminated_at = None;
            }
            return Err(ReservationError::Storage(e.to_string()));
        }

        info!(
            booking = %booking.id,
            show = %booking.show_id,
            seats = booking.seats.len(),
            total = booking.total_price,
            "booking committed"
        );
        Ok(booking)
    }

    pub async fn get(&self, id: BookingId) -> Result<Option<Booking>, ReservationError> {
        self.repo
            .get(id)
            .await
            .map_err(|e| ReservationError::Storage(e.to_string()))
    }

    pub async fn list_for_show(&self, show_id: ShowId) -> Result<Vec<Booking>, ReservationError> {
        self.repo
            .list_for_show(show_id)
            .await
            .map_err(|e| ReservationError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::SeatLockManager;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use marquee_layout::{generate, SectionSpec};
    use marquee_shared::ShowKey;

    fn setup() -> (SeatLockManager, BookingStore, ShowId, Arc<ShowIndex>) {
        let catalogue = generate(&[SectionSpec::new("Gold", 150, 2, 3)]).unwrap();
        let index = Arc::new(ShowIndex::new(Arc::new(catalogue)));
        let key = ShowKey::new(
            "inception",
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        );
        let show_id = index.get_or_create(&key);
        let locks =
            SeatLockManager::new(index.clone(), Duration::minutes(30), Duration::minutes(10));
        let store = BookingStore::new(index.clone(), Arc::new(InMemoryBookingRepository::new()));
        (locks, store, show_id, index)
    }

    #[tokio::test]
    async fn test_commit_consumes_active_hold() {
        let (locks, store, show_id, index) = setup();
        let u1 = RequesterId::from("u1");

        let hold = locks
            .acquire(
                show_id,
                &[SeatId::from("Gold-A-1"), SeatId::from("Gold-A-2")],
                &u1,
                Duration::seconds(60),
            )
            .unwrap();

        let booking = store.commit(hold.id).await.unwrap();
        assert_eq!(booking.total_price, 300);
        assert_eq!(booking.requester, u1);

        let show = index.get(show_id).unwrap();
        let guard = lock(&show);
        assert!(matches!(
            guard.seats[&SeatId::from("Gold-A-1")],
            SeatState::Booked { .. }
        ));
        assert_eq!(guard.holds[&hold.id].status, HoldStatus::Consumed);
        drop(guard);

        // Durable.
        assert_eq!(store.get(booking.id).await.unwrap(), Some(booking));
    }

    #[tokio::test]
    async fn test_commit_on_expired_hold_is_rejected() {
        let (locks, store, show_id, index) = setup();
        let now = Utc::now();

        let hold = locks
            .acquire_at(
                show_id,
                &[SeatId::from("Gold-A-1")],
                &RequesterId::from("u1"),
                Duration::seconds(60),
                now,
            )
            .unwrap();

        let err = store
            .commit_at(hold.id, now + Duration::seconds(61))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Expired));

        // Seats freed as a side effect of the lazy expiry check.
        let show = index.get(show_id).unwrap();
        let guard = lock(&show);
        assert_eq!(guard.seats[&SeatId::from("Gold-A-1")], SeatState::Available);
    }

    #[tokio::test]
    async fn test_double_commit_is_rejected() {
        let (locks, store, show_id, _) = setup();

        let hold = locks
            .acquire(
                show_id,
                &[SeatId::from("Gold-B-1")],
                &RequesterId::from("u1"),
                Duration::seconds(60),
            )
            .unwrap();

        store.commit(hold.id).await.unwrap();
        let err = store.commit(hold.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_commit_on_released_hold_is_rejected() {
        let (locks, store, show_id, _) = setup();

        let hold = locks
            .acquire(
                show_id,
                &[SeatId::from("Gold-B-1")],
                &RequesterId::from("u1"),
                Duration::seconds(60),
            )
            .unwrap();
        locks.release(hold.id).unwrap();

        assert!(matches!(
            store.commit(hold.id).await.unwrap_err(),
            ReservationError::Expired
        ));
    }

    #[tokio::test]
    async fn test_unknown_hold() {
        let (_, store, _, _) = setup();
        assert!(matches!(
            store.commit(HoldId::generate()).await.unwrap_err(),
            ReservationError::HoldNotFound
        ));
    }

    struct FailingRepository;

    #[async_trait]
    impl BookingRepository for FailingRepository {
        async fn create(
            &self,
            _booking: &Booking,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("disk on fire".into())
        }

        async fn get(
            &self,
            _id: BookingId,
        ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(None)
        }

        async fn list_for_show(
            &self,
            _show_id: ShowId,
        ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back_to_held() {
        let catalogue = generate(&[SectionSpec::new("Gold", 150, 1, 2)]).unwrap();
        let index = Arc::new(ShowIndex::new(Arc::new(catalogue)));
        let key = ShowKey::new(
            "inception",
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        );
        let show_id = index.get_or_create(&key);
        let locks =
            SeatLockManager::new(index.clone(), Duration::minutes(30), Duration::minutes(10));
        let store = BookingStore::new(index.clone(), Arc::new(FailingRepository));

        let hold = locks
            .acquire(
                show_id,
                &[SeatId::from("Gold-A-1")],
                &RequesterId::from("u1"),
                Duration::seconds(60),
            )
            .unwrap();

        let err = store.commit(hold.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::Storage(_)));

        let show = index.get(show_id).unwrap();
        let guard = lock(&show);
        assert!(matches!(
            guard.seats[&SeatId::from("Gold-A-1")],
            SeatState::Held { hold_id, .. } if hold_id == hold.id
        ));
        assert_eq!(guard.holds[&hold.id].status, HoldStatus::Active);
    }
}
