use crate::hold::Hold;
use crate::status::SeatState;
use chrono::{DateTime, Utc};
use marquee_layout::SeatCatalogue;
use marquee_shared::{HoldId, SeatId, ShowId, ShowKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Per-show mutable state: the seat status table plus the holds that
/// reference it. Everything in here is only ever touched under the show's
/// mutex, which is what makes check-then-act a single atomic step.
#[derive(Debug)]
pub struct Show {
    pub id: ShowId,
    pub key: ShowKey,
    pub start_at: DateTime<Utc>,
    pub retired: bool,
    pub seats: HashMap<SeatId, SeatState>,
    pub holds: HashMap<HoldId, Hold>,
}

impl Show {
    fn new(key: ShowKey, catalogue: &SeatCatalogue) -> Self {
        let seats = catalogue
            .seat_ids()
            .map(|id| (id.clone(), SeatState::Available))
            .collect();
        Self {
            id: key.show_id(),
            start_at: key.start_at(),
            key,
            retired: false,
            seats,
            holds: HashMap::new(),
        }
    }
}

/// Maps (subject, date, time) triples to per-show status tables, creating
/// them on first access with every catalogue seat Available. The catalogue
/// itself is shared read-only; only the registry and the per-show tables
/// carry locks.
pub struct ShowIndex {
    catalogue: Arc<SeatCatalogue>,
    shows: RwLock<HashMap<ShowId, Arc<Mutex<Show>>>>,
    /// Routing only: which show a hold belongs to. The authoritative hold
    /// record lives inside the show, under the show mutex.
    hold_routes: RwLock<HashMap<HoldId, ShowId>>,
}

impl ShowIndex {
    pub fn new(catalogue: Arc<SeatCatalogue>) -> Self {
        Self {
            catalogue,
            shows: RwLock::new(HashMap::new()),
            hold_routes: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalogue(&self) -> &SeatCatalogue {
        &self.catalogue
    }

    /// Idempotent: the same triple always yields the same ShowId and the
    /// same underlying status table.
    pub fn get_or_create(&self, key: &ShowKey) -> ShowId {
        let id = key.show_id();
        {
            let shows = read(&self.shows);
            if shows.contains_key(&id) {
                return id;
            }
        }
        let mut shows = write(&self.shows);
        shows
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(Show::new(key.clone(), &self.catalogue))));
        id
    }

    pub fn get(&self, id: ShowId) -> Option<Arc<Mutex<Show>>> {
        read(&self.shows).get(&id).cloned()
    }

    pub fn show_ids(&self) -> Vec<ShowId> {
        read(&self.shows).keys().copied().collect()
    }

    /// Soft retirement: the show stops accepting new holds but keeps
    /// serving availability queries and keeps its bookings readable.
    /// Shows are never deleted while bookings reference them.
    pub fn retire(&self, id: ShowId) -> bool {
        match self.get(id) {
            Some(show) => {
                lock(&show).retired = true;
                true
            }
            None => false,
        }
    }

    pub fn route_hold(&self, hold_id: HoldId, show_id: ShowId) {
        write(&self.hold_routes).insert(hold_id, show_id);
    }

    /// Drop routing entries for holds whose records have been evicted.
    pub fn unroute_holds(&self, hold_ids: &[HoldId]) {
        if hold_ids.is_empty() {
            return;
        }
        let mut routes = write(&self.hold_routes);
        for id in hold_ids {
            routes.remove(id);
        }
    }

    /// Find the show a hold belongs to, if any.
    pub fn locate_hold(&self, hold_id: HoldId) -> Option<Arc<Mutex<Show>>> {
        let show_id = *read(&self.hold_routes).get(&hold_id)?;
        self.get(show_id)
    }

    /// Clone-out snapshot of a hold for callers outside the critical
    /// section (ownership checks, expiry display).
    pub fn hold_snapshot(&self, hold_id: HoldId) -> Option<Hold> {
        let show = self.locate_hold(hold_id)?;
        let guard = lock(&show);
        guard.holds.get(&hold_id).cloned()
    }
}

/// A poisoned mutex means a panic mid-transition somewhere else; the state
/// itself is still consistent (transitions are applied atomically), so
/// recover the guard rather than cascading the panic.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(l: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(l: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use marquee_layout::{generate, SectionSpec};

    fn index() -> ShowIndex {
        let catalogue = generate(&[SectionSpec::new("Gold", 100, 2, 3)]).unwrap();
        ShowIndex::new(Arc::new(catalogue))
    }

    fn key() -> ShowKey {
        ShowKey::new(
            "inception",
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let index = index();
        let a = index.get_or_create(&key());
        let b = index.get_or_create(&key());
        assert_eq!(a, b);
        assert_eq!(index.show_ids().len(), 1);
    }

    #[test]
    fn test_new_show_has_all_seats_available() {
        let index = index();
        let id = index.get_or_create(&key());
        let show = index.get(id).unwrap();
        let guard = lock(&show);
        assert_eq!(guard.seats.len(), 6);
        assert!(guard.seats.values().all(|s| *s == SeatState::Available));
    }

    #[test]
    fn test_retire_marks_show() {
        let index = index();
        let id = index.get_or_create(&key());
        assert!(index.retire(id));
        let show = index.get(id).unwrap();
        assert!(lock(&show).retired);
        assert!(!index.retire(ShowId::from(uuid::Uuid::new_v4())));
    }
}
