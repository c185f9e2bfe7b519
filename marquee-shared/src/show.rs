use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace for deterministic show-id derivation. Fixed forever: changing
/// it would orphan every existing hold and booking index.
const SHOW_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6d, 0x71, 0x75, 0x65, 0x65, 0x2d, 0x73, 0x68, 0x6f, 0x77, 0x2d, 0x6e, 0x73, 0x2d, 0x76, 0x31,
]);

/// A specific scheduled instance (subject + date + time). The same physical
/// seat is independently bookable per show, so everything downstream keys
/// off the derived [`ShowId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShowKey {
    pub subject_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl ShowKey {
    pub fn new(subject_id: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            subject_id: subject_id.into(),
            date,
            time,
        }
    }

    /// Deterministic id: equal (subject, date, time) triples always map to
    /// the same ShowId, so holds and bookings never fragment across
    /// equivalent lookups.
    pub fn show_id(&self) -> ShowId {
        let canonical = format!("{}|{}|{}", self.subject_id, self.date, self.time);
        ShowId(Uuid::new_v5(&SHOW_NAMESPACE, canonical.as_bytes()))
    }

    /// Show start instant in UTC, the anchor for the near-showtime reopen
    /// window.
    pub fn start_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(self.time))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowId(Uuid);

impl ShowId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ShowId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ShowKey {
        ShowKey::new(
            "inception",
            NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_show_id_is_deterministic() {
        assert_eq!(key().show_id(), key().show_id());
    }

    #[test]
    fn test_show_id_differs_per_triple() {
        let base = key();
        let other_time = ShowKey {
            time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            ..key()
        };
        let other_subject = ShowKey {
            subject_id: "dunkirk".to_string(),
            ..key()
        };
        assert_ne!(base.show_id(), other_time.show_id());
        assert_ne!(base.show_id(), other_subject.show_id());
    }

    #[test]
    fn test_start_at_combines_date_and_time() {
        let start = key().start_at();
        assert_eq!(start.to_rfc3339(), "2026-09-04T19:30:00+00:00");
    }
}
