use crate::section::GapMarker;
use marquee_shared::{Cents, SeatId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One physical seat. Immutable once the layout is generated; only its
/// status within a show changes, and that lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub section: String,
    pub row_label: String,
    pub column: u32,
    pub price: Cents,
}

/// Rendering metadata for one section, carried through so a seat-map
/// renderer can reproduce aisles without re-reading the layout input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub name: String,
    pub rows: u32,
    pub columns: u32,
    pub gaps: Vec<GapMarker>,
}

/// The immutable seat catalogue for a venue layout: a fixed arena of seats
/// in deterministic order, plus an index for O(1) lookup by id. Shared
/// read-only by every show; requires no locking.
#[derive(Debug, Clone)]
pub struct SeatCatalogue {
    seats: Vec<Seat>,
    index: HashMap<SeatId, usize>,
    sections: Vec<SectionInfo>,
}

impl SeatCatalogue {
    pub(crate) fn new(seats: Vec<Seat>, sections: Vec<SectionInfo>) -> Self {
        let index = seats
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            seats,
            index,
            sections,
        }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    pub fn get(&self, id: &SeatId) -> Option<&Seat> {
        self.index.get(id).map(|&i| &self.seats[i])
    }

    pub fn contains(&self, id: &SeatId) -> bool {
        self.index.contains_key(id)
    }

    pub fn seat_ids(&self) -> impl Iterator<Item = &SeatId> {
        self.seats.iter().map(|s| &s.id)
    }

    pub fn sections(&self) -> &[SectionInfo] {
        &self.sections
    }

    /// Sum of prices for the given seats. `None` if any id is unknown;
    /// callers validate ids before quoting a total.
    pub fn total_price<'a, I>(&self, ids: I) -> Option<Cents>
    where
        I: IntoIterator<Item = &'a SeatId>,
    {
        let mut total: Cents = 0;
        for id in ids {
            total += self.get(id)?.price;
        }
        Some(total)
    }
}
