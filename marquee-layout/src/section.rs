use marquee_shared::Cents;
use serde::{Deserialize, Serialize};

/// A seat position within a section, 1-based in both axes (row 1 is the
/// front row, column 1 the leftmost seat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatPosition {
    pub row: u32,
    pub column: u32,
}

/// Rendering-only spacing hint. A gap after row N (or column N) widens the
/// aisle when the map is drawn; it never changes which seats exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "axis", content = "after")]
pub enum GapMarker {
    Row(u32),
    Column(u32),
}

/// Structural input for one section of the venue, as supplied by the
/// venue-metadata collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,

    /// Price for every seat in this section, in cents.
    pub base_price: Cents,

    pub rows: u32,
    pub columns: u32,

    /// Positions that physically do not exist (pillars, wheelchair bays).
    /// Omitted from the catalogue entirely, not emitted as a status.
    #[serde(default)]
    pub removed: Vec<SeatPosition>,

    /// Spacing hints for renderers; ignored by the identity space.
    #[serde(default)]
    pub gaps: Vec<GapMarker>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, base_price: Cents, rows: u32, columns: u32) -> Self {
        Self {
            name: name.into(),
            base_price,
            rows,
            columns,
            removed: Vec::new(),
            gaps: Vec::new(),
        }
    }

    pub fn with_removed(mut self, removed: Vec<SeatPosition>) -> Self {
        self.removed = removed;
        self
    }

    pub fn with_gaps(mut self, gaps: Vec<GapMarker>) -> Self {
        self.gaps = gaps;
        self
    }
}
