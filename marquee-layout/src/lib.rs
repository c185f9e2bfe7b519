pub mod catalogue;
pub mod generator;
pub mod section;

pub use catalogue::{Seat, SeatCatalogue};
pub use generator::{generate, LayoutError};
pub use section::{GapMarker, SectionSpec, SeatPosition};
