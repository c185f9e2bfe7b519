pub mod ids;
pub mod show;

pub use ids::{BookingId, HoldId, RequesterId, SeatId};
pub use show::{ShowId, ShowKey};

/// All prices are integer cents; no floats anywhere near money.
pub type Cents = i32;
