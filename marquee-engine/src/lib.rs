pub mod booking;
pub mod engine;
pub mod error;
pub mod hold;
pub mod lock;
pub mod show;
pub mod status;

pub use booking::{Booking, BookingRepository, BookingStore, InMemoryBookingRepository};
pub use engine::{EngineRules, ReservationEngine};
pub use error::ReservationError;
pub use hold::{Hold, HoldStatus};
pub use lock::SeatLockManager;
pub use show::{Show, ShowIndex};
pub use status::{DisplayStatus, SeatState};

pub type EngineResult<T> = Result<T, ReservationError>;
