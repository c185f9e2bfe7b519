use marquee_engine::ReservationEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
}
