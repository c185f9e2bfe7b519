use marquee_engine::ReservationEngine;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

/// Background hold reaper. Lazy expiry in the engine already keeps reads
/// honest; this sweep exists so abandoned holds free their seats in the
/// status tables promptly instead of at the next contended acquire.
pub async fn start_hold_reaper(engine: Arc<ReservationEngine>, interval_seconds: u64) {
    info!(interval_seconds, "hold reaper started");
    let mut ticker = interval(Duration::from_secs(interval_seconds.max(1)));
    loop {
        ticker.tick().await;
        let swept = engine.reap();
        if swept > 0 {
            debug!(swept, "reaper pass complete");
        }
    }
}
