//! Launch pacing: a per-second cap on probe starts shared by every worker of a scan.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Caps how many probes may be launched per second.
///
/// Every caller of [`RateLimiter::acquire`] waits for its own tick of a shared interval,
/// so the cap holds across all workers of a scan.
pub struct RateLimiter {
    ticker: Mutex<Interval>,
    per_sec: u32,
}

impl RateLimiter {
    /// Must be called from within a tokio runtime.
    pub fn new(per_sec: u32) -> Self {
        let per_sec = per_sec.max(1);
        let period = Duration::from_micros(1_000_000 / u64::from(per_sec));
        let mut ticker = interval(period.max(Duration::from_micros(1)));
        // no catch-up bursts after a stall
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        RateLimiter { ticker: Mutex::new(ticker), per_sec }
    }

    /// Returns `None` when pacing is disabled (`0`).
    pub fn from_qps(qps: u32) -> Option<Self> {
        if qps == 0 { None } else { Some(Self::new(qps)) }
    }

    pub fn per_sec(&self) -> u32 {
        self.per_sec
    }

    /// Wait until the next launch slot; returns when it was granted.
    pub async fn acquire(&self) -> Instant {
        self.ticker.lock().await.tick().await
    }
}
