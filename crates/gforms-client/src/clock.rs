//! Clock capability and the clock gate
//!
//! Certificate validation needs a trustworthy wall clock. The gate wraps the
//! external clock capability with a bounded, cooperative wait: it never
//! blocks past its timeout, and a `false` result means "proceed without
//! verified time" — degraded but non-fatal on platforms that do not anchor
//! certificate validation to wall-clock time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gforms_domain::constants::{CLOCK_SANITY_FLOOR_SECS, CLOCK_SYNC_POLL_MS};
use tracing::{debug, warn};

/// External wall-clock synchronization capability
#[async_trait]
pub trait ClockProvider: Send + Sync {
    /// Whether the clock currently reports a trustworthy time
    fn ready(&self) -> bool;

    /// Attempt one synchronization round (e.g. an NTP exchange)
    async fn sync(&self);
}

/// System clock, trusted once it is past a sanity floor
///
/// Hosts with an OS-managed clock need no explicit synchronization; the
/// floor guards against the epoch-start clocks seen on freshly booted
/// devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl ClockProvider for SystemClock {
    fn ready(&self) -> bool {
        Utc::now().timestamp() > CLOCK_SANITY_FLOOR_SECS
    }

    async fn sync(&self) {
        // the OS owns synchronization; nothing to drive here
    }
}

/// Wait until the clock reports ready or the timeout elapses
///
/// Returns the ready flag's final value. Yields between attempts so other
/// cooperative tasks keep running.
pub async fn ensure_clock_ready(clock: &dyn ClockProvider, timeout: Duration) -> bool {
    if clock.ready() {
        return true;
    }

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        clock.sync().await;
        if clock.ready() {
            debug!("clock synchronized");
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(timeout_ms = timeout.as_millis() as u64, "clock not ready before timeout");
            return clock.ready();
        }
        tokio::time::sleep(Duration::from_millis(CLOCK_SYNC_POLL_MS)).await;
    }
}
