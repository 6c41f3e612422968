//! Per-host fetch spacing.
//!
//! A strict minimum-interval gate, not a token bucket: for one host,
//! successive permits are separated by at least the configured interval,
//! measured start-to-start. Hosts are independent; an empty host string
//! bypasses the gate entirely.

use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Default minimum spacing between fetches to the same host.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Keyed minimum-spacing gate shared by all workers.
///
/// State is a concurrency-safe host-to-cell map owned by this struct; the
/// per-host read-modify-write is atomic, so concurrent `acquire` calls
/// from multiple workers still respect the spacing invariant. Entries for
/// idle hosts can be dropped with [`HostGate::evict_idle`].
pub struct HostGate {
    limiter: KeyedLimiter,
}

impl Default for HostGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl HostGate {
    /// Create a gate with the given per-host minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        // Quota period = spacing, burst of 1: no burst capacity.
        let quota = Quota::with_period(min_interval).expect("min_interval must be > 0");
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Suspend the caller until a fetch to `host` is allowed.
    ///
    /// Returns immediately for an empty host (unknown hosts are
    /// unlimited) and for the first contact with any host.
    pub async fn acquire(&self, host: &str) {
        if host.is_empty() {
            return;
        }
        self.limiter.until_key_ready(&host.to_string()).await;
    }

    /// Drop state for hosts that are no longer limited.
    ///
    /// Host cardinality is expected to stay small, but long-running
    /// deployments can call this periodically to keep the map bounded.
    pub fn evict_idle(&self) {
        self.limiter.retain_recent();
    }
}
