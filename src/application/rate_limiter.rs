//! Per-client admission control.
//!
//! Every client key owns an independent GCRA token bucket from `governor`.
//! Entries idle longer than the eviction window are swept lazily on each
//! [`ClientRateLimiter::admit`] call, so memory stays bounded without a
//! background task.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock, Reference};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use metrics::counter;
use parking_lot::Mutex;
use tracing::debug;

/// Default steady refill rate, tokens per second.
pub const DEFAULT_PER_SECOND: u32 = 10;

/// Default bucket size.
pub const DEFAULT_BURST: u32 = 20;

/// Default idle time after which a client entry is evicted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Rate limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_second: u32,
    pub burst: u32,
    pub idle_timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: DEFAULT_PER_SECOND,
            burst: DEFAULT_BURST,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Quota {
        let per_second = NonZeroU32::new(self.per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(per_second).allow_burst(burst)
    }
}

struct ClientEntry<C: Clock> {
    bucket: RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
    last_seen: C::Instant,
}

/// Token bucket per client key, guarded by a single map lock.
///
/// The lock covers the eviction sweep and the token check for one key, and is
/// never held across an `.await`.
pub struct ClientRateLimiter<C: Clock = DefaultClock> {
    clients: Mutex<HashMap<String, ClientEntry<C>>>,
    quota: Quota,
    idle_timeout: Duration,
    clock: C,
}

impl ClientRateLimiter<DefaultClock> {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock + Clone> ClientRateLimiter<C> {
    /// Creates a limiter reading time from `clock`.
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            quota: config.quota(),
            idle_timeout: config.idle_timeout,
            clock,
        }
    }

    /// Consumes one token for `client_key`. Returns `false` when the bucket is empty.
    pub fn admit(&self, client_key: &str) -> bool {
        let now = self.clock.now();
        let mut clients = self.clients.lock();

        let before = clients.len();
        clients.retain(|_, entry| Duration::from(now.duration_since(entry.last_seen)) <= self.idle_timeout);
        let evicted = before - clients.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle rate limiter entries");
        }

        let entry = clients
            .entry(client_key.to_owned())
            .or_insert_with(|| ClientEntry {
                bucket: RateLimiter::direct_with_clock(self.quota, self.clock.clone()),
                last_seen: now,
            });
        entry.last_seen = now;

        let allowed = entry.bucket.check().is_ok();
        if !allowed {
            counter!("rate_limited_total").increment(1);
        }
        allowed
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}
