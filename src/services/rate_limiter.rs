//! Rate limiting for inbound lookups and outbound provider calls
//!
//! [SlidingWindowLimiter] admits caller requests against a trailing time
//! window per caller identity. [RateLimitedClient] paces outbound HTTP
//! requests so a large cast fan-out does not flood the provider.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{Client, Response};
use tracing::debug;

/// Default sliding window width for caller admission
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Default number of admissions allowed inside one window
pub const DEFAULT_MAX_REQUESTS: usize = 30;

/// Checks between sweeps of idle caller histories
pub const SWEEP_INTERVAL: usize = 1024;

/// Configuration for caller admission
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub window: Duration,
    pub max_requests: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

/// Per-caller sliding window admission control.
///
/// Each caller has its own history of admission timestamps. Histories are
/// held in a sharded map; two checks racing on the same caller are applied
/// one after the other under that shard's lock. Every [SWEEP_INTERVAL]
/// checks, callers with nothing left inside the window are forgotten.
pub struct SlidingWindowLimiter {
    config: AdmissionConfig,
    windows: DashMap<String, VecDeque<Instant>>,
    checks: AtomicUsize,
}

impl SlidingWindowLimiter {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            checks: AtomicUsize::new(0),
        }
    }

    /// Check and record an admission for `caller` at the current instant.
    pub fn check(&self, caller: &str) -> bool {
        self.check_at(caller, Instant::now())
    }

    /// Check and record an admission for `caller` at `now`.
    ///
    /// Timestamps at or beyond the window are dropped first. The request is
    /// admitted iff fewer than `max_requests` remain, and only admitted
    /// requests are appended to the history.
    pub fn check_at(&self, caller: &str, now: Instant) -> bool {
        let admitted = self.admit(caller, now);

        let checks = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if checks % SWEEP_INTERVAL == 0 {
            self.evict_idle_at(now);
        }
        admitted
    }

    fn admit(&self, caller: &str, now: Instant) -> bool {
        let mut history = self.windows.entry(caller.to_string()).or_default();
        self.prune(&mut history, now);

        if history.len() >= self.config.max_requests {
            debug!(caller = %caller, recent = history.len(), "Request rejected by rate limiter");
            let empty = history.is_empty();
            drop(history);
            if empty {
                self.windows.remove_if(caller, |_, h| h.is_empty());
            }
            return false;
        }

        history.push_back(now);
        true
    }

    fn prune(&self, history: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = history.front() {
            if now.saturating_duration_since(*oldest) >= self.config.window {
                history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Forget every caller whose admissions have all left the window.
    pub fn evict_idle_at(&self, now: Instant) {
        self.windows.retain(|_, history| {
            self.prune(history, now);
            !history.is_empty()
        });
    }

    /// Number of callers with a remembered history.
    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }

    /// Number of admissions currently remembered for `caller`.
    pub fn recent_count(&self, caller: &str) -> usize {
        self.windows.get(caller).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(AdmissionConfig::default())
    }
}

/// Configuration for outbound request pacing
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst capacity (allows short bursts above the rate)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 40,
            burst_size: 40,
        }
    }
}

/// A rate-limited HTTP client wrapper
pub struct RateLimitedClient {
    client: Client,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    name: String,
}

impl RateLimitedClient {
    /// Create a new rate-limited client
    pub fn new(name: &str, config: RateLimitConfig) -> reqwest::Result<Self> {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            limiter: Arc::new(RateLimiter::direct(quota)),
            name: name.to_string(),
        })
    }

    /// Wait for rate limit and make a GET request with query parameters
    pub async fn get_with_query<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        query: &T,
    ) -> reqwest::Result<Response> {
        self.limiter.until_ready().await;
        debug!(client = %self.name, url = %url, "Making rate-limited GET request");

        self.client.get(url).query(query).send().await
    }
}
