//! Sliding-window rate limiting for indicator provider credentials.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Default provider allowance: five requests per rolling second per key.
pub const DEFAULT_MAX_REQUESTS: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Sliding-window limiter keyed by API credential.
///
/// Each credential tracks its own window, so rotating across keys
/// multiplies the effective request budget. [`acquire`](Self::acquire)
/// blocks until the caller may send without breaching the per-key
/// allowance.
pub struct KeyRateLimiter {
    max_requests: usize,
    window: Duration,
    recent: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl Default for KeyRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl KeyRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            // Zero would deadlock every caller, clamp to one.
            max_requests: max_requests.max(1),
            window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until a request slot is available for `credential`, then claim it.
    ///
    /// Timestamps that have aged a full window are evicted on every call,
    /// so a key's history never holds more than `max_requests` entries.
    /// The lock is released while sleeping; waiters re-contend for the
    /// freed slot when they wake.
    pub async fn acquire(&self, credential: &str) {
        loop {
            let wait_until = {
                let mut recent = self.recent.lock().await;
                let timestamps = recent.entry(credential.to_string()).or_default();
                let now = Instant::now();

                while timestamps
                    .front()
                    .is_some_and(|&t| now.duration_since(t) >= self.window)
                {
                    timestamps.pop_front();
                }

                if timestamps.len() < self.max_requests {
                    timestamps.push_back(now);
                    return;
                }

                // Window is full; wake when the oldest entry ages out.
                match timestamps.front().copied() {
                    Some(oldest) => oldest + self.window,
                    None => now,
                }
            };

            time::sleep_until(wait_until).await;
        }
    }
}
