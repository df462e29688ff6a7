use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

// Deployment limits: 120 requests per client per hour
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60 * 60);
pub const RATE_LIMIT_MAX: usize = 120;

// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admit,
    // time until the oldest request in the window expires
    Deny { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_admit(&self) -> bool {
        matches!(self, RateLimitDecision::Admit)
    }
}

// per-client sliding window, admitted request times oldest first,
// expired ones dropped lazily on that client's next check
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check_now(&self, client_id: &str) -> RateLimitDecision {
        self.check(client_id, Instant::now())
    }

    /// Admit or deny one request from `client_id` at time `now`.
    ///
    /// `now` must not go backwards for a given client. The entry guard holds
    /// the shard lock for the whole prune/decide/append sequence, so two
    /// concurrent requests can never both take the last free slot.
    pub fn check(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let mut timestamps = self.windows.entry(client_id.to_string()).or_default();

        // drop everything at or before now - window
        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            let retry_after = match timestamps.front() {
                Some(&oldest) => self.window.saturating_sub(now.duration_since(oldest)),
                // only reachable with max_requests == 0
                None => self.window,
            };
            return RateLimitDecision::Deny { retry_after };
        }

        timestamps.push_back(now);
        RateLimitDecision::Admit
    }

    // number of clients that have ever been seen
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW)
    }
}
