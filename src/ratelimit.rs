//! Per-user cooldown gate keyed by last-accepted-message time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The message is accepted; the user's last-seen time was recorded.
    Allowed,
    /// The user is still cooling down. `retry_after_secs` is the whole
    /// seconds remaining, rounded down, never negative.
    Limited { retry_after_secs: u64 },
}

/// Per-user cooldown gate.
///
/// Entries are never evicted; the map grows with distinct users for the
/// process lifetime and resets on restart.
pub struct RateLimiter {
    cooldown: Duration,
    last_seen: Mutex<HashMap<u64, Instant>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a message from `user_id` at `now` is within the
    /// cooldown window, recording `now` as last-seen only when allowed.
    pub fn check_and_record(&self, user_id: u64, now: Instant) -> RateDecision {
        let mut last_seen = self.last_seen.lock().expect("rate limit map poisoned");

        if let Some(last) = last_seen.get(&user_id) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.cooldown {
                let retry_after_secs = (self.cooldown - elapsed).as_secs();
                return RateDecision::Limited { retry_after_secs };
            }
        }

        last_seen.insert(user_id, now);
        RateDecision::Allowed
    }
}
