// src/utils/throttle.rs

use std::time::Duration;

use tokio::time::Instant;

/// Lets one call through, then refuses further calls until `delay` has passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    blocked_until: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            blocked_until: None,
        }
    }

    /// Returns `true` if the caller may proceed, and starts a new quiet period.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        if self.blocked_until.is_some_and(|until| now < until) {
            return false;
        }
        self.blocked_until = Some(now + self.delay);
        true
    }
}
