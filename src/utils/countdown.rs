// src/utils/countdown.rs

use std::time::Duration;

use tokio::time::Instant;

/// A fixed cooldown measured against the tokio clock.
///
/// There is no background task: the remaining time is derived from the deadline on
/// every read, so dropping the owner is all the cleanup a closed dialog needs.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    pub fn start(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::start(Duration::from_secs(secs))
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up: what a "(5) Simpan" label shows.
    pub fn remaining_secs(&self) -> u64 {
        let millis = self.remaining().as_millis() as u64;
        millis.div_ceil(1000)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Resolves once the countdown reaches zero.
    pub async fn wait(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }
}
