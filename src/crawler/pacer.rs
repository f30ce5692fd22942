//! Politeness pacing between requests
//!
//! The crawl keeps one request outstanding at a time and sleeps for a
//! uniformly random delay between requests to the target site.

use crate::config::CrawlerConfig;
use crate::crawler::Shutdown;
use rand::Rng;
use std::time::Duration;

/// Jittered delay inserted between consecutive requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    /// Creates a pacer; bounds are swapped if given in the wrong order
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        let (min, max) = config.delay_range();
        Self::new(min, max)
    }

    /// A pacer that never sleeps
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draws the next delay, uniform over `[min, max]` at millisecond granularity
    pub fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min == max {
            return self.min;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Sleeps for the next delay
    ///
    /// Returns `false` if shutdown was requested before the delay elapsed.
    pub async fn pause(&self, shutdown: &Shutdown) -> bool {
        let delay = self.next_delay();
        if delay.is_zero() {
            return !shutdown.is_triggered();
        }

        tracing::trace!("Sleeping {:?} before next request", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => !shutdown.is_triggered(),
            _ = shutdown.triggered() => false,
        }
    }
}
