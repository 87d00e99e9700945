//! Politeness delay between page fetches.

use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Waits between two consecutive page fetches.
#[async_trait]
pub trait DelayProvider {
    /// Wait, returning how long was waited.
    async fn pause(&self) -> Duration;
}

/// Sleeps for a uniformly random duration in `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(CrawlError::Config(format!(
                "min delay {:?} exceeds max delay {:?}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    fn pick(&self) -> Duration {
        let min = millis(self.min);
        let max = millis(self.max);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl DelayProvider for RandomDelay {
    async fn pause(&self) -> Duration {
        let delay = self.pick();
        debug!(delay_ms = millis(delay), "Politeness delay");
        tokio::time::sleep(delay).await;
        delay
    }
}
