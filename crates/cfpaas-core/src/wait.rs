//! Post-deploy readiness polling with exponential backoff

use crate::client::PaasClient;
use crate::error::{PaasError, Result};
use crate::model::AppStatus;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Backoff settings for the readiness poll
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Total budget before the start is reported as failed
    pub timeout: Duration,

    /// Delay after the first unsuccessful poll
    pub initial_delay: Duration,

    /// Upper bound for a single delay
    pub max_delay: Duration,

    pub multiplier: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::model::DEFAULT_START_TIMEOUT_SECS),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            multiplier: 2.0,
        }
    }
}

impl ReadinessConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Poll the application status until it is running or the budget runs out
///
/// Platform errors end the wait immediately; only "not running yet" is retried.
pub async fn wait_until_running(
    client: &dyn PaasClient,
    name: &str,
    config: &ReadinessConfig,
) -> Result<()> {
    let started = Instant::now();
    // A budget too large to represent never expires
    let deadline = started.checked_add(config.timeout);
    let mut attempt = 0;

    loop {
        let status = client.status(name).await?;
        if status == AppStatus::Running {
            tracing::debug!("{} running after {} polls", name, attempt + 1);
            return Ok(());
        }
        tracing::debug!("{} is {}, waiting", name, status);

        let now = Instant::now();
        let mut delay = config.delay_for_attempt(attempt);
        if let Some(deadline) = deadline {
            if now >= deadline {
                return Err(PaasError::Timeout {
                    name: name.to_string(),
                    waited: now - started,
                });
            }
            delay = delay.min(deadline - now);
        }

        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_calculation() {
        let config = ReadinessConfig {
            timeout: Duration::from_secs(60),
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            multiplier: 2.0,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(3)); // capped at max
    }
}
