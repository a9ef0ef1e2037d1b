//! Bounded fixed-delay polling used while waiting for a credential

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tunedeck_shared_config::SessionConfig;

use crate::error::{SessionError, SessionResult};

/// Fixed-delay retry policy: one immediate check, then up to
/// `max_retries` further checks spaced `delay` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::fixed(config.token_wait_retries, config.token_wait_delay())
    }

    /// Total time spent sleeping before giving up
    pub fn budget(&self) -> Duration {
        self.delay * self.max_retries
    }

    /// Poll `probe` until it yields a value
    ///
    /// # Errors
    /// - `SessionError::TokenTimeout` once every retry has missed
    /// - `SessionError::Cancelled` if `cancel` fires while waiting
    pub async fn poll<T, F>(&self, cancel: &CancellationToken, mut probe: F) -> SessionResult<T>
    where
        F: FnMut() -> Option<T>,
    {
        let mut retries = 0;
        loop {
            if let Some(value) = probe() {
                return Ok(value);
            }
            if retries >= self.max_retries {
                return Err(SessionError::TokenTimeout {
                    attempts: retries + 1,
                    waited_ms: self.budget().as_millis() as u64,
                });
            }
            retries += 1;
            debug!(
                retry = retries,
                max_retries = self.max_retries,
                delay_ms = self.delay.as_millis() as u64,
                "Credential not ready, waiting"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(SessionError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
