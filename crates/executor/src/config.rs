use std::time::Duration;

/// Configuration for the [`DispatchEngine`](crate::DispatchEngine).
///
/// Controls fan-out width and the deadlines applied to network-bound steps.
///
/// # Examples
///
/// ```
/// use herald_executor::ExecutorConfig;
///
/// let config = ExecutorConfig::default();
/// assert_eq!(config.max_concurrent, 16);
/// ```
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of sends in flight for one push. Enforced via a
    /// [`tokio::sync::Semaphore`]; values below 1 are treated as 1.
    pub max_concurrent: usize,
    /// Deadline for a single per-destination send.
    pub send_timeout: Duration,
    /// Deadline for the token check, including any credential exchange.
    pub token_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            send_timeout: Duration::from_secs(30),
            token_timeout: Duration::from_secs(15),
        }
    }
}

impl ExecutorConfig {
    /// Set the fan-out width.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set the per-destination send deadline.
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the token check deadline.
    #[must_use]
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }
}
