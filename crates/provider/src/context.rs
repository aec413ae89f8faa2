use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Caller-supplied context passed to a push.
///
/// Cancelling the token stops the token exchange, aborts in-flight sends, and
/// turns every destination still waiting on the input into a `Cancelled`
/// result.
#[derive(Debug, Clone, Default)]
pub struct PushContext {
    cancel: CancellationToken,
}

impl PushContext {
    /// Create a context that is never cancelled unless [`cancel`](Self::cancel)
    /// is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Future that resolves once cancellation is requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}
