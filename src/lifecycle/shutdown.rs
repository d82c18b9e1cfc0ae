//! Shutdown coordination for the server.

use tokio::sync::broadcast;

/// Why the server is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// An OS signal (Ctrl+C / SIGTERM).
    Signal,
    /// A `POST /_shutdown` request.
    Shutdown,
    /// A `POST /_restart` request; the supervisor is expected to start the
    /// process again.
    Restart,
}

impl ShutdownReason {
    /// Process exit status for this reason. A restart exits with 75
    /// (`EX_TEMPFAIL`) so a supervisor can tell it from a plain stop.
    pub fn exit_code(self) -> u8 {
        match self {
            ShutdownReason::Signal | ShutdownReason::Shutdown => 0,
            ShutdownReason::Restart => 75,
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self, reason: ShutdownReason) {
        tracing::info!(reason = ?reason, "Shutdown triggered");
        let _ = self.tx.send(reason);
    }

    /// Number of tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_reason() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger(ShutdownReason::Restart);
        assert_eq!(a.recv().await.unwrap(), ShutdownReason::Restart);
        assert_eq!(b.recv().await.unwrap(), ShutdownReason::Restart);
    }

    #[test]
    fn test_restart_has_distinct_exit_code() {
        assert_eq!(ShutdownReason::Shutdown.exit_code(), 0);
        assert_eq!(ShutdownReason::Signal.exit_code(), 0);
        assert_ne!(ShutdownReason::Restart.exit_code(), 0);
    }
}
