//! Stop requests for the supervisor.
//!
//! # Responsibilities
//! - Record why the process is stopping
//! - Hand that reason to every listener

use std::fmt;

use tokio::sync::broadcast;

/// Why a stop was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Interrupt => write!(f, "interrupt"),
            StopReason::Terminate => write!(f, "terminate"),
        }
    }
}

/// Coordinator for stop requests.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<StopReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Listen for stop requests made after this call.
    pub fn subscribe(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Ask every listener to stop.
    pub fn trigger(&self, reason: StopReason) {
        tracing::info!(%reason, "Stop requested");
        let _ = self.tx.send(reason);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
pub struct StopListener {
    rx: broadcast::Receiver<StopReason>,
}

impl StopListener {
    /// Resolve with the reason of the next stop request.
    ///
    /// Never resolves once every [`Shutdown`] is gone.
    pub async fn requested(&mut self) -> StopReason {
        loop {
            match self.rx.recv().await {
                Ok(reason) => return reason,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    }
}
