//! Line hand-off between stream readers and their controller.

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Producer side of a [`LineQueue`], cloned into each stream reader.
pub type LineSender = mpsc::UnboundedSender<String>;

/// Outcome of a deadline-bounded receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A completed line.
    Line(String),
    /// Every reader has finished and the queue is drained.
    Closed,
    /// The deadline passed with nothing queued.
    TimedOut,
}

/// Ordered, unbounded FIFO of completed lines owned by one consumer.
#[derive(Debug)]
pub struct LineQueue {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineQueue {
    /// Create a queue and the sender its readers push into.
    pub fn new() -> (LineSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Take the next line if one is queued. Never blocks.
    pub fn try_next(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Take every line queued right now. Never blocks.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    /// Wait for the next line until `deadline`.
    pub async fn recv_until(&mut self, deadline: Instant) -> Received {
        match tokio::time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(line)) => Received::Line(line),
            Ok(None) => Received::Closed,
            Err(_) => Received::TimedOut,
        }
    }
}
