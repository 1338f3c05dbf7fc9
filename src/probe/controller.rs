//! Probe controller: runs the diagnostic and turns its output into a verdict.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{BinariesConfig, MarkerConfig};
use crate::error::FailoverError;
use crate::observability::metrics;
use crate::process::command::probe_command;
use crate::process::{Capture, ManagedProcess, ProcessHandle, ProcessStatus, Received};

/// Availability verdict for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Available,
    Unavailable,
}

impl ProbeResult {
    pub fn is_available(&self) -> bool {
        matches!(self, ProbeResult::Available)
    }
}

/// Anything that can answer "is the source up right now?".
pub trait SourceProbe: Send {
    fn probe(
        &mut self,
        source: &str,
        timeout: Duration,
    ) -> impl Future<Output = ProbeResult> + Send;
}

/// Classify one diagnostic line. The success marker wins when both match.
pub fn classify_line(line: &str, markers: &MarkerConfig) -> Option<ProbeResult> {
    if line.contains(&markers.probe_success) {
        Some(ProbeResult::Available)
    } else if line.contains(&markers.probe_error) {
        Some(ProbeResult::Unavailable)
    } else {
        None
    }
}

/// Launches the diagnostic program and waits for a verdict.
#[derive(Debug, Clone)]
pub struct ProbeController {
    binaries: BinariesConfig,
    markers: MarkerConfig,
}

impl ProbeController {
    pub fn new(binaries: BinariesConfig, markers: MarkerConfig) -> Self {
        Self { binaries, markers }
    }

    /// Probe `source`, answering within `timeout`.
    pub async fn check(&self, source: &str, timeout: Duration) -> ProbeResult {
        let deadline = Instant::now() + timeout;
        tracing::info!(source, "Checking source");

        let command = probe_command(&self.binaries, source);
        let result = match ProcessHandle::launch("probe", &command, Capture::Stderr) {
            Ok(mut handle) => self.await_verdict(&mut handle, source, deadline).await,
            Err(e) => {
                tracing::error!(source, error = %FailoverError::from(e), "Probe could not start");
                ProbeResult::Unavailable
            }
        };

        metrics::record_probe(result.is_available());
        tracing::info!(source, result = ?result, "Probe finished");
        result
    }

    /// Drive an already launched diagnostic to a verdict by `deadline`.
    ///
    /// Every path that gives up on a running diagnostic sends it a
    /// termination request; none of them wait for it to exit. A failed exit
    /// only decides the verdict once its output has been read to the end.
    pub async fn await_verdict(
        &self,
        handle: &mut ProcessHandle,
        source: &str,
        deadline: Instant,
    ) -> ProbeResult {
        let started = Instant::now();

        loop {
            while let Some(line) = handle.lines().try_next() {
                if let Some(result) = self.verdict(handle, source, &line) {
                    return result;
                }
            }

            let status = handle.poll();
            if status.is_failure() {
                return self.settle_after_exit(handle, source, deadline, status).await;
            }

            match handle.lines().recv_until(deadline).await {
                Received::Line(line) => {
                    if let Some(result) = self.verdict(handle, source, &line) {
                        return result;
                    }
                }
                Received::Closed => {
                    let error = FailoverError::SourceUnavailable {
                        reason: "diagnostic output ended without a stream".to_string(),
                    };
                    tracing::warn!(source, error = %error, "Probe failed");
                    handle.terminate();
                    return ProbeResult::Unavailable;
                }
                Received::TimedOut => {
                    let error = FailoverError::ProbeTimeout {
                        timeout_ms: started.elapsed().as_millis(),
                    };
                    tracing::warn!(source, error = %error, "Probe failed");
                    handle.terminate();
                    return ProbeResult::Unavailable;
                }
            }
        }
    }

    /// Classify whatever the exited diagnostic wrote before it died.
    async fn settle_after_exit(
        &self,
        handle: &mut ProcessHandle,
        source: &str,
        deadline: Instant,
        status: ProcessStatus,
    ) -> ProbeResult {
        while let Received::Line(line) = handle.lines().recv_until(deadline).await {
            if let Some(result) = self.verdict(handle, source, &line) {
                return result;
            }
        }

        let error = FailoverError::SourceUnavailable {
            reason: format!("diagnostic exited with {:?}", status),
        };
        tracing::warn!(source, error = %error, "Probe failed");
        ProbeResult::Unavailable
    }

    fn verdict(&self, handle: &mut ProcessHandle, source: &str, line: &str) -> Option<ProbeResult> {
        let result = classify_line(line, &self.markers)?;
        match result {
            ProbeResult::Available => {
                tracing::info!(source, line, "Found stream");
                handle.terminate();
            }
            ProbeResult::Unavailable => {
                let error = FailoverError::SourceUnavailable {
                    reason: line.to_string(),
                };
                tracing::warn!(source, error = %error, "Probe failed");
                handle.terminate();
            }
        }
        Some(result)
    }
}

impl SourceProbe for ProbeController {
    fn probe(
        &mut self,
        source: &str,
        timeout: Duration,
    ) -> impl Future<Output = ProbeResult> + Send {
        let controller = self.clone();
        let source = source.to_string();
        async move { controller.check(&source, timeout).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markers() {
        let markers = MarkerConfig::default();
        assert_eq!(
            classify_line(
                "    Stream #0:0: Video: h264 (Baseline), yuv420p, 640x360",
                &markers
            ),
            Some(ProbeResult::Available)
        );
        assert_eq!(
            classify_line("rtmp://origin/live/in: Input/output error", &markers),
            Some(ProbeResult::Unavailable)
        );
        assert_eq!(
            classify_line("Server error: Failed to play stream", &markers),
            Some(ProbeResult::Unavailable)
        );
        assert_eq!(classify_line("Duration: N/A, start: 0.020000", &markers), None);
        // Case-sensitive, as the diagnostic prints it.
        assert_eq!(classify_line("Error opening input", &markers), None);
    }
}
