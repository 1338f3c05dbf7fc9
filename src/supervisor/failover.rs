//! Failover control loop.
//!
//! # Responsibilities
//! - Gate startup on a successful probe, keeping one live placeholder meanwhile
//! - Watch the relay each interval and log its output
//! - On relay death, probe and switch between relay and placeholder
//! - Terminate the active process on a stop request
//!
//! # Design Decisions
//! - Single owner: the loop is the only code touching the state, no locks
//! - Only drains queues and polls exit status; the one wait on subprocess
//!   output is for a process already seen exited, bounded by a short grace
//! - No retry ceiling and no backoff: a dead relay is probed for every interval

use std::time::Duration;

use crate::config::RelayConfig;
use crate::error::FailoverError;
use crate::lifecycle::StopListener;
use crate::observability::metrics;
use crate::probe::{ProbeResult, SourceProbe};
use crate::process::{ManagedProcess, ProcessStatus};
use crate::supervisor::launcher::{ProcessLauncher, Role};
use crate::supervisor::state::{Mode, SupervisorState};

/// How long an exited process's readers get to deliver its last lines.
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Keeps either the relay or the placeholder publishing to the destination.
pub struct Supervisor<L: ProcessLauncher, S: SourceProbe> {
    launcher: L,
    probe: S,
    source: String,
    destination: String,
    interval: Duration,
    probe_timeout: Duration,
    relay_started_marker: String,
    state: SupervisorState<L::Process>,
    failures: u32,
}

impl<L: ProcessLauncher, S: SourceProbe> Supervisor<L, S> {
    pub fn new(config: &RelayConfig, launcher: L, probe: S) -> Self {
        Self {
            launcher,
            probe,
            source: config.stream.source.clone(),
            destination: config.stream.destination.clone(),
            interval: config.supervisor.interval(),
            probe_timeout: config.supervisor.probe_timeout(),
            relay_started_marker: config.markers.relay_started.clone(),
            state: SupervisorState::default(),
            failures: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn state(&self) -> &SupervisorState<L::Process> {
        &self.state
    }

    /// Relay failures since the relay last confirmed it started.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// True when a relay handle exists that has not been observed dead.
    pub fn relay_running(&self) -> bool {
        matches!(self.state, SupervisorState::MainActive { relay: Some(_) })
    }

    /// Run until a stop request arrives, then terminate the active process.
    ///
    /// Only returns with [`FailoverError::Interrupted`]; every other failure
    /// is absorbed into a transition.
    pub async fn run(mut self, mut stop: StopListener) -> Result<(), FailoverError> {
        tracing::info!(
            source = %self.source,
            destination = %self.destination,
            interval_secs = self.interval.as_secs(),
            probe_timeout_secs = self.probe_timeout.as_secs(),
            "Supervisor starting"
        );

        let result = self.supervise(&mut stop).await;
        self.stop();
        tracing::info!("Supervisor stopped");
        result
    }

    async fn supervise(&mut self, stop: &mut StopListener) -> Result<(), FailoverError> {
        self.start(stop).await?;
        loop {
            self.tick().await;
            pause(self.interval, stop).await?;
        }
    }

    /// Probe until the source is up, holding the placeholder while it is not.
    pub async fn start(&mut self, stop: &mut StopListener) -> Result<(), FailoverError> {
        loop {
            self.refresh_placeholder().await;
            self.recover().await;
            if self.relay_running() {
                tracing::info!(destination = %self.destination, "Relay active");
                return Ok(());
            }
            pause(self.interval, stop).await?;
        }
    }

    /// One control loop iteration, without the interval sleep.
    pub async fn tick(&mut self) {
        match self.state.mode() {
            Mode::PlaceholderActive => {
                self.refresh_placeholder().await;
                self.recover().await;
            }
            Mode::MainActive => self.watch_relay().await,
        }
    }

    /// Terminate whichever process currently owns the destination.
    pub fn stop(&mut self) {
        match &mut self.state {
            SupervisorState::MainActive { relay: Some(relay) } => relay.terminate(),
            SupervisorState::PlaceholderActive { placeholder } => placeholder.terminate(),
            SupervisorState::MainActive { relay: None } => {}
        }
    }

    /// Log the relay's output; on its death record a failure and recover.
    async fn watch_relay(&mut self) {
        let (status, lines) = match &mut self.state {
            SupervisorState::MainActive { relay: Some(relay) } => {
                let status = relay.poll();
                let lines = if status.is_running() {
                    relay.drain_lines()
                } else {
                    relay.drain_remaining(EXIT_DRAIN_GRACE).await
                };
                (Some(status), lines)
            }
            _ => (None, Vec::new()),
        };

        for line in lines {
            self.on_relay_line(&line);
        }

        match status {
            Some(ProcessStatus::Running) => return,
            Some(ProcessStatus::Exited(code)) => {
                self.state = SupervisorState::MainActive { relay: None };
                self.failures += 1;
                metrics::record_relay_exit();
                let error = FailoverError::RelayExited { code };
                tracing::error!(
                    error = %error,
                    failures = self.failures,
                    "Main stream not available"
                );
            }
            None => {
                self.failures += 1;
                tracing::error!(failures = self.failures, "Main stream not running");
            }
        }
        self.recover().await;
    }

    /// Log the placeholder's output and drop it once it has exited, so the
    /// next unavailable verdict launches a replacement.
    async fn refresh_placeholder(&mut self) {
        let SupervisorState::PlaceholderActive { placeholder } = &mut self.state else {
            return;
        };

        let status = placeholder.poll();
        let lines = if status.is_running() {
            placeholder.drain_lines()
        } else {
            placeholder.drain_remaining(EXIT_DRAIN_GRACE).await
        };
        for line in lines {
            tracing::debug!(process = "placeholder", "{}", line);
        }

        if !status.is_running() {
            tracing::warn!(status = ?status, "Placeholder exited");
            self.state = SupervisorState::MainActive { relay: None };
        }
    }

    fn on_relay_line(&mut self, line: &str) {
        if line.contains(&self.relay_started_marker) {
            self.failures = 0;
            tracing::info!(destination = %self.destination, "Stream has started");
        }
        tracing::info!(process = "relay", "{}", line);
    }

    async fn recover(&mut self) {
        let verdict = self.probe.probe(&self.source, self.probe_timeout).await;
        self.apply(verdict);
    }

    /// Transition on a probe verdict. Only called while the relay is down.
    fn apply(&mut self, verdict: ProbeResult) {
        let previous = std::mem::take(&mut self.state);
        self.state = match (verdict, previous) {
            (ProbeResult::Unavailable, SupervisorState::PlaceholderActive { placeholder }) => {
                tracing::debug!("Source still unavailable, placeholder already running");
                SupervisorState::PlaceholderActive { placeholder }
            }
            (ProbeResult::Unavailable, SupervisorState::MainActive { .. }) => {
                tracing::info!("Starting placeholder");
                match self.launcher.launch(Role::Placeholder) {
                    Ok(placeholder) => {
                        metrics::record_placeholder_launch();
                        metrics::record_active_role(false);
                        SupervisorState::PlaceholderActive { placeholder }
                    }
                    Err(e) => {
                        tracing::error!(error = %FailoverError::from(e), "Placeholder launch failed");
                        SupervisorState::MainActive { relay: None }
                    }
                }
            }
            (ProbeResult::Available, SupervisorState::PlaceholderActive { mut placeholder }) => {
                tracing::info!("Terminating placeholder");
                placeholder.terminate();
                self.launch_relay()
            }
            (ProbeResult::Available, SupervisorState::MainActive { .. }) => self.launch_relay(),
        };
    }

    fn launch_relay(&mut self) -> SupervisorState<L::Process> {
        match self.launcher.launch(Role::Relay) {
            Ok(relay) => {
                metrics::record_relay_launch();
                metrics::record_active_role(true);
                SupervisorState::MainActive { relay: Some(relay) }
            }
            Err(e) => {
                tracing::error!(error = %FailoverError::from(e), "Relay launch failed");
                SupervisorState::MainActive { relay: None }
            }
        }
    }
}

/// Sleep for `interval` unless a stop request arrives first.
async fn pause(interval: Duration, stop: &mut StopListener) -> Result<(), FailoverError> {
    tokio::select! {
        _ = tokio::time::sleep(interval) => Ok(()),
        reason = stop.requested() => {
            tracing::info!(%reason, "Supervisor stopping");
            Err(FailoverError::Interrupted(reason))
        }
    }
}
