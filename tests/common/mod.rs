//! Shared fakes for supervisor tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use live_relay::config::RelayConfig;
use live_relay::probe::{ProbeResult, SourceProbe};
use live_relay::process::{ManagedProcess, ProcessStatus, SpawnError};
use live_relay::supervisor::{ProcessLauncher, Role};

/// Test-side control over one fake process.
#[derive(Clone)]
pub struct ProcessControl {
    inner: Arc<Mutex<ControlState>>,
}

struct ControlState {
    status: ProcessStatus,
    lines: VecDeque<String>,
    /// Output still in the pipe when the exit is first seen.
    trailing: VecDeque<String>,
    terminations: u32,
}

impl ProcessControl {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControlState {
                status: ProcessStatus::Running,
                lines: VecDeque::new(),
                trailing: VecDeque::new(),
                terminations: 0,
            })),
        }
    }

    /// Make the process exit with `code`.
    pub fn exit(&self, code: i32) {
        self.inner.lock().unwrap().status = ProcessStatus::Exited(Some(code));
    }

    /// Queue a line of output.
    pub fn emit(&self, line: &str) {
        self.inner.lock().unwrap().lines.push_back(line.to_string());
    }

    /// Queue a line that only shows up after the exit has been observed.
    pub fn emit_trailing(&self, line: &str) {
        self.inner.lock().unwrap().trailing.push_back(line.to_string());
    }

    pub fn terminations(&self) -> u32 {
        self.inner.lock().unwrap().terminations
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().status.is_running()
    }
}

/// A process that only changes state when the test says so.
pub struct FakeProcess {
    control: ProcessControl,
}

impl ManagedProcess for FakeProcess {
    fn poll(&mut self) -> ProcessStatus {
        self.control.inner.lock().unwrap().status
    }

    fn terminate(&mut self) {
        let mut state = self.control.inner.lock().unwrap();
        state.terminations += 1;
        state.status = ProcessStatus::Exited(None);
    }

    fn drain_lines(&mut self) -> Vec<String> {
        self.control.inner.lock().unwrap().lines.drain(..).collect()
    }

    fn drain_remaining(&mut self, _grace: Duration) -> impl Future<Output = Vec<String>> + Send {
        let mut state = self.control.inner.lock().unwrap();
        let mut lines: Vec<String> = state.lines.drain(..).collect();
        lines.extend(state.trailing.drain(..));
        async move { lines }
    }
}

/// Records every launch; roles in `failing` fail to spawn.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launches: Arc<Mutex<Vec<(Role, ProcessControl)>>>,
    failing: Arc<Mutex<HashSet<Role>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, role: Role, failing: bool) {
        let mut roles = self.failing.lock().unwrap();
        if failing {
            roles.insert(role);
        } else {
            roles.remove(&role);
        }
    }

    pub fn count(&self, role: Role) -> usize {
        self.launches
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .count()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.launches.lock().unwrap().iter().map(|(r, _)| *r).collect()
    }

    /// Control for the most recent launch of `role`.
    pub fn last(&self, role: Role) -> ProcessControl {
        self.launches
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(r, _)| *r == role)
            .map(|(_, control)| control.clone())
            .expect("role never launched")
    }
}

impl ProcessLauncher for FakeLauncher {
    type Process = FakeProcess;

    fn launch(&mut self, role: Role) -> Result<FakeProcess, SpawnError> {
        if self.failing.lock().unwrap().contains(&role) {
            return Err(SpawnError::NotFound {
                program: role.to_string(),
            });
        }
        let control = ProcessControl::new();
        self.launches.lock().unwrap().push((role, control.clone()));
        Ok(FakeProcess { control })
    }
}

/// Answers probes from a script, then `Unavailable` once it runs dry.
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    script: Arc<Mutex<VecDeque<ProbeResult>>>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedProbe {
    pub fn new(results: &[ProbeResult]) -> Self {
        let probe = Self::default();
        probe.push(results);
        probe
    }

    pub fn push(&self, results: &[ProbeResult]) {
        self.script.lock().unwrap().extend(results.iter().copied());
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl SourceProbe for ScriptedProbe {
    fn probe(
        &mut self,
        _source: &str,
        _timeout: Duration,
    ) -> impl Future<Output = ProbeResult> + Send {
        *self.calls.lock().unwrap() += 1;
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeResult::Unavailable);
        async move { result }
    }
}

pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.stream.source = "rtmp://origin/live/in".into();
    config.stream.destination = "rtmp://edge/live/out".into();
    config.logging.file_path = None;
    config
}

/// Write a shell script into `dir` and return its path.
pub fn write_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// Formatted log output captured for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's `tracing` events into a fresh capture until the
    /// guard is dropped.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
