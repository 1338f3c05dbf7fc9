//! Subprocess handle with captured, line-split output.
//!
//! # Responsibilities
//! - Spawn a program with its output streams captured
//! - Run one reader task per captured stream, feeding a [`LineSplitter`]
//!   into the handle's [`LineQueue`]
//! - Report liveness without blocking and request termination without waiting
//!
//! # Design Decisions
//! - The exit status is recorded the first time it is observed
//! - `terminate()` sends SIGTERM and returns; the next `poll()` reflects exit
//! - Readers are detached: they outlive `launch()` and end on stream close

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::Instant;

use crate::process::command::CommandSpec;
use crate::process::queue::{LineQueue, LineSender, Received};
use crate::process::splitter::LineSplitter;

/// Read size for stream readers. Has no effect on the lines produced.
const READ_CHUNK_SIZE: usize = 4096;

/// Which output streams feed the handle's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Stdout,
    Stderr,
    Both,
}

impl Capture {
    fn stdout(self) -> bool {
        matches!(self, Capture::Stdout | Capture::Both)
    }

    fn stderr(self) -> bool {
        matches!(self, Capture::Stderr | Capture::Both)
    }
}

/// Liveness as seen by a non-blocking poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    /// Exit code, `None` when terminated by a signal.
    Exited(Option<i32>),
}

impl ProcessStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }

    /// True for an exit with a status other than zero, signals included.
    pub fn is_failure(&self) -> bool {
        matches!(self, ProcessStatus::Exited(code) if *code != Some(0))
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        ProcessStatus::Exited(status.code())
    }
}

/// Errors raised while launching a subprocess.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("Executable not found: {program}")]
    NotFound { program: String },

    #[error("Failed to spawn {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Common surface of a supervised process.
pub trait ManagedProcess: Send {
    /// Current liveness. Must not block.
    fn poll(&mut self) -> ProcessStatus;

    /// Request a graceful stop. Must not wait for exit.
    fn terminate(&mut self);

    /// Every line captured since the last drain.
    fn drain_lines(&mut self) -> Vec<String>;

    /// Every line still to come from an exited process, waiting at most
    /// `grace` for the readers to reach end of stream.
    fn drain_remaining(&mut self, grace: Duration) -> impl Future<Output = Vec<String>> + Send;
}

/// One launched subprocess.
#[derive(Debug)]
pub struct ProcessHandle {
    name: String,
    child: Child,
    lines: LineQueue,
    exit: Option<ProcessStatus>,
}

impl ProcessHandle {
    /// Spawn `command`, routing the selected streams into a fresh queue.
    pub fn launch(
        name: impl Into<String>,
        command: &CommandSpec,
        capture: Capture,
    ) -> Result<Self, SpawnError> {
        let name = name.into();
        let program = command.program.display().to_string();

        tracing::info!(process = %name, command = %command, "Launching process");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(if capture.stdout() { Stdio::piped() } else { Stdio::null() })
            .stderr(if capture.stderr() { Stdio::piped() } else { Stdio::null() })
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpawnError::NotFound { program: program.clone() }
                } else {
                    SpawnError::Io { program: program.clone(), source: e }
                }
            })?;

        let (tx, lines) = LineQueue::new();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(format!("{}/stdout", name), stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(format!("{}/stderr", name), stderr, tx);
        }

        tracing::debug!(process = %name, pid = ?child.id(), "Process started");

        Ok(Self {
            name,
            child,
            lines,
            exit: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS pid, `None` once the process has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// The queue fed by this process's readers.
    pub fn lines(&mut self) -> &mut LineQueue {
        &mut self.lines
    }
}

impl ManagedProcess for ProcessHandle {
    fn poll(&mut self) -> ProcessStatus {
        if let Some(status) = self.exit {
            return status;
        }

        match self.child.try_wait() {
            Ok(None) => ProcessStatus::Running,
            Ok(Some(status)) => {
                let status = ProcessStatus::from(status);
                tracing::debug!(process = %self.name, ?status, "Process exited");
                self.exit = Some(status);
                status
            }
            Err(e) => {
                tracing::warn!(process = %self.name, error = %e, "Failed to poll process, treating as exited");
                let status = ProcessStatus::Exited(None);
                self.exit = Some(status);
                status
            }
        }
    }

    fn terminate(&mut self) {
        if !self.poll().is_running() {
            return;
        }

        tracing::info!(process = %self.name, pid = ?self.child.id(), "Terminating process");

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                    tracing::warn!(process = %self.name, pid, error = %e, "Failed to send SIGTERM");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = self.child.start_kill() {
                tracing::warn!(process = %self.name, error = %e, "Failed to kill process");
            }
        }
    }

    fn drain_lines(&mut self) -> Vec<String> {
        self.lines.drain()
    }

    fn drain_remaining(&mut self, grace: Duration) -> impl Future<Output = Vec<String>> + Send {
        let deadline = Instant::now() + grace;
        async move {
            let mut lines = Vec::new();
            loop {
                match self.lines.recv_until(deadline).await {
                    Received::Line(line) => lines.push(line),
                    Received::Closed => break,
                    Received::TimedOut => {
                        tracing::debug!(process = %self.name, "Output still open after exit");
                        break;
                    }
                }
            }
            lines
        }
    }
}

/// Read `stream` to its end, pushing completed lines into `tx`.
fn spawn_reader<R>(label: String, mut stream: R, tx: LineSender)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut splitter = LineSplitter::new();
        let mut buf = vec![0u8; READ_CHUNK_SIZE];

        loop {
            let n = match stream.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(stream = %label, error = %e, "Stream read failed, closing");
                    0
                }
            };

            for line in splitter.consume(&buf[..n]) {
                // Receiver gone means the owner discarded the handle.
                let _ = tx.send(line);
            }

            if n == 0 {
                break;
            }
        }

        tracing::debug!(stream = %label, "Stream reader finished");
    });
}
