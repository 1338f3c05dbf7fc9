//! Launching the relay and placeholder roles.

use std::fmt;

use crate::config::RelayConfig;
use crate::process::command::{placeholder_command, relay_command};
use crate::process::{Capture, CommandSpec, ManagedProcess, ProcessHandle, SpawnError};

/// The two long-running roles the supervisor switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Relay,
    Placeholder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Relay => write!(f, "relay"),
            Role::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Starts a process for a role.
pub trait ProcessLauncher: Send {
    type Process: ManagedProcess;

    fn launch(&mut self, role: Role) -> Result<Self::Process, SpawnError>;
}

/// Launches the configured transcoder commands, capturing stderr.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    relay: CommandSpec,
    placeholder: CommandSpec,
}

impl CommandLauncher {
    pub fn new(relay: CommandSpec, placeholder: CommandSpec) -> Self {
        Self { relay, placeholder }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            relay_command(&config.binaries, &config.stream),
            placeholder_command(&config.binaries, &config.stream),
        )
    }

    pub fn command(&self, role: Role) -> &CommandSpec {
        match role {
            Role::Relay => &self.relay,
            Role::Placeholder => &self.placeholder,
        }
    }
}

impl ProcessLauncher for CommandLauncher {
    type Process = ProcessHandle;

    fn launch(&mut self, role: Role) -> Result<ProcessHandle, SpawnError> {
        ProcessHandle::launch(role.to_string(), self.command(role), Capture::Stderr)
    }
}
