//! Live stream relay with placeholder failover.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod process;
pub mod supervisor;

pub use config::schema::RelayConfig;
pub use error::FailoverError;
pub use lifecycle::{Shutdown, StopReason};
pub use probe::{ProbeController, ProbeResult};
pub use supervisor::Supervisor;
