//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → StopReason broadcast → supervisor terminates active process → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Stop requests are observed between iterations, never mid-probe, so a
//!   diagnostic is never abandoned without its termination request

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, StopListener, StopReason};
