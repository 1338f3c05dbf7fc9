//! Subprocess plumbing.
//!
//! # Data Flow
//! ```text
//! launch (handle.rs):
//!     CommandSpec (command.rs) → spawn with stdout/stderr piped
//!     → one reader task per captured stream
//!
//! reader task:
//!     read chunk → LineSplitter (splitter.rs) → completed lines
//!     → LineQueue (queue.rs) → owning controller drains
//! ```
//!
//! # Design Decisions
//! - One producer set and one consumer per queue; no locking beyond the channel
//! - Controllers never block on subprocess I/O, only on their queue with a deadline
//! - Termination is a signal, not a join

pub mod command;
pub mod handle;
pub mod queue;
pub mod splitter;

pub use command::CommandSpec;
pub use handle::{Capture, ManagedProcess, ProcessHandle, ProcessStatus, SpawnError};
pub use queue::{LineQueue, Received};
pub use splitter::LineSplitter;
