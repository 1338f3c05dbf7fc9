//! Source availability probing.
//!
//! # Data Flow
//! ```text
//! probe(source, timeout):
//!     launch diagnostic (stderr → LineQueue)
//!     → wait for lines until the deadline
//!     → success marker       → Available (diagnostic signalled, not joined)
//!     → error marker         → Unavailable
//!     → non-zero exit/close  → Unavailable
//!     → deadline             → terminate diagnostic → Unavailable
//! ```
//!
//! # Design Decisions
//! - Verdicts come from free-form diagnostic text, so the deadline is the
//!   only guard against a diagnostic that never prints a recognizable line
//! - Waiting is a bounded receive on the queue, not a busy loop
//! - Exactly one verdict per call; no intermediate state survives it

pub mod controller;

pub use controller::{classify_line, ProbeController, ProbeResult, SourceProbe};
