//! Failover supervision subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (failover.rs):
//!     probe → Unavailable → placeholder (once) → wait interval → probe ...
//!           → Available   → terminate placeholder → relay → MainActive
//!
//! Every interval:
//!     relay running → drain lines → log, "started" marker resets failures
//!     relay dead    → count failure → probe → transition (state.rs)
//!     placeholder   → probe → transition (state.rs)
//! ```
//!
//! # Design Decisions
//! - Process launching and probing sit behind traits (launcher.rs,
//!   `probe::SourceProbe`) so the state machine runs against fakes in tests
//! - The two roles never publish together, except while a terminated
//!   placeholder is still shutting down

pub mod failover;
pub mod launcher;
pub mod state;

pub use failover::Supervisor;
pub use launcher::{CommandLauncher, ProcessLauncher, Role};
pub use state::{Mode, SupervisorState};
