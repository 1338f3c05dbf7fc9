//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events → console + log file)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Operator console, persistent log file
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - One event per line with a timestamp, on every sink
//! - Subprocess output is logged line by line as it is drained

pub mod logging;
pub mod metrics;
