//! Supervisor state machine.
//!
//! # States
//! - MainActive: the relay owns the destination
//! - PlaceholderActive: colour bars own the destination
//!
//! # State Transitions
//! ```text
//! MainActive → PlaceholderActive: relay dead, probe Unavailable
//! PlaceholderActive → MainActive: probe Available (placeholder terminated first)
//! MainActive → MainActive: relay dead, probe Available (relay replaced)
//! PlaceholderActive → PlaceholderActive: probe Unavailable (no new launch)
//! ```
//!
//! # Design Decisions
//! - The state owns its handles, so at most one relay and one placeholder exist
//! - Probing is an action taken on a transition, not a state

/// Which role currently owns the destination, with its handle.
#[derive(Debug)]
pub enum SupervisorState<P> {
    /// `relay` is `None` once observed dead or when its launch failed.
    MainActive { relay: Option<P> },
    PlaceholderActive { placeholder: P },
}

impl<P> SupervisorState<P> {
    pub fn mode(&self) -> Mode {
        match self {
            SupervisorState::MainActive { .. } => Mode::MainActive,
            SupervisorState::PlaceholderActive { .. } => Mode::PlaceholderActive,
        }
    }
}

impl<P> Default for SupervisorState<P> {
    fn default() -> Self {
        SupervisorState::MainActive { relay: None }
    }
}

/// Handle-free view of [`SupervisorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    MainActive,
    PlaceholderActive,
}
