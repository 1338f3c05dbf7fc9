//! Failure taxonomy for the failover path.

use crate::lifecycle::StopReason;
use crate::process::SpawnError;

/// Everything that can go wrong while keeping the feed alive.
///
/// Only [`FailoverError::Interrupted`] ever leaves the supervisor; the other
/// variants are absorbed into a transition or a retry and exist so the
/// events are logged consistently.
#[derive(Debug, thiserror::Error)]
pub enum FailoverError {
    /// Probe found no stream, saw an error marker, or the diagnostic failed.
    #[error("Source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// Diagnostic produced no verdict before its deadline.
    #[error("Probe timed out after {timeout_ms} ms")]
    ProbeTimeout { timeout_ms: u128 },

    /// The relay process terminated.
    #[error("Relay exited with {}", describe_exit(.code))]
    RelayExited { code: Option<i32> },

    /// An external program could not be started.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// External stop request.
    #[error("Interrupted by {0} request")]
    Interrupted(StopReason),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal or unknown status".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FailoverError::RelayExited { code: Some(1) }.to_string(),
            "Relay exited with status 1"
        );
        assert_eq!(
            FailoverError::ProbeTimeout { timeout_ms: 250 }.to_string(),
            "Probe timed out after 250 ms"
        );
        assert_eq!(
            FailoverError::Interrupted(StopReason::Terminate).to_string(),
            "Interrupted by terminate request"
        );
    }
}
