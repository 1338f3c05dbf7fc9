//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the addressing the supervisor cannot run without
//! - Validate value ranges (interval and probe timeout > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.metrics_address is not a socket address: {value}")]
    MetricsAddress { value: String },
}

/// Check `config`, collecting every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("stream.source", config.stream.source.is_empty()),
        ("stream.destination", config.stream.destination.is_empty()),
        ("binaries.ffmpeg", config.binaries.ffmpeg.as_os_str().is_empty()),
        ("binaries.ffprobe", config.binaries.ffprobe.as_os_str().is_empty()),
        ("binaries.placeholder", config.binaries.placeholder.as_os_str().is_empty()),
        ("markers.probe_success", config.markers.probe_success.is_empty()),
        ("markers.probe_error", config.markers.probe_error.is_empty()),
        ("markers.relay_started", config.markers.relay_started.is_empty()),
    ];
    for (field, empty) in required {
        if empty {
            errors.push(ValidationError::Empty { field });
        }
    }

    if config.supervisor.interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "supervisor.interval_secs" });
    }
    if config.supervisor.probe_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "supervisor.probe_timeout_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress {
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.stream.source = "rtmp://origin/live/in".into();
        config.stream.destination = "rtmp://edge/live/out".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RelayConfig::default();
        config.supervisor.interval_secs = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Empty { field: "stream.source" },
                ValidationError::Empty { field: "stream.destination" },
                ValidationError::Zero { field: "supervisor.interval_secs" },
                ValidationError::MetricsAddress { value: "nowhere".into() },
            ]
        );
    }
}
