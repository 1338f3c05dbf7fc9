//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub interval_secs: Option<u64>,
    pub probe_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    /// Write every set value into `config`.
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(source) = &self.source {
            config.stream.source = source.clone();
        }
        if let Some(destination) = &self.destination {
            config.stream.destination = destination.clone();
        }
        if let Some(secs) = self.interval_secs {
            config.supervisor.interval_secs = secs;
        }
        if let Some(secs) = self.probe_timeout_secs {
            config.supervisor.probe_timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    resolve_config(Some(path), &ConfigOverrides::default())
}

/// Build the effective configuration: file (or defaults), then overrides,
/// then validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<RelayConfig, ConfigError> {
    let config = read_config(path, overrides)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// File (or defaults) plus overrides, without semantic validation.
pub fn read_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    overrides.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [stream]
            source = "rtmp://origin/live/in"
            destination = "rtmp://edge/live/out"

            [supervisor]
            interval_secs = 5
            "#
        )
        .unwrap();

        let overrides = ConfigOverrides {
            interval_secs: Some(2),
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.stream.destination, "rtmp://edge/live/out");
        assert_eq!(config.supervisor.interval_secs, 2);
    }

    #[test]
    fn test_defaults_fail_without_addressing() {
        let err = resolve_config(None, &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 2));
        assert!(err.to_string().contains("stream.source must not be empty"));
    }

    #[test]
    fn test_overrides_alone_are_enough() {
        let overrides = ConfigOverrides {
            source: Some("rtmp://origin/live/in".into()),
            destination: Some("rtmp://edge/live/out".into()),
            ..Default::default()
        };
        assert!(resolve_config(None, &overrides).is_ok());
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream\nsource = 1").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
