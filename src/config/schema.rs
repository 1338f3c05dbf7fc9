//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the relay supervisor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Source and destination addressing.
    pub stream: StreamConfig,

    /// Control loop timing.
    pub supervisor: SupervisorConfig,

    /// Paths to the external programs.
    pub binaries: BinariesConfig,

    /// Output markers used to classify subprocess lines.
    pub markers: MarkerConfig,

    /// Log sinks.
    pub logging: LoggingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Source and destination URLs.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StreamConfig {
    /// Upstream feed (e.g., "rtmp://origin/live/key").
    pub source: String,

    /// Where the relay or placeholder publishes.
    pub destination: String,
}

/// Supervisor timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Seconds between control loop iterations.
    pub interval_secs: u64,

    /// Deadline for a single probe in seconds.
    pub probe_timeout_secs: u64,
}

impl SupervisorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            probe_timeout_secs: 10,
        }
    }
}

/// External program paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BinariesConfig {
    /// Transcoder used for the relay.
    pub ffmpeg: PathBuf,

    /// Diagnostic used for probing.
    pub ffprobe: PathBuf,

    /// Transcoder used for the placeholder feed.
    pub placeholder: PathBuf,
}

impl Default for BinariesConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("/usr/local/bin/ffmpeg"),
            ffprobe: PathBuf::from("/usr/local/bin/ffprobe"),
            placeholder: PathBuf::from("/usr/local/bin/ffmpeg"),
        }
    }
}

/// Literal substrings matched against subprocess output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Probe line naming the first video stream.
    pub probe_success: String,

    /// Probe line reporting a failure (case-sensitive).
    pub probe_error: String,

    /// Relay line confirming output has started.
    pub relay_started: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            probe_success: "Stream #0:0: Video".to_string(),
            probe_error: "error".to_string(),
            relay_started: "Press [q] to stop".to_string(),
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,

    /// Persistent log file, appended to. `None` disables the file sink.
    pub file_path: Option<PathBuf>,

    /// Mirror events to the console.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "live_relay=debug".to_string(),
            file_path: Some(PathBuf::from("encoder.log")),
            console: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [stream]
            source = "rtmp://origin/live/in"
            destination = "rtmp://edge/live/out"

            [supervisor]
            probe_timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.stream.source, "rtmp://origin/live/in");
        assert_eq!(config.supervisor.interval_secs, 1);
        assert_eq!(config.supervisor.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.markers.relay_started, "Press [q] to stop");
        assert_eq!(config.binaries.ffprobe, PathBuf::from("/usr/local/bin/ffprobe"));
    }
}
