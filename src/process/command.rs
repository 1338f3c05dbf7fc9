//! Command lines for the external programs.
//!
//! Commands are argument vectors, never shell strings, so URLs are passed
//! through untouched.

use std::fmt;
use std::path::PathBuf;

use crate::config::schema::{BinariesConfig, StreamConfig};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Stream copy from the source to the destination, no re-encoding.
pub fn relay_command(binaries: &BinariesConfig, stream: &StreamConfig) -> CommandSpec {
    CommandSpec::new(&binaries.ffmpeg)
        .arg("-i")
        .arg(&stream.source)
        .args(["-map", "0", "-c:v", "copy", "-c:a", "copy", "-f", "flv"])
        .arg(&stream.destination)
}

/// Diagnostic run against the source.
pub fn probe_command(binaries: &BinariesConfig, source: &str) -> CommandSpec {
    CommandSpec::new(&binaries.ffprobe).arg(source)
}

/// SMPTE colour bars pushed to the destination.
pub fn placeholder_command(binaries: &BinariesConfig, stream: &StreamConfig) -> CommandSpec {
    CommandSpec::new(&binaries.placeholder)
        .args([
            "-re", "-f", "lavfi", "-i", "smptebars", "-s", "640x360", "-g", "25", "-c:v",
            "libx264", "-b:v", "500k", "-an", "-f", "flv",
        ])
        .arg(&stream.destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> StreamConfig {
        StreamConfig {
            source: "rtmp://origin/live/in".into(),
            destination: "rtmp://edge/live/out".into(),
        }
    }

    #[test]
    fn test_relay_flags() {
        let cmd = relay_command(&BinariesConfig::default(), &stream());
        assert_eq!(
            cmd.to_string(),
            "/usr/local/bin/ffmpeg -i rtmp://origin/live/in -map 0 -c:v copy -c:a copy -f flv rtmp://edge/live/out"
        );
    }

    #[test]
    fn test_placeholder_flags() {
        let cmd = placeholder_command(&BinariesConfig::default(), &stream());
        assert_eq!(
            cmd.to_string(),
            "/usr/local/bin/ffmpeg -re -f lavfi -i smptebars -s 640x360 -g 25 -c:v libx264 -b:v 500k -an -f flv rtmp://edge/live/out"
        );
    }

    #[test]
    fn test_url_with_spaces_stays_one_argument() {
        let cmd = probe_command(&BinariesConfig::default(), "rtmp://origin/live/a b");
        assert_eq!(cmd.args, vec!["rtmp://origin/live/a b"]);
    }
}
