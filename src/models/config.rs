use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Directionality of flow accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMode {
    /// One record per directional stream ("u")
    Unidirectional,
    /// One record per connection with forward/backward sub-counters ("b")
    Bidirectional,
}

impl FlowMode {
    /// Mode used when the caller gives no valid direction
    pub const DEFAULT: FlowMode = FlowMode::Unidirectional;

    /// Validate a direction flag, falling back to [`FlowMode::DEFAULT`]
    pub fn from_flag(flag: Option<&str>) -> Self {
        let mode = match flag {
            Some("u") => FlowMode::Unidirectional,
            Some("b") => FlowMode::Bidirectional,
            other => {
                warn!(
                    "Invalid or missing flow direction {:?}, packets will be organized into flows in one-direction",
                    other
                );
                return Self::DEFAULT;
            }
        };

        match mode {
            FlowMode::Unidirectional => info!("Packets will be organized into flows in one-direction"),
            FlowMode::Bidirectional => info!("Packets will be organized into flows in bi-direction"),
        }
        mode
    }
}

impl fmt::Display for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowMode::Unidirectional => write!(f, "u"),
            FlowMode::Bidirectional => write!(f, "b"),
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// Where packets come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PacketSource {
    /// Offline capture file
    File(PathBuf),
    /// Live capture interface
    Interface(String),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Flow accounting mode
    pub mode: FlowMode,

    /// Packet source for this run
    pub source: PacketSource,

    /// Enable promiscuous mode (live capture only)
    pub promiscuous: bool,

    /// Snapshot length for live capture
    pub snaplen: i32,

    /// Read timeout of the live capture handle
    pub timeout_ms: i32,

    /// BPF filter expression
    pub filter: Option<String>,

    /// Report format
    pub format: OutputFormat,

    /// Report destination, stdout when unset
    pub output: Option<PathBuf>,
}

impl AppConfig {
    /// Read timeout used when the configured one would block forever
    pub const DEFAULT_TIMEOUT_MS: i32 = 100;

    /// Read timeout handed to libpcap.
    ///
    /// A zero timeout makes libpcap wait indefinitely on a quiet interface,
    /// so the capture loop would never see the stop flag.
    pub fn read_timeout_ms(&self) -> i32 {
        if self.timeout_ms > 0 {
            self.timeout_ms
        } else {
            Self::DEFAULT_TIMEOUT_MS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_direction_flags() {
        assert_eq!(FlowMode::from_flag(Some("u")), FlowMode::Unidirectional);
        assert_eq!(FlowMode::from_flag(Some("b")), FlowMode::Bidirectional);
    }

    #[test]
    fn test_invalid_direction_falls_back_to_default() {
        assert_eq!(FlowMode::from_flag(Some("x")), FlowMode::DEFAULT);
        assert_eq!(FlowMode::from_flag(Some("B")), FlowMode::DEFAULT);
        assert_eq!(FlowMode::from_flag(None), FlowMode::Unidirectional);
    }

    #[test]
    fn test_read_timeout_is_always_positive() {
        let mut config = AppConfig {
            mode: FlowMode::DEFAULT,
            source: PacketSource::Interface("eth0".to_string()),
            promiscuous: false,
            snaplen: 65535,
            timeout_ms: 0,
            filter: None,
            format: OutputFormat::Table,
            output: None,
        };
        assert_eq!(config.read_timeout_ms(), AppConfig::DEFAULT_TIMEOUT_MS);

        config.timeout_ms = -1;
        assert_eq!(config.read_timeout_ms(), AppConfig::DEFAULT_TIMEOUT_MS);

        config.timeout_ms = 20;
        assert_eq!(config.read_timeout_ms(), 20);
    }
}
