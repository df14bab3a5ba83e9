//! # Configuration Management
//!
//! Centralized configuration for packets, the packet type registry and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Sizing
//! Packet capacity is normally chosen per network MTU. Packets never grow on their own,
//! so the default capacity here is what every producer starts from.

use crate::core::codec::PacketCodec;
use crate::core::packet::{Packet, HEADER_SIZE};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::PacketTypeRegistry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Bytes allocated for a packet (header included) when no capacity is given
pub const DEFAULT_PACKET_CAPACITY: usize = 1024;

/// Max allowed framed packet size (16 MB)
pub const MAX_PACKET_SIZE: usize = 16 * 1024 * 1024;

/// Identifier candidates tried before a registration is considered hopeless
pub const MAX_PROBE_ATTEMPTS: usize = 50;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetworkConfig {
    #[serde(default)]
    pub packet: PacketConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(val) = env_override("PACKET_REGISTRY_DEFAULT_CAPACITY")? {
            config.packet.default_capacity = val;
        }

        if let Some(val) = env_override("PACKET_REGISTRY_MAX_PACKET_SIZE")? {
            config.packet.max_packet_size = val;
        }

        if let Some(val) = env_override("PACKET_REGISTRY_PROBE_ATTEMPTS")? {
            config.registry.probe_attempts = val;
        }

        if let Some(val) = env_override("PACKET_REGISTRY_LOG_LEVEL")? {
            config.logging.log_level = val;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.packet.validate());
        errors.extend(self.registry.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn env_override<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ProtocolError::ConfigError(format!("Invalid value for {key}: {raw}"))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ProtocolError::ConfigError(format!("Failed to read {key}: {e}"))),
    }
}

/// Packet buffer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacketConfig {
    /// Bytes allocated for new packets, header included
    pub default_capacity: usize,

    /// Largest packet the stream codec accepts or emits
    pub max_packet_size: usize,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_PACKET_CAPACITY,
            max_packet_size: MAX_PACKET_SIZE,
        }
    }
}

impl PacketConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_capacity < HEADER_SIZE {
            errors.push(format!(
                "Default packet capacity too small: {} (must hold the {HEADER_SIZE}-byte header)",
                self.default_capacity
            ));
        }

        if self.max_packet_size < HEADER_SIZE {
            errors.push("Max packet size cannot be smaller than the packet header".to_string());
        } else if self.max_packet_size > 100 * 1024 * 1024 {
            errors.push(format!(
                "Max packet size too large: {} bytes (maximum recommended: 100 MB)",
                self.max_packet_size
            ));
        }

        if self.default_capacity > self.max_packet_size {
            errors.push("Default packet capacity cannot exceed max packet size".to_string());
        }

        errors
    }

    /// Allocate an empty packet with the configured capacity
    pub fn new_packet(&self) -> Result<Packet> {
        Packet::with_capacity(self.default_capacity)
    }

    /// Stream codec bounded by the configured max packet size
    pub fn codec(&self) -> PacketCodec {
        PacketCodec::new(self.max_packet_size)
    }
}

/// Packet type registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Identifier candidates tried per registration before giving up
    pub probe_attempts: usize,

    /// Whether sync tolerates local types the canonical table does not know about
    pub allow_extra_types: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            probe_attempts: MAX_PROBE_ATTEMPTS,
            allow_extra_types: true,
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.probe_attempts == 0 {
            errors.push("Probe attempts must be greater than 0".to_string());
        } else if self.probe_attempts > 10_000 {
            errors.push(format!(
                "Probe attempts too large: {} (maximum recommended: 10,000)",
                self.probe_attempts
            ));
        }

        errors
    }

    /// Build an empty registry with this configuration
    pub fn build_registry(&self) -> PacketTypeRegistry {
        PacketTypeRegistry::with_config(self)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,

    /// Whether to include the event target (module path)
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-registry"),
            log_level: Level::INFO,
            json_format: false,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
