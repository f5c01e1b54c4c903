//! # Configuration Management Module
//!
//! Gateway configuration loaded from a TOML file, with defaults and
//! validation.
//!
//! ## Configuration Structure
//!
//! - [`GatewayConfig`] - station callsign
//! - [`WiresXConfig`] - display name, frequencies and reply delay
//! - [`ReflectorsConfig`] - hosts list and probe timing
//! - [`NetworkConfig`] - local and repeater UDP addresses
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wiresx::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("wiresx.toml").await?;
//!     config.validate()?;
//!     println!("Callsign: {}", config.gateway.callsign);
//!
//!     Config::create_default("wiresx.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [gateway]
//! callsign = "G4KLX"
//!
//! [wiresx]
//! name = "My Gateway"
//! uplink_hz = 438000000
//! downlink_hz = 430000000
//! reply_delay_ms = 1000
//!
//! [reflectors]
//! hosts_file = "YSFHosts.txt"
//! status_port = 0
//! probe_interval_secs = 30
//! liveness_secs = 700
//!
//! [network]
//! local_address = "127.0.0.1:42013"
//! repeater_address = "127.0.0.1:3200"
//!
//! [logging]
//! level = "info"
//! file = "wiresx.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::fs;

use crate::reflectors::DirectorySettings;
use crate::validation::validate_callsign;
use crate::wiresx::DEFAULT_REPLY_DELAY_MS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Station callsign without suffix. At most 10 characters.
    pub callsign: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiresXConfig {
    /// Display name shown to radios; also the source of the station id.
    pub name: String,
    pub uplink_hz: u32,
    pub downlink_hz: u32,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectorsConfig {
    pub hosts_file: String,
    /// Local port for status probes. 0 picks an ephemeral port.
    #[serde(default)]
    pub status_port: u16,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_liveness_secs")]
    pub liveness_secs: u64,
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_liveness_secs() -> u64 {
    700
}

impl ReflectorsConfig {
    pub fn settings(&self) -> DirectorySettings {
        DirectorySettings {
            probe_interval_ms: self.probe_interval_secs.saturating_mul(1000),
            liveness_ms: self.liveness_secs.saturating_mul(1000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub local_address: String,
    pub repeater_address: String,
}

impl NetworkConfig {
    pub fn local(&self) -> Result<SocketAddr> {
        self.local_address
            .parse()
            .map_err(|e| anyhow!("Invalid local_address {}: {}", self.local_address, e))
    }

    pub fn repeater(&self) -> Result<SocketAddr> {
        self.repeater_address
            .parse()
            .map_err(|e| anyhow!("Invalid repeater_address {}: {}", self.repeater_address, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub wiresx: WiresXConfig,
    pub reflectors: ReflectorsConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_callsign(&self.gateway.callsign)
            .map_err(|e| anyhow!("Invalid gateway.callsign: {}", e))?;

        if !self.wiresx.name.is_ascii() {
            return Err(anyhow!("wiresx.name must be plain ASCII"));
        }
        if self.wiresx.uplink_hz == 0 {
            return Err(anyhow!("wiresx.uplink_hz must be greater than zero"));
        }
        if self.wiresx.downlink_hz == 0 {
            return Err(anyhow!("wiresx.downlink_hz must be greater than zero"));
        }
        if self.reflectors.probe_interval_secs == 0 {
            return Err(anyhow!("reflectors.probe_interval_secs must be greater than zero"));
        }
        if self.reflectors.liveness_secs < self.reflectors.probe_interval_secs {
            return Err(anyhow!(
                "reflectors.liveness_secs ({}) is shorter than the probe interval ({})",
                self.reflectors.liveness_secs,
                self.reflectors.probe_interval_secs
            ));
        }

        self.network.local()?;
        self.network.repeater()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gateway: GatewayConfig {
                callsign: "N0CALL".to_string(),
            },
            wiresx: WiresXConfig {
                name: "YSF Gateway".to_string(),
                uplink_hz: 438_000_000,
                downlink_hz: 430_000_000,
                reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            },
            reflectors: ReflectorsConfig {
                hosts_file: "YSFHosts.txt".to_string(),
                status_port: 0,
                probe_interval_secs: default_probe_interval_secs(),
                liveness_secs: default_liveness_secs(),
            },
            network: NetworkConfig {
                local_address: "127.0.0.1:42013".to_string(),
                repeater_address: "127.0.0.1:3200".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("wiresx.log".to_string()),
            },
        }
    }
}
