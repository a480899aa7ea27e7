//! Probe configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings a `ServiceProbe` starts from.
///
/// Every field has a default so suite files only name what they change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// OGC endpoint under test; empty until set
    #[serde(default)]
    pub service_url: String,
    /// Version sent with WFS GetCapabilities
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Version sent with WMS GetCapabilities and GetMap
    #[serde(default = "default_wms_version")]
    pub wms_version: String,
    #[serde(default)]
    pub image_size_rounding: KilobyteRounding,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Send GetMap to the endpoint advertised in the WMS capabilities
    /// instead of `service_url`, when one is advertised
    #[serde(default)]
    pub follow_advertised_getmap_url: bool,
}

fn default_protocol_version() -> String {
    "1.1.0".to_string()
}

fn default_wms_version() -> String {
    "1.1.1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            protocol_version: default_protocol_version(),
            wms_version: default_wms_version(),
            image_size_rounding: KilobyteRounding::default(),
            timeout_secs: default_timeout_secs(),
            follow_advertised_getmap_url: false,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be > 0");
        }
        Ok(())
    }
}

/// How image byte lengths become kilobytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KilobyteRounding {
    /// Any partial kilobyte counts as a whole one
    #[default]
    Ceil,
    Floor,
}

impl KilobyteRounding {
    pub fn kilobytes(self, bytes: usize) -> u64 {
        let bytes = bytes as u64;
        match self {
            KilobyteRounding::Ceil => bytes.div_ceil(1024),
            KilobyteRounding::Floor => bytes / 1024,
        }
    }
}
