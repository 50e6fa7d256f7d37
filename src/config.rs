//! Collector configuration.
//!
//! Everything is optional; an empty JSON object yields the default policy
//! (every up, non-loopback interface; gateways via `route -n`; link state via
//! ethtool; protocol statistics on).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Measurement name every record is emitted under.
pub const MEASUREMENT: &str = "smnet";

pub const DESCRIPTION: &str = "Read metrics about network interface usage";

/// Annotated starting point for a configuration file.
///
/// By default every up interface except loopback is gathered. Setting
/// `interfaces` gathers exactly those names (globs such as `eth*`, `en[0-9]`
/// or `{eth,wlan}0` are accepted) regardless of status. Setting
/// `ignore_protocol_stats` skips the system-wide `interface = "all"` record.
/// `gateway_source` is one of `route_command`, `proc_route` or `disabled`.
pub const SAMPLE_CONFIG: &str = r#"{
  "interfaces": ["eth0"],
  "ignore_protocol_stats": false,
  "gateway_source": "route_command",
  "route_command": ["route", "-n"],
  "route_timeout_ms": 5000,
  "link_state": true
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewaySource {
    #[default]
    RouteCommand,
    ProcRoute,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmNetConfig {
    /// Interface names or globs. Empty means the default up/non-loopback policy.
    pub interfaces: Vec<String>,
    pub ignore_protocol_stats: bool,
    /// With an empty allow-list, report every counter sample without the
    /// up/loopback checks.
    pub skip_checks: bool,
    pub gateway_source: GatewaySource,
    pub route_command: Vec<String>,
    pub route_timeout_ms: u64,
    pub link_state: bool,
    /// procfs root; `HOST_PROC` or `/proc` when unset.
    pub host_proc: Option<PathBuf>,
}

impl Default for SmNetConfig {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            ignore_protocol_stats: false,
            skip_checks: false,
            gateway_source: GatewaySource::default(),
            route_command: vec!["route".to_string(), "-n".to_string()],
            route_timeout_ms: 5000,
            link_state: true,
            host_proc: None,
        }
    }
}

impl SmNetConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms)
    }
}
