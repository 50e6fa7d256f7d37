//! smnet - network interface telemetry for Linux hosts
//!
//! This crate collects per-interface network state and traffic counters and
//! hands them to a metrics pipeline as records named `smnet`.
//!
//! Each poll merges several sources keyed by interface name:
//!
//! - **Counters**: bytes, packets, errors and drops from `/proc/net/dev`
//! - **Interfaces**: index, MTU, MAC, flags and addresses via `getifaddrs(3)`
//! - **Gateways**: from `route -n` (or `/proc/net/route`)
//! - **Link state**: run status and negotiated speed via ethtool
//! - **Protocol statistics**: system-wide counters from `/proc/net/snmp`
//!
//! Counters and interface enumeration are required; every other source
//! degrades to a sentinel value when it cannot be read.
//!
//! # Examples
//!
//! ```rust,no_run
//! use smnet::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = SmNetConfig::from_json_str(r#"{"interfaces": ["eth*"]}"#)?;
//!     let smnet = SmNet::new(config)?;
//!
//!     let mut buffer = MetricBuffer::new();
//!     smnet.gather(&mut buffer)?;
//!     for metric in buffer.metrics() {
//!         println!("{:?} {:?}", metric.tags, metric.fields);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Selection
//!
//! With no `interfaces` configured, every up, non-loopback interface is
//! reported. A non-empty list reports exactly the matching names, whatever
//! their status. See [`network::filter`] for the pattern syntax.
//!
//! # Thread Safety
//!
//! [`SmNet`] is `Send + Sync`. Concurrent calls to [`SmNet::gather`] on one
//! instance are serialized.

#![doc(html_root_url = "https://docs.rs/smnet/0.1.0")]

pub mod collector;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod traits;
pub mod utils;

pub use crate::collector::{Phase, SmNet, SmNetBuilder};
pub use crate::config::{GatewaySource, SmNetConfig};
pub use crate::core::metrics::{Accumulator, Metric, MetricBuffer};
pub use crate::error::{Error, Result};

pub mod prelude {
    pub use crate::collector::{InterfaceRecord, Phase, SmNet, SmNetBuilder};
    pub use crate::config::{GatewaySource, SmNetConfig, DESCRIPTION, MEASUREMENT, SAMPLE_CONFIG};
    pub use crate::core::metrics::{Accumulator, FieldValue, Fields, Metric, MetricBuffer, MetricKind, Tags};
    pub use crate::error::{Error, Result};
    pub use crate::network::{CounterSample, InterfaceDescriptor, LinkState, RunStatus};
    pub use crate::traits::{CounterSource, GatewayResolver, InterfaceSource, LinkProbe, ProtocolSource};
}
