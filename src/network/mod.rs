//! Network data sources.
//!
//! Each submodule owns one source the collector merges:
//!
//! - `interface`: interface enumeration (`getifaddrs`, index, MTU, MAC)
//! - `traffic`: cumulative counters from `/proc/net/dev`
//! - `route`: interface → gateway from `route -n` or `/proc/net/route`
//! - `ethtool`: link run state and negotiated speed
//! - `protocol`: system-wide counters from `/proc/net/snmp`
//! - `filter`: allow-list matching

pub mod ethtool;
pub mod filter;
pub mod interface;
pub mod protocol;
pub mod route;
pub mod traffic;
pub mod types;

pub use ethtool::{EthtoolHandle, EthtoolProbe};
pub use filter::InterfaceFilter;
pub use interface::SystemInterfaces;
pub use protocol::ProcNetSnmp;
pub use route::{ProcRouteResolver, RouteCommandResolver};
pub use traffic::ProcNetDev;
pub use types::{
    CounterSample, Gateways, InterfaceDescriptor, InterfaceFlags, IpStatus, LinkState, ProtocolStats, RunStatus,
};
