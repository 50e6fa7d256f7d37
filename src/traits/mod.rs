// Traits module
//
// The seams between the collector and each of its data sources. Every source
// the collector reads is reached through one of these, so a poll can be driven
// entirely from fixtures or mocks.

use crate::error::Result;
use crate::network::types::{CounterSample, Gateways, InterfaceDescriptor, LinkState, ProtocolStats};

#[cfg(test)]
use mockall::automock;

/// Lists OS network interfaces.
#[cfg_attr(test, automock)]
pub trait InterfaceSource: Send + Sync {
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>>;
}

/// Reads cumulative per-interface traffic counters.
///
/// All-or-nothing: either every interface the OS reports is returned or the
/// call fails.
#[cfg_attr(test, automock)]
pub trait CounterSource: Send + Sync {
    fn counters(&self) -> Result<Vec<CounterSample>>;
}

/// Resolves the gateway associated with each interface.
#[cfg_attr(test, automock)]
pub trait GatewayResolver: Send + Sync {
    fn resolve(&self) -> Result<Gateways>;
}

/// Queries link run state and negotiated speed for one interface.
///
/// Infallible by contract: anything the probe cannot read is left at its
/// `LinkState` default.
#[cfg_attr(test, automock)]
pub trait LinkProbe: Send + Sync {
    fn probe(&self, name: &str) -> LinkState;
}

/// Reads system-wide per-protocol counters.
#[cfg_attr(test, automock)]
pub trait ProtocolSource: Send + Sync {
    fn protocol_stats(&self) -> Result<Vec<ProtocolStats>>;
}
