//! Poll orchestration.
//!
//! [`SmNet`] drives one poll per [`SmNet::gather`] call:
//!
//! 1. read counters (fatal on error)
//! 2. enumerate interfaces (fatal on error)
//! 3. compile the allow-list on first use (fatal on error, retried next poll)
//! 4. select interfaces, resolve gateways, probe link state (best effort)
//! 5. emit one counter record per selected interface
//! 6. emit the protocol record unless disabled (best effort)
//!
//! Nothing reaches the accumulator before steps 1-3 succeed, so a failed poll
//! emits nothing.

mod record;

pub use record::{all_interfaces_tags, InterfaceRecord, ALL_INTERFACES};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, debug_span, trace, warn};

use crate::config::{GatewaySource, SmNetConfig, MEASUREMENT};
use crate::core::metrics::Accumulator;
use crate::error::{Error, Result};
use crate::network::protocol;
use crate::network::types::{Gateways, InterfaceDescriptor, LinkState};
use crate::network::{
    EthtoolProbe, InterfaceFilter, ProcNetDev, ProcNetSnmp, ProcRouteResolver, RouteCommandResolver,
    SystemInterfaces,
};
use crate::traits::{CounterSource, GatewayResolver, InterfaceSource, LinkProbe, ProtocolSource};
use crate::utils;

/// Where a poll currently is. Always back to `Idle` once `gather` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Filtering = 1,
    Merging = 2,
    Emitting = 3,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Phase::Filtering,
            2 => Phase::Merging,
            3 => Phase::Emitting,
            _ => Phase::Idle,
        }
    }
}

/// Network interface telemetry collector.
pub struct SmNet {
    config: SmNetConfig,
    interfaces: Box<dyn InterfaceSource>,
    counters: Box<dyn CounterSource>,
    gateways: Option<Box<dyn GatewayResolver>>,
    links: Option<Box<dyn LinkProbe>>,
    protocols: Box<dyn ProtocolSource>,
    filter: OnceCell<InterfaceFilter>,
    poll: Mutex<()>,
    phase: AtomicU8,
}

impl std::fmt::Debug for SmNet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmNet")
            .field("config", &self.config)
            .field("filter_compiled", &self.filter.get().is_some())
            .field("phase", &self.phase())
            .finish()
    }
}

impl SmNet {
    /// Collector reading from the local system per `config`.
    pub fn new(config: SmNetConfig) -> Result<Self> {
        Self::builder(config).build_system()
    }

    pub fn builder(config: SmNetConfig) -> SmNetBuilder {
        SmNetBuilder::new(config)
    }

    pub fn config(&self) -> &SmNetConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn enter(&self, phase: Phase) {
        trace!(?phase, "smnet phase");
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Runs one poll and hands its records to `acc`.
    ///
    /// Polls on the same instance are serialized; a second caller waits for
    /// the first to finish.
    pub fn gather(&self, acc: &mut dyn Accumulator) -> Result<()> {
        let _poll = self.poll.lock();
        let span = debug_span!("smnet_poll");
        let _enter = span.enter();
        let _idle = scopeguard::guard(&self.phase, |phase| phase.store(Phase::Idle as u8, Ordering::Release));

        self.enter(Phase::Filtering);

        let samples = self.counters.counters().map_err(|e| match e {
            Error::Counters(_) => e,
            other => Error::counters(other.to_string()),
        })?;

        let descriptors = self.interfaces.interfaces().map_err(|e| match e {
            Error::Interfaces(_) => e,
            other => Error::interfaces(other.to_string()),
        })?;

        let filter = self
            .filter
            .get_or_try_init(|| InterfaceFilter::compile(&self.config.interfaces))?;

        let by_name: HashMap<&str, &InterfaceDescriptor> =
            descriptors.iter().map(|d| (d.name.as_str(), d)).collect();

        let selected: Vec<_> = samples
            .iter()
            .filter(|s| filter.includes(&s.name, by_name.get(s.name.as_str()).copied(), self.config.skip_checks))
            .collect();
        debug!(sampled = samples.len(), selected = selected.len(), "interfaces filtered");

        self.enter(Phase::Merging);

        let gateways = if selected.is_empty() { Gateways::new() } else { self.resolve_gateways() };

        let records: Vec<InterfaceRecord> = selected
            .into_iter()
            .map(|sample| {
                let link = self.probe_link(&sample.name);
                InterfaceRecord::merge(
                    sample,
                    by_name.get(sample.name.as_str()).copied(),
                    gateways.get(&sample.name).map(String::as_str),
                    link,
                )
            })
            .collect();

        self.enter(Phase::Emitting);

        for record in &records {
            acc.add_counter(MEASUREMENT, record.fields(), record.tags());
        }

        if !self.config.ignore_protocol_stats {
            self.emit_protocol_stats(acc);
        }

        Ok(())
    }

    fn resolve_gateways(&self) -> Gateways {
        let Some(resolver) = &self.gateways else {
            return Gateways::new();
        };
        match resolver.resolve() {
            Ok(gateways) => gateways,
            Err(e) => {
                warn!("gateway resolution failed, gateways left empty: {}", e);
                Gateways::new()
            }
        }
    }

    fn probe_link(&self, name: &str) -> LinkState {
        self.links.as_ref().map(|probe| probe.probe(name)).unwrap_or_default()
    }

    fn emit_protocol_stats(&self, acc: &mut dyn Accumulator) {
        let protocols = match self.protocols.protocol_stats() {
            Ok(protocols) => protocols,
            Err(e) => {
                debug!("protocol stats unavailable: {}", e);
                return;
            }
        };
        let fields = protocol::flatten(&protocols);
        if fields.is_empty() {
            return;
        }
        acc.add_gauge(MEASUREMENT, fields, all_interfaces_tags());
    }
}

#[cfg(feature = "async")]
impl SmNet {
    /// Runs one poll on the blocking thread pool and returns its records.
    pub async fn gather_async(self: std::sync::Arc<Self>) -> Result<Vec<crate::core::metrics::Metric>> {
        tokio::task::spawn_blocking(move || {
            let mut buffer = crate::core::metrics::MetricBuffer::new();
            self.gather(&mut buffer)?;
            Ok(buffer.into_metrics())
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

/// Assembles an [`SmNet`] from explicit sources. Any source left unset is
/// filled from the local system by [`SmNetBuilder::build_system`].
pub struct SmNetBuilder {
    config: SmNetConfig,
    interfaces: Option<Box<dyn InterfaceSource>>,
    counters: Option<Box<dyn CounterSource>>,
    gateways: Option<Option<Box<dyn GatewayResolver>>>,
    links: Option<Option<Box<dyn LinkProbe>>>,
    protocols: Option<Box<dyn ProtocolSource>>,
}

impl SmNetBuilder {
    pub fn new(config: SmNetConfig) -> Self {
        Self { config, interfaces: None, counters: None, gateways: None, links: None, protocols: None }
    }

    pub fn interface_source(mut self, source: impl InterfaceSource + 'static) -> Self {
        self.interfaces = Some(Box::new(source));
        self
    }

    pub fn counter_source(mut self, source: impl CounterSource + 'static) -> Self {
        self.counters = Some(Box::new(source));
        self
    }

    pub fn gateway_resolver(mut self, resolver: impl GatewayResolver + 'static) -> Self {
        self.gateways = Some(Some(Box::new(resolver)));
        self
    }

    pub fn without_gateways(mut self) -> Self {
        self.gateways = Some(None);
        self
    }

    pub fn link_probe(mut self, probe: impl LinkProbe + 'static) -> Self {
        self.links = Some(Some(Box::new(probe)));
        self
    }

    pub fn without_link_state(mut self) -> Self {
        self.links = Some(None);
        self
    }

    pub fn protocol_source(mut self, source: impl ProtocolSource + 'static) -> Self {
        self.protocols = Some(Box::new(source));
        self
    }

    /// Fills unset sources from the local system and builds the collector.
    pub fn build_system(self) -> Result<SmNet> {
        let proc_root = utils::host_proc(self.config.host_proc.as_ref());

        let gateways = match self.gateways {
            Some(explicit) => explicit,
            None => match self.config.gateway_source {
                GatewaySource::RouteCommand => {
                    let resolver =
                        RouteCommandResolver::from_command(&self.config.route_command, self.config.route_timeout())
                            .ok_or_else(|| Error::config("route_command must name a program"))?;
                    Some(Box::new(resolver) as Box<dyn GatewayResolver>)
                }
                GatewaySource::ProcRoute => Some(Box::new(ProcRouteResolver::new(&proc_root)) as Box<dyn GatewayResolver>),
                GatewaySource::Disabled => None,
            },
        };

        let links = match self.links {
            Some(explicit) => explicit,
            None if self.config.link_state => Some(Box::new(EthtoolProbe::new()) as Box<dyn LinkProbe>),
            None => None,
        };

        Ok(SmNet {
            interfaces: self.interfaces.unwrap_or_else(|| Box::new(SystemInterfaces::new())),
            counters: self.counters.unwrap_or_else(|| Box::new(ProcNetDev::new(&proc_root))),
            protocols: self.protocols.unwrap_or_else(|| Box::new(ProcNetSnmp::new(&proc_root))),
            gateways,
            links,
            config: self.config,
            filter: OnceCell::new(),
            poll: Mutex::new(()),
            phase: AtomicU8::new(Phase::Idle as u8),
        })
    }
}
