use std::collections::HashMap;
use std::path::Path;

use smnet::network::{CounterSample, Gateways, InterfaceDescriptor, InterfaceFlags, LinkState, ProtocolStats, RunStatus};
use smnet::traits::{CounterSource, GatewayResolver, InterfaceSource, LinkProbe, ProtocolSource};
use smnet::{Result, SmNet, SmNetConfig};

struct FixedInterfaces(Vec<InterfaceDescriptor>);

impl InterfaceSource for FixedInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>> {
        Ok(self.0.clone())
    }
}

struct FixedCounters(Vec<CounterSample>);

impl CounterSource for FixedCounters {
    fn counters(&self) -> Result<Vec<CounterSample>> {
        Ok(self.0.clone())
    }
}

struct FixedGateways(Gateways);

impl GatewayResolver for FixedGateways {
    fn resolve(&self) -> Result<Gateways> {
        Ok(self.0.clone())
    }
}

struct FixedLinks(HashMap<String, LinkState>);

impl LinkProbe for FixedLinks {
    fn probe(&self, name: &str) -> LinkState {
        self.0.get(name).copied().unwrap_or_default()
    }
}

struct FixedProtocols(Vec<ProtocolStats>);

impl ProtocolSource for FixedProtocols {
    fn protocol_stats(&self) -> Result<Vec<ProtocolStats>> {
        Ok(self.0.clone())
    }
}

/// Builder for a collector over a fixed, in-memory host
pub struct TestNetworkBuilder {
    config: SmNetConfig,
    interfaces: Vec<InterfaceDescriptor>,
    counters: Vec<CounterSample>,
    gateways: Gateways,
    links: HashMap<String, LinkState>,
    protocols: Vec<ProtocolStats>,
}

impl TestNetworkBuilder {
    /// Create a builder with a loopback interface already present
    pub fn new() -> Self {
        Self {
            config: SmNetConfig::default(),
            interfaces: Vec::new(),
            counters: Vec::new(),
            gateways: Gateways::new(),
            links: HashMap::new(),
            protocols: Vec::new(),
        }
        .with_loopback()
    }

    pub fn with_loopback(self) -> Self {
        self.with_interface(
            "lo",
            InterfaceFlags::UP | InterfaceFlags::RUNNING | InterfaceFlags::LOOPBACK,
            &["127.0.0.1/8"],
        )
    }

    /// Add an interface with traffic counters derived from its index
    pub fn with_interface(mut self, name: &str, flags: InterfaceFlags, addresses: &[&str]) -> Self {
        let index = self.interfaces.len() as u32 + 1;
        self.interfaces.push(InterfaceDescriptor {
            index,
            name: name.to_string(),
            mtu: 1500,
            hardware_address: if flags.contains(InterfaceFlags::LOOPBACK) {
                String::new()
            } else {
                format!("52:54:00:00:00:{:02x}", index)
            },
            flags,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        });
        self.counters.push(CounterSample {
            name: name.to_string(),
            bytes_recv: 1000 * u64::from(index),
            bytes_sent: 2000 * u64::from(index),
            packets_recv: 10 * u64::from(index),
            packets_sent: 20 * u64::from(index),
            ..CounterSample::default()
        });
        self
    }

    pub fn with_up_interface(self, name: &str, addresses: &[&str]) -> Self {
        self.with_interface(name, InterfaceFlags::UP | InterfaceFlags::RUNNING | InterfaceFlags::BROADCAST, addresses)
    }

    /// Counters for a name the enumerator does not list
    pub fn with_counters_only(mut self, name: &str) -> Self {
        self.counters.push(CounterSample { name: name.to_string(), ..CounterSample::default() });
        self
    }

    pub fn with_gateway(mut self, name: &str, gateway: &str) -> Self {
        self.gateways.insert(name.to_string(), gateway.to_string());
        self
    }

    pub fn with_link(mut self, name: &str, up: bool, speed_mbps: Option<u64>) -> Self {
        let run_status = if up { RunStatus::Up } else { RunStatus::Down };
        self.links.insert(name.to_string(), LinkState { run_status, speed_mbps });
        self
    }

    pub fn with_protocol(mut self, protocol: &str, stats: &[(&str, i64)]) -> Self {
        self.protocols.push(ProtocolStats {
            protocol: protocol.to_string(),
            stats: stats.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        });
        self
    }

    pub fn with_allow_list(mut self, patterns: &[&str]) -> Self {
        self.config.interfaces = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_config(mut self, config: SmNetConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the collector over the configured fixtures
    pub fn build(self) -> Result<SmNet> {
        SmNet::builder(self.config)
            .interface_source(FixedInterfaces(self.interfaces))
            .counter_source(FixedCounters(self.counters))
            .gateway_resolver(FixedGateways(self.gateways))
            .link_probe(FixedLinks(self.links))
            .protocol_source(FixedProtocols(self.protocols))
            .build_system()
    }
}

impl Default for TestNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fake procfs tree on disk.
pub struct ProcFixture {
    dir: tempfile::TempDir,
}

impl ProcFixture {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("net"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file: &str, content: &str) -> std::io::Result<()> {
        std::fs::write(self.dir.path().join("net").join(file), content)
    }
}
