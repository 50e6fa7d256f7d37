use crate::core::metrics::{Fields, Tags};
use crate::network::types::{CounterSample, InterfaceDescriptor, IpStatus, LinkState};

/// Tag value marking the system-wide protocol record.
pub const ALL_INTERFACES: &str = "all";

/// One interface's merged view for a single poll.
///
/// Side-channel data that could not be read stays `None` here and is rendered
/// as its sentinel only when converted to fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub index: u32,
    pub name: String,
    pub mtu: u32,
    pub mac: String,
    pub admin_up: bool,
    pub ip: Option<IpStatus>,
    pub gateway: Option<String>,
    pub link: LinkState,
    pub counters: CounterSample,
}

impl InterfaceRecord {
    /// Joins the sources on the counter sample's name. An interface missing
    /// from the enumerator (allow-list mode) keeps zero index/MTU and no
    /// address data.
    pub fn merge(
        sample: &CounterSample,
        descriptor: Option<&InterfaceDescriptor>,
        gateway: Option<&str>,
        link: LinkState,
    ) -> Self {
        Self {
            index: descriptor.map_or(0, |d| d.index),
            name: sample.name.clone(),
            mtu: descriptor.map_or(0, |d| d.mtu),
            mac: descriptor.map(|d| d.hardware_address.clone()).unwrap_or_default(),
            admin_up: descriptor.is_some_and(InterfaceDescriptor::is_up),
            ip: descriptor.and_then(|d| IpStatus::from_addresses(&d.addresses)),
            gateway: gateway.filter(|g| !g.is_empty()).map(str::to_string),
            link,
            counters: sample.clone(),
        }
    }

    pub fn tags(&self) -> Tags {
        let mut tags = Tags::new();
        tags.insert("interface".to_string(), self.name.clone());
        tags
    }

    pub fn fields(&self) -> Fields {
        let (ip, mask) = match &self.ip {
            Some(status) => (status.address.to_string(), status.mask.to_string()),
            None => (String::new(), String::new()),
        };
        let c = &self.counters;

        let mut fields = Fields::new();
        fields.insert("index".into(), self.index.into());
        fields.insert("name".into(), self.name.as_str().into());
        fields.insert("mtu".into(), self.mtu.into());
        fields.insert("speed".into(), self.link.speed_mbps.unwrap_or(0).into());
        fields.insert("ip".into(), ip.into());
        fields.insert("net_mask".into(), mask.into());
        fields.insert("gateway".into(), self.gateway.clone().unwrap_or_default().into());
        fields.insert("mac".into(), self.mac.as_str().into());
        fields.insert("admin_status".into(), u8::from(self.admin_up).into());
        fields.insert("run_status".into(), self.link.run_status.code().into());
        fields.insert("bytes_sent".into(), c.bytes_sent.into());
        fields.insert("bytes_recv".into(), c.bytes_recv.into());
        fields.insert("packets_sent".into(), c.packets_sent.into());
        fields.insert("packets_recv".into(), c.packets_recv.into());
        fields.insert("err_in".into(), c.err_in.into());
        fields.insert("err_out".into(), c.err_out.into());
        fields.insert("drop_in".into(), c.drop_in.into());
        fields.insert("drop_out".into(), c.drop_out.into());
        fields
    }
}

/// Tags for the protocol record.
pub fn all_interfaces_tags() -> Tags {
    let mut tags = Tags::new();
    tags.insert("interface".to_string(), ALL_INTERFACES.to_string());
    tags
}
