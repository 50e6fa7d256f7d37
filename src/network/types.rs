use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

/// Interface flags reported by the enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InterfaceFlags(u32);

impl InterfaceFlags {
    pub const UP: Self = Self(1 << 0);
    pub const BROADCAST: Self = Self(1 << 1);
    pub const LOOPBACK: Self = Self(1 << 2);
    pub const POINT_TO_POINT: Self = Self(1 << 3);
    pub const MULTICAST: Self = Self(1 << 4);
    pub const RUNNING: Self = Self(1 << 5);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Maps the `IFF_*` bits from `getifaddrs(3)`.
    pub fn from_raw(raw: u32) -> Self {
        let mut flags = Self::empty();
        for (bit, flag) in [
            (libc::IFF_UP, Self::UP),
            (libc::IFF_BROADCAST, Self::BROADCAST),
            (libc::IFF_LOOPBACK, Self::LOOPBACK),
            (libc::IFF_POINTOPOINT, Self::POINT_TO_POINT),
            (libc::IFF_MULTICAST, Self::MULTICAST),
            (libc::IFF_RUNNING, Self::RUNNING),
        ] {
            if raw & bit as u32 != 0 {
                flags.insert(flag);
            }
        }
        flags
    }
}

impl std::ops::BitOr for InterfaceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::UP, "up"),
            (Self::BROADCAST, "broadcast"),
            (Self::LOOPBACK, "loopback"),
            (Self::POINT_TO_POINT, "pointtopoint"),
            (Self::MULTICAST, "multicast"),
            (Self::RUNNING, "running"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// One OS network interface as enumerated for a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceDescriptor {
    pub index: u32,
    pub name: String,
    pub mtu: u32,
    /// Colon-separated hardware address, empty when the interface has none.
    pub hardware_address: String,
    pub flags: InterfaceFlags,
    /// Addresses in enumeration order, as `addr/prefix` strings.
    pub addresses: Vec<String>,
}

impl InterfaceDescriptor {
    pub fn is_up(&self) -> bool {
        self.flags.contains(InterfaceFlags::UP)
    }

    pub fn is_loopback(&self) -> bool {
        self.flags.contains(InterfaceFlags::LOOPBACK)
    }
}

/// Cumulative traffic counters for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterSample {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub err_in: u64,
    pub err_out: u64,
    pub drop_in: u64,
    pub drop_out: u64,
}

/// Interface name to default gateway. Built fresh each poll.
pub type Gateways = HashMap<String, String>;

/// Physical link run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum RunStatus {
    #[default]
    Unknown = 0,
    Down = 1,
    Up = 2,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Result of probing one interface's link. Fields the probe could not
/// determine stay at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkState {
    pub run_status: RunStatus,
    /// Negotiated speed in Mb/s; `None` when unknown or not negotiated.
    pub speed_mbps: Option<u64>,
}

/// First IPv4 address of an interface with its mask in dotted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpStatus {
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl IpStatus {
    /// Picks the first parseable IPv4 CIDR from `addresses`.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Option<Self> {
        addresses.iter().find_map(|a| Self::parse_cidr(a.as_ref()))
    }

    pub fn parse_cidr(cidr: &str) -> Option<Self> {
        let (addr, prefix) = cidr.split_once('/')?;
        let address: Ipv4Addr = addr.parse().ok()?;
        let prefix: u32 = prefix.parse().ok()?;
        if prefix > 32 {
            return None;
        }
        let bits = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
        Some(Self { address, mask: Ipv4Addr::from(bits) })
    }
}

/// System-wide counters for one protocol, e.g. `Tcp`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolStats {
    pub protocol: String,
    /// Stat name to value, in the order the kernel lists them.
    pub stats: Vec<(String, i64)>,
}
