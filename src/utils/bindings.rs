//! FFI declarations for the interface ioctls used by the collector.
//!
//! `libc` exposes the functions (`socket`, `ioctl`, `getifaddrs`) but the
//! request structures differ between libc versions and targets, so the layouts
//! the kernel expects are declared here once and shared by the enumerator and
//! the ethtool probe.

use std::os::raw::{c_char, c_int, c_void};

/// Maximum interface name length, including the trailing NUL.
pub const IFNAMSIZ: usize = 16;

//------------------------------------------------------------------------------
// ioctl request numbers
//------------------------------------------------------------------------------

pub mod ioctl {
    /// Get interface MTU.
    #[cfg(target_os = "linux")]
    pub const SIOCGIFMTU: u64 = 0x8921;
    #[cfg(target_os = "macos")]
    pub const SIOCGIFMTU: u64 = 0xc020_6933;

    /// Ethtool command dispatch.
    #[cfg(target_os = "linux")]
    pub const SIOCETHTOOL: u64 = 0x8946;
}

//------------------------------------------------------------------------------
// ethtool command constants (linux/ethtool.h)
//------------------------------------------------------------------------------

pub mod ethtool {
    /// Get settings (legacy `ethtool_cmd`).
    pub const ETHTOOL_GSET: u32 = 0x0000_0001;
    /// Get link status (`ethtool_value`).
    pub const ETHTOOL_GLINK: u32 = 0x0000_000a;
    /// `SPEED_UNKNOWN` as reported through the combined speed field.
    pub const SPEED_UNKNOWN: u32 = u32::MAX;
}

//------------------------------------------------------------------------------
// request structures
//------------------------------------------------------------------------------

/// `struct ifreq` specialised for requests carrying an `int` (MTU).
#[repr(C)]
pub struct IfReqInt {
    pub ifr_name: [c_char; IFNAMSIZ],
    pub ifr_value: c_int,
    _pad: [u8; 20],
}

/// `struct ifreq` specialised for requests carrying a data pointer (ethtool).
#[repr(C)]
pub struct IfReqData {
    pub ifr_name: [c_char; IFNAMSIZ],
    pub ifr_data: *mut c_void,
    _pad: [u8; 24 - std::mem::size_of::<*mut c_void>()],
}

impl IfReqInt {
    pub fn new(name: &str) -> Option<Self> {
        Some(Self { ifr_name: ifr_name(name)?, ifr_value: 0, _pad: [0; 20] })
    }
}

impl IfReqData {
    pub fn new(name: &str, data: *mut c_void) -> Option<Self> {
        Some(Self {
            ifr_name: ifr_name(name)?,
            ifr_data: data,
            _pad: [0; 24 - std::mem::size_of::<*mut c_void>()],
        })
    }
}

/// `struct ethtool_value`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct EthtoolValue {
    pub cmd: u32,
    pub data: u32,
}

/// `struct ethtool_cmd` (legacy settings block).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct EthtoolCmd {
    pub cmd: u32,
    pub supported: u32,
    pub advertising: u32,
    pub speed: u16,
    pub duplex: u8,
    pub port: u8,
    pub phy_address: u8,
    pub transceiver: u8,
    pub autoneg: u8,
    pub mdio_support: u8,
    pub maxtxpkt: u32,
    pub maxrxpkt: u32,
    pub speed_hi: u16,
    pub eth_tp_mdix: u8,
    pub eth_tp_mdix_ctrl: u8,
    pub lp_advertising: u32,
    pub reserved: [u32; 2],
}

impl EthtoolCmd {
    /// Combined 32-bit speed in Mb/s, `SPEED_UNKNOWN` when not negotiated.
    pub fn speed(&self) -> u32 {
        (u32::from(self.speed_hi) << 16) | u32::from(self.speed)
    }
}

/// Copies `name` into a NUL-terminated `ifr_name` buffer. Names that do not
/// fit (or contain NUL) are rejected rather than truncated.
fn ifr_name(name: &str) -> Option<[c_char; IFNAMSIZ]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() >= IFNAMSIZ || bytes.contains(&0) {
        return None;
    }
    let mut buf = [0 as c_char; IFNAMSIZ];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = *src as c_char;
    }
    Some(buf)
}
