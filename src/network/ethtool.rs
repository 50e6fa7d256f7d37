//! Link run state and negotiated speed through the ethtool ioctl interface.
//!
//! A fresh [`EthtoolHandle`] is opened for every probe and released when it
//! goes out of scope, whichever query fails. Nothing is cached between polls.

use std::io;

use tracing::debug;

use crate::network::types::{LinkState, RunStatus};
use crate::traits::LinkProbe;
use crate::utils::bindings::ethtool;
#[cfg(target_os = "linux")]
use crate::utils::bindings::{ioctl, EthtoolCmd, EthtoolValue, IfReqData};
use crate::utils::socket::ControlSocket;

/// Maps the driver's combined speed word to Mb/s, treating `SPEED_UNKNOWN`
/// as absent.
pub fn negotiated_speed(raw: u32) -> Option<u64> {
    (raw != ethtool::SPEED_UNKNOWN).then_some(u64::from(raw))
}

/// Owned ethtool query handle.
#[derive(Debug)]
pub struct EthtoolHandle {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    socket: ControlSocket,
}

impl EthtoolHandle {
    pub fn open() -> io::Result<Self> {
        Ok(Self { socket: ControlSocket::open()? })
    }

    /// `true` when the driver reports carrier.
    #[cfg(target_os = "linux")]
    pub fn link_up(&self, name: &str) -> io::Result<bool> {
        let mut value = EthtoolValue { cmd: ethtool::ETHTOOL_GLINK, data: 0 };
        self.request(name, &mut value as *mut EthtoolValue as *mut libc::c_void)?;
        Ok(value.data != 0)
    }

    /// Negotiated speed in Mb/s from `ETHTOOL_GSET`, `None` when the driver
    /// reports `SPEED_UNKNOWN`.
    #[cfg(target_os = "linux")]
    pub fn speed(&self, name: &str) -> io::Result<Option<u64>> {
        let mut cmd = EthtoolCmd { cmd: ethtool::ETHTOOL_GSET, ..Default::default() };
        self.request(name, &mut cmd as *mut EthtoolCmd as *mut libc::c_void)?;
        Ok(negotiated_speed(cmd.speed()))
    }

    #[cfg(target_os = "linux")]
    fn request(&self, name: &str, data: *mut libc::c_void) -> io::Result<()> {
        let mut req = IfReqData::new(name, data)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid interface name"))?;
        // SAFETY: req and the structure behind `data` both outlive the call.
        unsafe { self.socket.ioctl(ioctl::SIOCETHTOOL, &mut req as *mut IfReqData as *mut libc::c_void) }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn link_up(&self, _name: &str) -> io::Result<bool> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "ethtool is only available on Linux"))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn speed(&self, _name: &str) -> io::Result<Option<u64>> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "ethtool is only available on Linux"))
    }
}

/// [`LinkProbe`] backed by ethtool.
#[derive(Debug, Default, Clone, Copy)]
pub struct EthtoolProbe;

impl EthtoolProbe {
    pub fn new() -> Self {
        Self
    }
}

impl LinkProbe for EthtoolProbe {
    fn probe(&self, name: &str) -> LinkState {
        let handle = match EthtoolHandle::open() {
            Ok(handle) => handle,
            Err(e) => {
                debug!("ethtool handle unavailable for {}: {}", name, e);
                return LinkState::default();
            }
        };

        let run_status = match handle.link_up(name) {
            Ok(true) => RunStatus::Up,
            Ok(false) => RunStatus::Down,
            Err(e) => {
                debug!("link state query failed for {}: {}", name, e);
                RunStatus::Unknown
            }
        };

        let speed_mbps = match handle.speed(name) {
            Ok(speed) => speed,
            Err(e) => {
                debug!("link speed query failed for {}: {}", name, e);
                None
            }
        };

        LinkState { run_status, speed_mbps }
    }
}
