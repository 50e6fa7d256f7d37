use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::os::raw::c_void;
use std::ptr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::network::types::{InterfaceDescriptor, InterfaceFlags};
use crate::traits::InterfaceSource;
use crate::utils::bindings::{ioctl, IfReqInt};
use crate::utils::socket::ControlSocket;

/// Enumerates interfaces with `getifaddrs(3)`.
///
/// Addresses are gathered in the order the kernel lists them; the resulting
/// descriptors are ordered by interface index.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl SystemInterfaces {
    pub fn new() -> Self {
        Self
    }
}

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>> {
        let mut interfaces = read_ifaddrs()?;

        // MTU needs an ioctl; one socket serves every interface in this pass.
        let socket = ControlSocket::open()
            .map_err(|e| debug!("control socket unavailable, MTU left at 0: {}", e))
            .ok();

        for iface in &mut interfaces {
            iface.index = interface_index(&iface.name);
            if let Some(socket) = &socket {
                iface.mtu = interface_mtu(socket, &iface.name).unwrap_or(0);
            }
        }

        interfaces.sort_by_key(|iface| iface.index);
        Ok(interfaces)
    }
}

fn read_ifaddrs() -> Result<Vec<InterfaceDescriptor>> {
    let mut ifap: *mut libc::ifaddrs = ptr::null_mut();
    let mut interfaces: Vec<InterfaceDescriptor> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    unsafe {
        if libc::getifaddrs(&mut ifap) != 0 {
            return Err(Error::interfaces(std::io::Error::last_os_error().to_string()));
        }

        // Use scopeguard to ensure ifap is freed
        let _guard = scopeguard::guard(ifap, |ifap| {
            libc::freeifaddrs(ifap);
        });

        let mut current = ifap;
        while !current.is_null() {
            let ifa = &*current;
            current = ifa.ifa_next;

            if ifa.ifa_name.is_null() {
                continue;
            }
            let name = match CStr::from_ptr(ifa.ifa_name).to_str() {
                Ok(s) if !s.is_empty() => s.to_string(),
                _ => continue,
            };

            let pos = *positions.entry(name.clone()).or_insert_with(|| {
                interfaces.push(InterfaceDescriptor {
                    name,
                    flags: InterfaceFlags::from_raw(ifa.ifa_flags as u32),
                    ..Default::default()
                });
                interfaces.len() - 1
            });
            let entry = &mut interfaces[pos];

            if ifa.ifa_addr.is_null() {
                continue;
            }

            match i32::from((*ifa.ifa_addr).sa_family) {
                libc::AF_INET => {
                    let addr = &*(ifa.ifa_addr as *const libc::sockaddr_in);
                    let ip = Ipv4Addr::from(u32::from_be(addr.sin_addr.s_addr));
                    let prefix = if ifa.ifa_netmask.is_null() {
                        32
                    } else {
                        let mask = &*(ifa.ifa_netmask as *const libc::sockaddr_in);
                        u32::from_be(mask.sin_addr.s_addr).count_ones()
                    };
                    entry.addresses.push(format!("{ip}/{prefix}"));
                }
                libc::AF_INET6 => {
                    let addr = &*(ifa.ifa_addr as *const libc::sockaddr_in6);
                    let ip = Ipv6Addr::from(addr.sin6_addr.s6_addr);
                    let prefix = if ifa.ifa_netmask.is_null() {
                        128
                    } else {
                        let mask = &*(ifa.ifa_netmask as *const libc::sockaddr_in6);
                        mask.sin6_addr.s6_addr.iter().map(|b| b.count_ones()).sum()
                    };
                    entry.addresses.push(format!("{ip}/{prefix}"));
                }
                #[cfg(target_os = "linux")]
                libc::AF_PACKET => {
                    let ll = &*(ifa.ifa_addr as *const libc::sockaddr_ll);
                    let len = usize::from(ll.sll_halen).min(ll.sll_addr.len());
                    entry.hardware_address = format_mac(&ll.sll_addr[..len]);
                }
                #[cfg(target_os = "macos")]
                libc::AF_LINK => {
                    let dl = &*(ifa.ifa_addr as *const libc::sockaddr_dl);
                    let offset = usize::from(dl.sdl_nlen);
                    let len = usize::from(dl.sdl_alen);
                    if offset + len <= dl.sdl_data.len() {
                        let bytes: Vec<u8> =
                            dl.sdl_data[offset..offset + len].iter().map(|b| *b as u8).collect();
                        entry.hardware_address = format_mac(&bytes);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(interfaces)
}

fn interface_index(name: &str) -> u32 {
    let Ok(cname) = CString::new(name) else {
        return 0;
    };
    // SAFETY: cname is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::if_nametoindex(cname.as_ptr()) }
}

fn interface_mtu(socket: &ControlSocket, name: &str) -> Option<u32> {
    let mut req = IfReqInt::new(name)?;
    // SAFETY: req is an ifreq-sized structure living on this stack frame.
    unsafe { socket.ioctl(ioctl::SIOCGIFMTU, &mut req as *mut IfReqInt as *mut c_void) }
        .map_err(|e| debug!("SIOCGIFMTU failed for {}: {}", name, e))
        .ok()?;
    u32::try_from(req.ifr_value).ok()
}

/// Formats a hardware address as lowercase colon-separated hex. An all-zero
/// address (loopback, tunnels) is reported as no address.
pub fn format_mac(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| *b == 0) {
        return String::new();
    }
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}
