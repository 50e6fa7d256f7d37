//! Default gateway resolution.
//!
//! Two resolvers share one contract: build an interface → gateway map from the
//! routing table, keeping the first route listed for each interface.
//!
//! - [`RouteCommandResolver`] runs `route -n` and scrapes its table.
//! - [`ProcRouteResolver`] reads `<procfs>/net/route` directly.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::network::types::Gateways;
use crate::traits::GatewayResolver;
use crate::utils::{collapse_fields, process};

/// Number of header lines `route -n` prints before the table rows.
pub const ROUTE_HEADER_LINES: usize = 2;

/// Column count of a `route -n` row:
/// `Destination Gateway Genmask Flags Metric Ref Use Iface`.
pub const ROUTE_COLUMNS: usize = 8;

const GATEWAY_COLUMN: usize = 1;
const IFACE_COLUMN: usize = 7;

/// Resolves gateways by running an external routing command.
#[derive(Debug, Clone)]
pub struct RouteCommandResolver {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl RouteCommandResolver {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self { program: program.into(), args, timeout }
    }

    /// Builds a resolver from `[program, args..]`. `None` for an empty command.
    pub fn from_command(command: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), timeout))
    }
}

impl GatewayResolver for RouteCommandResolver {
    fn resolve(&self) -> Result<Gateways> {
        let output = process::run_with_timeout(&self.program, &self.args, self.timeout)?;
        Ok(parse_route_output(&output))
    }
}

/// Parses `route -n` output.
///
/// Skips the two header lines, collapses whitespace, and keeps only rows with
/// exactly eight columns. The first row seen for an interface wins.
pub fn parse_route_output(output: &str) -> Gateways {
    let mut gateways = Gateways::new();

    for line in output.lines().skip(ROUTE_HEADER_LINES) {
        let fields = collapse_fields(line);
        if fields.len() != ROUTE_COLUMNS {
            continue;
        }
        let iface = fields[IFACE_COLUMN];
        if gateways.contains_key(iface) {
            continue;
        }
        gateways.insert(iface.to_string(), fields[GATEWAY_COLUMN].to_string());
    }

    gateways
}

/// Resolves gateways from the kernel routing table in procfs.
#[derive(Debug, Clone)]
pub struct ProcRouteResolver {
    path: PathBuf,
}

impl ProcRouteResolver {
    pub fn new(proc_root: impl AsRef<Path>) -> Self {
        Self { path: proc_root.as_ref().join("net").join("route") }
    }
}

impl GatewayResolver for ProcRouteResolver {
    fn resolve(&self) -> Result<Gateways> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_proc_route(&content))
    }
}

/// Parses `/proc/net/route`.
///
/// One header line, then tab-separated rows starting
/// `Iface Destination Gateway ...` with addresses as host-order hex. The
/// rows are in the same order `route -n` prints them, so first-wins yields
/// the same mapping.
pub fn parse_proc_route(content: &str) -> Gateways {
    let mut gateways = Gateways::new();

    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        let iface = fields[0];
        if gateways.contains_key(iface) {
            continue;
        }
        match u32::from_str_radix(fields[2], 16) {
            Ok(raw) => {
                gateways.insert(iface.to_string(), host_order_addr(raw).to_string());
            }
            Err(e) => debug!("skipping route row for {}: bad gateway {:?}: {}", iface, fields[2], e),
        }
    }

    gateways
}

/// The kernel prints the address word as a host-order integer whose memory
/// bytes are in network order.
fn host_order_addr(raw: u32) -> Ipv4Addr {
    Ipv4Addr::from(raw.to_ne_bytes())
}
