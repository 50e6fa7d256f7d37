use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::metrics::Fields;
use crate::error::Result;
use crate::network::types::ProtocolStats;
use crate::traits::ProtocolSource;

/// Reads system-wide protocol counters from `<procfs>/net/snmp`.
#[derive(Debug, Clone)]
pub struct ProcNetSnmp {
    path: PathBuf,
}

impl ProcNetSnmp {
    pub fn new(proc_root: impl AsRef<Path>) -> Self {
        Self { path: proc_root.as_ref().join("net").join("snmp") }
    }
}

impl ProtocolSource for ProcNetSnmp {
    fn protocol_stats(&self) -> Result<Vec<ProtocolStats>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_snmp(&content))
    }
}

/// Parses `/proc/net/snmp`.
///
/// The file is a sequence of line pairs per protocol: a header line naming the
/// counters and a value line, both prefixed `Proto:`. A line that cannot pair
/// with its successor is dropped and pairing resumes at the successor, so one
/// stray line costs at most one table. A pair whose column counts disagree is
/// dropped; a single value that is not an integer is dropped on its own.
pub fn parse_snmp(content: &str) -> Vec<ProtocolStats> {
    let mut protocols = Vec::new();
    let mut pending: Option<(&str, &str)> = None;

    for line in content.lines() {
        let Some((proto, rest)) = line.split_once(':') else {
            if let Some((proto, _)) = pending.take() {
                debug!("snmp header {} followed by line without protocol prefix", proto);
            }
            debug!("skipping snmp line without protocol prefix: {:?}", line);
            continue;
        };

        match pending.take() {
            Some((header_proto, names)) if header_proto == proto => {
                if let Some(stats) = pair_stats(proto, names, rest) {
                    protocols.push(ProtocolStats { protocol: proto.to_string(), stats });
                }
            }
            Some((header_proto, _)) => {
                debug!("snmp header {} paired with line for {}, resyncing", header_proto, proto);
                pending = Some((proto, rest));
            }
            None => pending = Some((proto, rest)),
        }
    }

    if let Some((proto, _)) = pending {
        debug!("snmp header {} has no value line", proto);
    }

    protocols
}

fn pair_stats(proto: &str, names: &str, values: &str) -> Option<Vec<(String, i64)>> {
    let names: Vec<&str> = names.split_whitespace().collect();
    let values: Vec<&str> = values.split_whitespace().collect();
    if names.len() != values.len() {
        debug!("snmp {} has {} names but {} values", proto, names.len(), values.len());
        return None;
    }

    Some(
        names
            .into_iter()
            .zip(values)
            .filter_map(|(name, value)| match value.parse::<i64>() {
                Ok(v) => Some((name.to_string(), v)),
                Err(e) => {
                    debug!("skipping snmp {}.{} = {:?}: {}", proto, name, value, e);
                    None
                }
            })
            .collect(),
    )
}

/// Flattens protocol tables into `{protocol}_{stat}` fields, lower-cased.
pub fn flatten(protocols: &[ProtocolStats]) -> Fields {
    let mut fields = Fields::new();
    for proto in protocols {
        let prefix = proto.protocol.to_lowercase();
        for (stat, value) in &proto.stats {
            fields.insert(format!("{}_{}", prefix, stat.to_lowercase()), (*value).into());
        }
    }
    fields
}
