use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::network::types::CounterSample;
use crate::traits::CounterSource;

/// Reads per-interface counters from `<procfs>/net/dev`.
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    /// Reads `<proc_root>/net/dev`.
    pub fn new(proc_root: impl AsRef<Path>) -> Self {
        Self { path: proc_root.as_ref().join("net").join("dev") }
    }
}

impl CounterSource for ProcNetDev {
    fn counters(&self) -> Result<Vec<CounterSample>> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::counters(format!("{}: {}", self.path.display(), e)))?;
        parse_net_dev(&content)
    }
}

/// Parses the `/proc/net/dev` table.
///
/// The first two lines are headers. Each remaining line is
/// `name: rx_bytes rx_packets rx_errs rx_drop ... tx_bytes tx_packets tx_errs tx_drop ...`
/// with sixteen counter columns. A line that does not fit that shape fails the
/// whole read.
pub fn parse_net_dev(content: &str) -> Result<Vec<CounterSample>> {
    let mut samples = Vec::new();

    for (idx, line) in content.lines().enumerate().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        let (name, rest) = line
            .split_once(':')
            .ok_or_else(|| Error::counters(format!("line {}: missing interface separator", idx + 1)))?;

        let cols: Vec<&str> = rest.split_whitespace().collect();
        if cols.len() < 16 {
            return Err(Error::counters(format!(
                "line {}: expected 16 counter columns, got {}",
                idx + 1,
                cols.len()
            )));
        }

        let col = |i: usize| -> Result<u64> {
            cols[i].parse::<u64>().map_err(|e| {
                Error::counters(format!("line {}: column {} ({:?}): {}", idx + 1, i, cols[i], e))
            })
        };

        samples.push(CounterSample {
            name: name.trim().to_string(),
            bytes_recv: col(0)?,
            packets_recv: col(1)?,
            err_in: col(2)?,
            drop_in: col(3)?,
            bytes_sent: col(8)?,
            packets_sent: col(9)?,
            err_out: col(10)?,
            drop_out: col(11)?,
        });
    }

    Ok(samples)
}
