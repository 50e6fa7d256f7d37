//! Utility functions and modules for the smnet crate.
//!
//! - `bindings`: hand-declared ioctl request layouts (ifreq, ethtool)
//! - `process`: child-process execution with a bounded wait
//! - `socket`: RAII control socket for interface ioctls

pub mod bindings;
pub mod process;
pub mod socket;

use std::path::PathBuf;

/// Environment variable naming an alternate procfs mount, used when the
/// collector runs in a container with the host's `/proc` bind-mounted.
pub const HOST_PROC_ENV: &str = "HOST_PROC";

/// Resolves the procfs root: explicit setting, then `HOST_PROC`, then `/proc`.
pub fn host_proc(configured: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = configured {
        return path.clone();
    }
    std::env::var_os(HOST_PROC_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/proc"))
}

/// Collapses every run of whitespace (spaces and tabs) to a single space and
/// splits on it. Leading and trailing whitespace produce empty edge fields,
/// matching how fixed-width tool output is scraped column by column.
pub fn collapse_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if !in_space {
                fields.push(&line[start..i]);
                in_space = true;
            }
        } else if in_space {
            start = i;
            in_space = false;
        }
    }
    fields.push(if in_space { "" } else { &line[start..] });
    fields
}
