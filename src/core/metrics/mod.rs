//! # Core Metrics Module
//!
//! The emitted record model and the sink interface the collector writes to.
//!
//! A poll hands each record to an [`Accumulator`] as soon as it is built. Hosts
//! supply their own accumulator (a line-protocol writer, a channel, ...);
//! [`MetricBuffer`] keeps records in memory and is what the async wrapper and
//! the tests use.
//!
//! ## Example
//!
//! ```rust
//! use smnet::core::metrics::{Accumulator, Fields, MetricBuffer, Tags};
//!
//! let mut buffer = MetricBuffer::new();
//! let mut fields = Fields::new();
//! fields.insert("bytes_recv".to_string(), 42u64.into());
//! let mut tags = Tags::new();
//! tags.insert("interface".to_string(), "eth0".to_string());
//!
//! buffer.add_counter("smnet", fields, tags);
//! assert_eq!(buffer.len(), 1);
//! ```

mod types;

pub use types::{FieldValue, Fields, MetricKind, Tags};

use serde::Serialize;

/// One emitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: String,
    pub kind: MetricKind,
    pub fields: Fields,
    pub tags: Tags,
}

impl Metric {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Sink for records produced by a poll.
///
/// Implementations must not block on I/O for long; the collector calls these
/// synchronously from inside the poll.
pub trait Accumulator {
    /// Adds a record whose values are cumulative counters.
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags);

    /// Adds a record whose values are point-in-time readings.
    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags);
}

/// In-memory accumulator.
#[derive(Debug, Clone, Default)]
pub struct MetricBuffer {
    metrics: Vec<Metric>,
}

impl MetricBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Records tagged with `interface = <name>`.
    pub fn for_interface(&self, name: &str) -> Vec<&Metric> {
        self.metrics.iter().filter(|m| m.tag("interface") == Some(name)).collect()
    }

    pub fn into_metrics(self) -> Vec<Metric> {
        self.metrics
    }

    fn push(&mut self, name: &str, kind: MetricKind, fields: Fields, tags: Tags) {
        self.metrics.push(Metric { name: name.to_string(), kind, fields, tags });
    }
}

impl Accumulator for MetricBuffer {
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.push(measurement, MetricKind::Counter, fields, tags);
    }

    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.push(measurement, MetricKind::Gauge, fields, tags);
    }
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        (**self).add_counter(measurement, fields, tags);
    }

    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        (**self).add_gauge(measurement, fields, tags);
    }
}
