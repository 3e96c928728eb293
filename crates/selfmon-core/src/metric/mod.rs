//! Metric kinds.
//!
//! One concrete type per kind, all behind the object-safe [`Metric`] trait so
//! exporters can treat them uniformly:
//! - [`Counter`]: atomic add, collect swaps to zero (cumulative counters read without reset).
//! - [`Gauge`]: same mechanics as `Counter`, read as a current or max value.
//! - [`Average`]: sum and count under one lock, mean on read.
//! - [`Latency`]: begin/end intervals, mean duration on read.
//! - [`StringValue`]: last value set, emptied on collect.

mod average;
mod counter;
mod latency;
mod string;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::label::{to_pairs, AsLabel, LabelPair};

pub use average::Average;
pub use counter::{Counter, Gauge};
pub use latency::Latency;
pub use string::StringValue;

/// Self-metric kind, fixed when a vector is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Delta counter, reset on collect.
    Counter,
    /// Running total, never reset by collect.
    CumulativeCounter,
    Average,
    /// Gauge holding the largest value seen in the window.
    Max,
    Gauge,
    Latency,
    String,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::CumulativeCounter => "cumulative_counter",
            MetricKind::Average => "average",
            MetricKind::Max => "max",
            MetricKind::Gauge => "gauge",
            MetricKind::Latency => "latency",
            MetricKind::String => "string",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description shared by a vector and every metric it creates.
#[derive(Debug)]
pub struct MetricDescriptor {
    name: String,
    full_name: String,
    kind: MetricKind,
    const_labels: Vec<LabelPair>,
    label_keys: Vec<String>,
}

impl MetricDescriptor {
    pub fn new<L, K>(name: impl Into<String>, kind: MetricKind, const_labels: &[L], label_keys: &[K]) -> Self
    where
        L: AsLabel,
        K: AsRef<str>,
    {
        let name = name.into();
        let const_labels = to_pairs(const_labels);

        let mut full_name = name.clone();
        for l in &const_labels {
            full_name.push('#');
            full_name.push_str(&l.key);
            full_name.push('=');
            full_name.push_str(&l.value);
        }

        Self {
            name,
            full_name,
            kind,
            const_labels,
            label_keys: label_keys.iter().map(|k| k.as_ref().to_string()).collect(),
        }
    }

    /// Bare metric name, without constant labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name followed by `#key=value` for each constant label, in declaration order.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn const_labels(&self) -> &[LabelPair] {
        &self.const_labels
    }

    pub fn label_keys(&self) -> &[String] {
        &self.label_keys
    }
}

/// Value read from a metric of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Duration(Duration),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{v}"),
            MetricValue::Float(v) => write!(f, "{v}"),
            MetricValue::Duration(d) => write!(f, "{}", d.as_nanos()),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Uniform view over every metric kind.
pub trait Metric: Send + Sync {
    fn descriptor(&self) -> &MetricDescriptor;

    /// Variable label values, in schema order.
    fn label_values(&self) -> &[String];

    /// Current value. For [`Average`] this also closes the window.
    fn get_value(&self) -> MetricValue;

    /// Atomically read and reset for one export window.
    fn collect_value(&self) -> MetricValue;

    fn name(&self) -> &str {
        self.descriptor().full_name()
    }

    fn kind(&self) -> MetricKind {
        self.descriptor().kind()
    }

    /// Variable labels as pairs, in schema order.
    fn labels(&self) -> Vec<LabelPair> {
        self.descriptor()
            .label_keys()
            .iter()
            .zip(self.label_values())
            .map(|(k, v)| LabelPair::new(k.as_str(), v.as_str()))
            .collect()
    }
}

/// Construction hook used by vectors.
pub trait MetricFactory: Metric + Sized + 'static {
    /// Whether this type implements `kind`.
    fn supports(kind: MetricKind) -> bool;

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self;
}
