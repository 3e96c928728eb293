use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::{Metric, MetricDescriptor, MetricFactory, MetricKind, MetricValue};

/// Counter metric.
///
/// Delta counters hand their total to `collect` and restart at zero;
/// cumulative counters keep counting across collections.
pub struct Counter {
    desc: Arc<MetricDescriptor>,
    label_values: Vec<String>,
    value: AtomicI64,
}

impl Counter {
    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.add(1);
    }

    /// Overwrite the current total.
    pub fn clear(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn collect(&self) -> i64 {
        match self.desc.kind() {
            MetricKind::CumulativeCounter => self.get(),
            _ => self.value.swap(0, Ordering::AcqRel),
        }
    }
}

impl Metric for Counter {
    fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    fn label_values(&self) -> &[String] {
        &self.label_values
    }

    fn get_value(&self) -> MetricValue {
        MetricValue::Int(self.get())
    }

    fn collect_value(&self) -> MetricValue {
        MetricValue::Int(self.collect())
    }
}

impl MetricFactory for Counter {
    fn supports(kind: MetricKind) -> bool {
        matches!(kind, MetricKind::Counter | MetricKind::CumulativeCounter)
    }

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            value: AtomicI64::new(0),
        }
    }
}

/// Gauge metric: a current (or, for `max` vectors, peak) value.
///
/// Mechanics match the delta [`Counter`]: `collect` returns the value and
/// resets it to zero.
pub struct Gauge {
    desc: Arc<MetricDescriptor>,
    label_values: Vec<String>,
    value: AtomicI64,
}

impl Gauge {
    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    /// Overwrite the current value.
    pub fn clear(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    /// Raise the value to `v` if it is larger.
    pub fn update_max(&self, v: i64) {
        self.value.fetch_max(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn collect(&self) -> i64 {
        self.value.swap(0, Ordering::AcqRel)
    }
}

impl Metric for Gauge {
    fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    fn label_values(&self) -> &[String] {
        &self.label_values
    }

    fn get_value(&self) -> MetricValue {
        MetricValue::Int(self.get())
    }

    fn collect_value(&self) -> MetricValue {
        MetricValue::Int(self.collect())
    }
}

impl MetricFactory for Gauge {
    fn supports(kind: MetricKind) -> bool {
        matches!(kind, MetricKind::Gauge | MetricKind::Max)
    }

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            value: AtomicI64::new(0),
        }
    }
}
