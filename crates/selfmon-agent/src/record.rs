//! Metrics record: where vectors register so the collect loop can find them.
//!
//! Components create vectors through the record (or register their own) once
//! at startup; the collect loop then drains every registered collector per
//! window without tracking individual metrics.

use std::sync::Arc;

use parking_lot::RwLock;
use selfmon_core::cache::CacheStrategy;
use selfmon_core::label::AsLabel;
use selfmon_core::metric::{Average, Counter, Gauge, Latency, Metric, StringValue};
use selfmon_core::vector::{
    self, AverageVector, CounterVector, CumulativeCounterVector, GaugeVector, LatencyVector,
    MaxVector, MetricCollector, StringVector,
};
use selfmon_core::{LabelPair, MetricKind, MetricValue};

/// One drained value with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name with constant labels (`name#key=value...`).
    pub name: String,
    pub kind: MetricKind,
    /// Record labels followed by the metric's variable labels.
    pub labels: Vec<LabelPair>,
    pub value: MetricValue,
}

#[derive(Default)]
pub struct MetricsRecord {
    labels: Vec<LabelPair>,
    strategy: CacheStrategy,
    collectors: RwLock<Vec<Arc<dyn MetricCollector>>>,
}

impl MetricsRecord {
    /// Record whose vectors use the default (sharded) cache.
    pub fn new(labels: Vec<LabelPair>) -> Self {
        Self::with_strategy(labels, CacheStrategy::default())
    }

    /// Record whose `new_*` constructors build vectors on `strategy`.
    pub fn with_strategy(labels: Vec<LabelPair>, strategy: CacheStrategy) -> Self {
        Self {
            labels,
            strategy,
            collectors: RwLock::new(Vec::new()),
        }
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    pub fn labels(&self) -> &[LabelPair] {
        &self.labels
    }

    pub fn register_collector(&self, collector: Arc<dyn MetricCollector>) {
        self.collectors.write().push(collector);
    }

    pub fn collectors(&self) -> Vec<Arc<dyn MetricCollector>> {
        self.collectors.read().clone()
    }

    /// Collect every metric of every registered collector.
    pub fn drain(&self) -> Vec<Sample> {
        let mut out = Vec::new();
        for collector in self.collectors() {
            for m in collector.collect() {
                let mut labels = self.labels.clone();
                labels.extend(m.labels());
                out.push(Sample {
                    name: m.name().to_string(),
                    kind: m.kind(),
                    labels,
                    value: m.collect_value(),
                });
            }
        }
        out
    }

    /// Label sets rejected across all registered collectors.
    pub fn label_faults(&self) -> u64 {
        self.collectors.read().iter().map(|c| c.label_faults()).sum()
    }

    fn register<V: MetricCollector + 'static>(&self, v: V) -> Arc<V> {
        let v = Arc::new(v);
        self.register_collector(Arc::clone(&v) as Arc<dyn MetricCollector>);
        v
    }

    pub fn new_counter_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<CounterVector> {
        self.register(vector::new_counter_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_cumulative_counter_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<CumulativeCounterVector> {
        self.register(vector::new_cumulative_counter_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_average_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<AverageVector> {
        self.register(vector::new_average_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_max_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<MaxVector> {
        self.register(vector::new_max_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_gauge_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<GaugeVector> {
        self.register(vector::new_gauge_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_latency_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<LatencyVector> {
        self.register(vector::new_latency_vector_in(self.strategy, name, const_labels, label_keys))
    }

    pub fn new_string_vector<L: AsLabel, K: AsRef<str>>(&self, name: &str, const_labels: &[L], label_keys: &[K]) -> Arc<StringVector> {
        self.register(vector::new_string_vector_in(self.strategy, name, const_labels, label_keys))
    }

    // Single metrics: register a keyless vector and hand back its only metric.

    pub fn new_counter<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Counter> {
        self.new_counter_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_cumulative_counter<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Counter> {
        self.new_cumulative_counter_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_average<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Average> {
        self.new_average_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_max<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Gauge> {
        self.new_max_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_gauge<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Gauge> {
        self.new_gauge_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_latency<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<Latency> {
        self.new_latency_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }

    pub fn new_string<L: AsLabel>(&self, name: &str, const_labels: &[L]) -> Arc<StringValue> {
        self.new_string_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
    }
}

const NO_KEYS: [&str; 0] = [];
const NO_LABELS: [(&str, &str); 0] = [];
