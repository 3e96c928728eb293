//! Label-indexed metric vectors.
//!
//! A vector owns a name, a kind, constant labels and an ordered label-key
//! schema. `with_labels` resolves label pairs to the one metric instance for
//! those values, creating it on first use. `collect` enumerates every metric
//! the vector ever created.
//!
//! Label errors never reach the caller: a bad label set yields a detached
//! sink metric that no collector will ever see, and the failure is counted
//! in [`MetricVector::label_faults`] and logged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::{CacheStrategy, MetricCache};
use crate::error::{Result, SelfMonError};
use crate::label::{AsLabel, LabelSchema, DEFAULT_LABEL_VALUE};
use crate::metric::{
    Average, Counter, Gauge, Latency, Metric, MetricDescriptor, MetricFactory, MetricKind,
    StringValue,
};
use crate::pool::BufferPool;

pub type CounterVector = MetricVector<Counter>;
pub type CumulativeCounterVector = MetricVector<Counter>;
pub type AverageVector = MetricVector<Average>;
pub type MaxVector = MetricVector<Gauge>;
pub type GaugeVector = MetricVector<Gauge>;
pub type LatencyVector = MetricVector<Latency>;
pub type StringVector = MetricVector<StringValue>;

/// Anything the export pipeline can drain.
pub trait MetricCollector: Send + Sync {
    /// Every metric currently held, as uniform trait objects.
    fn collect(&self) -> Vec<Arc<dyn Metric>>;

    /// Label sets rejected so far.
    fn label_faults(&self) -> u64 {
        0
    }
}

pub struct MetricVector<M: MetricFactory> {
    desc: Arc<MetricDescriptor>,
    schema: LabelSchema,
    keys: BufferPool<String>,
    cache: Box<dyn MetricCache<M>>,
    faults: AtomicU64,
}

impl<M: MetricFactory> MetricVector<M> {
    /// Build a vector, checking that `M` implements the descriptor's kind.
    pub fn new(desc: MetricDescriptor, strategy: CacheStrategy) -> Result<Self> {
        Self::with_cache(desc, strategy.build())
    }

    /// Build a vector around a caller-supplied cache, with the same kind check as [`MetricVector::new`].
    pub fn with_cache(desc: MetricDescriptor, cache: Box<dyn MetricCache<M>>) -> Result<Self> {
        if !M::supports(desc.kind()) {
            return Err(SelfMonError::BadConfig(format!(
                "metric {} of kind {} built with a mismatched metric type",
                desc.name(),
                desc.kind()
            )));
        }
        Ok(Self::assemble(desc, cache))
    }

    // Callers guarantee that `M` supports the descriptor's kind.
    fn assemble(desc: MetricDescriptor, cache: Box<dyn MetricCache<M>>) -> Self {
        let schema = LabelSchema::new(desc.label_keys().to_vec());
        Self {
            desc: Arc::new(desc),
            schema,
            keys: BufferPool::new(|| String::with_capacity(128)),
            cache,
            faults: AtomicU64::new(0),
        }
    }

    fn build<L: AsLabel, K: AsRef<str>>(
        name: &str,
        kind: MetricKind,
        const_labels: &[L],
        label_keys: &[K],
        strategy: CacheStrategy,
    ) -> Self {
        let desc = MetricDescriptor::new(name, kind, const_labels, label_keys);
        Self::assemble(desc, strategy.build())
    }

    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    pub fn name(&self) -> &str {
        self.desc.name()
    }

    pub fn kind(&self) -> MetricKind {
        self.desc.kind()
    }

    pub fn label_keys(&self) -> &[String] {
        self.schema.keys()
    }

    /// Metric for the given label values, created on first use.
    ///
    /// Pairs may come in any order and may omit keys; omitted keys take the
    /// value `-`. Unknown keys or too many pairs return a sink metric.
    pub fn with_labels<L: AsLabel>(&self, labels: &[L]) -> Arc<M> {
        let index = match self.schema.index(labels) {
            Ok(index) => index,
            Err(e) => return self.sink(e),
        };

        let mut key = self.keys.get();
        index.write_key(&mut key);
        self.cache.get_or_insert_with(key.as_str(), &mut || {
            M::new_metric(Arc::clone(&self.desc), index.to_values())
        })
    }

    /// Every metric created so far. Callers drain each one with its `collect`.
    pub fn collect(&self) -> Vec<Arc<M>> {
        self.cache.metrics()
    }

    /// Number of distinct label sets seen.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn label_faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    fn sink(&self, err: SelfMonError) -> Arc<M> {
        if self.faults.fetch_add(1, Ordering::Relaxed) == 0 {
            tracing::warn!(metric = %self.desc.name(), code = err.code().as_str(), error = %err, "label set rejected, writes discarded");
        } else {
            tracing::debug!(metric = %self.desc.name(), error = %err, "label set rejected");
        }
        let values = vec![DEFAULT_LABEL_VALUE.to_string(); self.schema.len()];
        Arc::new(M::new_metric(Arc::clone(&self.desc), values))
    }
}

impl<M: MetricFactory> MetricCollector for MetricVector<M> {
    fn collect(&self) -> Vec<Arc<dyn Metric>> {
        self.cache
            .metrics()
            .into_iter()
            .map(|m| m as Arc<dyn Metric>)
            .collect()
    }

    fn label_faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

// Typed constructors. The `_in` variants take the cache strategy; the rest use the default.

pub fn new_counter_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> CounterVector {
    new_counter_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_counter_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> CounterVector {
    MetricVector::build(name, MetricKind::Counter, const_labels, label_keys, strategy)
}

pub fn new_cumulative_counter_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> CumulativeCounterVector {
    new_cumulative_counter_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_cumulative_counter_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> CumulativeCounterVector {
    MetricVector::build(name, MetricKind::CumulativeCounter, const_labels, label_keys, strategy)
}

pub fn new_average_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> AverageVector {
    new_average_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_average_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> AverageVector {
    MetricVector::build(name, MetricKind::Average, const_labels, label_keys, strategy)
}

pub fn new_max_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> MaxVector {
    new_max_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_max_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> MaxVector {
    MetricVector::build(name, MetricKind::Max, const_labels, label_keys, strategy)
}

pub fn new_gauge_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> GaugeVector {
    new_gauge_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_gauge_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> GaugeVector {
    MetricVector::build(name, MetricKind::Gauge, const_labels, label_keys, strategy)
}

pub fn new_latency_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> LatencyVector {
    new_latency_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_latency_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> LatencyVector {
    MetricVector::build(name, MetricKind::Latency, const_labels, label_keys, strategy)
}

pub fn new_string_vector<L: AsLabel, K: AsRef<str>>(name: &str, const_labels: &[L], label_keys: &[K]) -> StringVector {
    new_string_vector_in(CacheStrategy::default(), name, const_labels, label_keys)
}

pub fn new_string_vector_in<L: AsLabel, K: AsRef<str>>(strategy: CacheStrategy, name: &str, const_labels: &[L], label_keys: &[K]) -> StringVector {
    MetricVector::build(name, MetricKind::String, const_labels, label_keys, strategy)
}

// Single metrics: a vector with no label keys, resolved once. The metric is
// not registered anywhere; use the record's constructors for that.

const NO_KEYS: [&str; 0] = [];
const NO_LABELS: [(&str, &str); 0] = [];

pub fn new_counter<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Counter> {
    new_counter_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_cumulative_counter<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Counter> {
    new_cumulative_counter_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_average<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Average> {
    new_average_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_max<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Gauge> {
    new_max_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_gauge<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Gauge> {
    new_gauge_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_latency<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<Latency> {
    new_latency_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}

pub fn new_string<L: AsLabel>(name: &str, const_labels: &[L]) -> Arc<StringValue> {
    new_string_vector(name, const_labels, &NO_KEYS).with_labels(&NO_LABELS)
}
