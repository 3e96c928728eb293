//! Shared agent state.
//!
//! Builds the metrics record from config: declares every configured vector,
//! registers it, and adds the agent's own collection self-metrics.

use std::collections::HashMap;
use std::sync::Arc;

use selfmon_core::cache::CacheStrategy;
use selfmon_core::error::Result;
use selfmon_core::metric::{Average, Counter, Gauge, MetricDescriptor};
use selfmon_core::vector::{
    AverageVector, CounterVector, GaugeVector, LatencyVector, MetricCollector, StringVector,
};
use selfmon_core::{MetricKind, MetricVector};

use crate::config::{AgentConfig, MetricDecl};
use crate::record::MetricsRecord;

/// A configured vector, typed by the metric it holds.
#[derive(Clone)]
pub enum DeclaredVector {
    /// `counter` and `cumulative_counter`.
    Counter(Arc<CounterVector>),
    Average(Arc<AverageVector>),
    /// `gauge` and `max`.
    Gauge(Arc<GaugeVector>),
    Latency(Arc<LatencyVector>),
    String(Arc<StringVector>),
}

impl DeclaredVector {
    pub fn from_decl(decl: &MetricDecl, strategy: CacheStrategy) -> Result<Self> {
        let desc = MetricDescriptor::new(
            decl.name.as_str(),
            decl.kind,
            &decl.const_labels,
            &decl.label_keys,
        );
        Ok(match decl.kind {
            MetricKind::Counter | MetricKind::CumulativeCounter => {
                DeclaredVector::Counter(Arc::new(MetricVector::new(desc, strategy)?))
            }
            MetricKind::Average => DeclaredVector::Average(Arc::new(MetricVector::new(desc, strategy)?)),
            MetricKind::Gauge | MetricKind::Max => {
                DeclaredVector::Gauge(Arc::new(MetricVector::new(desc, strategy)?))
            }
            MetricKind::Latency => DeclaredVector::Latency(Arc::new(MetricVector::new(desc, strategy)?)),
            MetricKind::String => DeclaredVector::String(Arc::new(MetricVector::new(desc, strategy)?)),
        })
    }

    pub fn as_collector(&self) -> Arc<dyn MetricCollector> {
        match self {
            DeclaredVector::Counter(v) => Arc::clone(v) as Arc<dyn MetricCollector>,
            DeclaredVector::Average(v) => Arc::clone(v) as Arc<dyn MetricCollector>,
            DeclaredVector::Gauge(v) => Arc::clone(v) as Arc<dyn MetricCollector>,
            DeclaredVector::Latency(v) => Arc::clone(v) as Arc<dyn MetricCollector>,
            DeclaredVector::String(v) => Arc::clone(v) as Arc<dyn MetricCollector>,
        }
    }
}

/// Metrics the agent records about its own collection loop.
pub struct SelfMetrics {
    /// Drain time in microseconds.
    pub collect_time_us: Arc<Average>,
    pub collected_samples: Arc<Counter>,
    pub label_faults: Arc<Gauge>,
}

pub struct AgentState {
    cfg: AgentConfig,
    record: Arc<MetricsRecord>,
    vectors: HashMap<String, DeclaredVector>,
    self_metrics: SelfMetrics,
}

impl AgentState {
    /// Build agent state. Returns Result so main can report bad config without panicking.
    pub fn new(cfg: AgentConfig) -> Result<Self> {
        let record = Arc::new(MetricsRecord::with_strategy(cfg.labels.clone(), cfg.agent.cache));

        let mut vectors = HashMap::new();
        for decl in &cfg.metrics {
            let declared = DeclaredVector::from_decl(decl, cfg.agent.cache)?;
            record.register_collector(declared.as_collector());
            tracing::debug!(metric = %decl.name, kind = %decl.kind, keys = ?decl.label_keys, "declared metric vector");
            vectors.insert(decl.name.clone(), declared);
        }

        let component = [("component", "selfmon_agent")];
        let self_metrics = SelfMetrics {
            collect_time_us: record.new_average("selfmon_collect_time_us", &component),
            collected_samples: record.new_counter("selfmon_collected_samples", &component),
            label_faults: record.new_gauge("selfmon_label_faults", &component),
        };

        Ok(Self {
            cfg,
            record,
            vectors,
            self_metrics,
        })
    }

    pub fn cfg(&self) -> &AgentConfig {
        &self.cfg
    }

    pub fn record(&self) -> Arc<MetricsRecord> {
        Arc::clone(&self.record)
    }

    pub fn self_metrics(&self) -> &SelfMetrics {
        &self.self_metrics
    }

    pub fn vector(&self, name: &str) -> Option<DeclaredVector> {
        self.vectors.get(name).cloned()
    }

    pub fn counter_vector(&self, name: &str) -> Option<Arc<CounterVector>> {
        match self.vectors.get(name)? {
            DeclaredVector::Counter(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    pub fn average_vector(&self, name: &str) -> Option<Arc<AverageVector>> {
        match self.vectors.get(name)? {
            DeclaredVector::Average(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    pub fn gauge_vector(&self, name: &str) -> Option<Arc<GaugeVector>> {
        match self.vectors.get(name)? {
            DeclaredVector::Gauge(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    pub fn latency_vector(&self, name: &str) -> Option<Arc<LatencyVector>> {
        match self.vectors.get(name)? {
            DeclaredVector::Latency(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    pub fn string_vector(&self, name: &str) -> Option<Arc<StringVector>> {
        match self.vectors.get(name)? {
            DeclaredVector::String(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }
}
