use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{Metric, MetricDescriptor, MetricFactory, MetricKind, MetricValue};

#[derive(Default)]
struct LatencyWindow {
    start: Option<Instant>,
    sum: Duration,
    count: u64,
}

impl LatencyWindow {
    fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        let nanos = self.sum.as_nanos() / u128::from(self.count);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Mean duration of `begin`/`end` intervals.
///
/// Only one interval is tracked at a time: a second `begin` before `end`
/// replaces the recorded start. Use one instance per concurrent interval
/// (for example by adding a label) when intervals overlap.
pub struct Latency {
    desc: Arc<MetricDescriptor>,
    label_values: Vec<String>,
    window: Mutex<LatencyWindow>,
}

impl Latency {
    pub fn begin(&self) {
        let now = Instant::now();
        self.window.lock().start = Some(now);
    }

    /// Record the time since the last `begin`. Ignored if nothing has begun
    /// since the last collect or clear.
    pub fn end(&self) {
        let now = Instant::now();
        let mut w = self.window.lock();
        if let Some(start) = w.start {
            w.sum += now.saturating_duration_since(start);
            w.count += 1;
        }
    }

    /// Reset sum, count and start time.
    pub fn clear(&self) {
        *self.window.lock() = LatencyWindow::default();
    }

    pub fn get(&self) -> Duration {
        self.window.lock().mean()
    }

    pub fn collect(&self) -> Duration {
        let mut w = self.window.lock();
        let mean = w.mean();
        *w = LatencyWindow::default();
        mean
    }
}

impl Metric for Latency {
    fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    fn label_values(&self) -> &[String] {
        &self.label_values
    }

    fn get_value(&self) -> MetricValue {
        MetricValue::Duration(self.get())
    }

    fn collect_value(&self) -> MetricValue {
        MetricValue::Duration(self.collect())
    }
}

impl MetricFactory for Latency {
    fn supports(kind: MetricKind) -> bool {
        kind == MetricKind::Latency
    }

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            window: Mutex::new(LatencyWindow::default()),
        }
    }
}
