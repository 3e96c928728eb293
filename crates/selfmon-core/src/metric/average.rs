use std::sync::Arc;

use parking_lot::Mutex;

use super::{Metric, MetricDescriptor, MetricFactory, MetricKind, MetricValue};

#[derive(Default)]
struct AverageWindow {
    sum: i64,
    count: i64,
    prev_avg: f64,
}

impl AverageWindow {
    /// Close the current window. An empty window repeats the previous mean.
    fn take_avg(&mut self) -> f64 {
        if self.count > 0 {
            self.prev_avg = self.sum as f64 / self.count as f64;
            self.sum = 0;
            self.count = 0;
        }
        self.prev_avg
    }
}

/// Mean of the samples added since the last read.
///
/// Reading closes the window: sum and count restart at zero and the mean is
/// remembered, so a read with no new samples returns the previous mean.
pub struct Average {
    desc: Arc<MetricDescriptor>,
    label_values: Vec<String>,
    window: Mutex<AverageWindow>,
}

impl Average {
    pub fn add(&self, v: i64) {
        let mut w = self.window.lock();
        w.sum = w.sum.wrapping_add(v);
        w.count += 1;
    }

    /// Reset sum, count and the remembered mean.
    pub fn clear(&self) {
        *self.window.lock() = AverageWindow::default();
    }

    pub fn get_avg(&self) -> f64 {
        self.window.lock().take_avg()
    }

    /// Mean truncated to an integer.
    pub fn get(&self) -> i64 {
        self.get_avg() as i64
    }

    pub fn collect(&self) -> i64 {
        self.get()
    }
}

impl Metric for Average {
    fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    fn label_values(&self) -> &[String] {
        &self.label_values
    }

    fn get_value(&self) -> MetricValue {
        MetricValue::Float(self.get_avg())
    }

    fn collect_value(&self) -> MetricValue {
        MetricValue::Float(self.get_avg())
    }
}

impl MetricFactory for Average {
    fn supports(kind: MetricKind) -> bool {
        kind == MetricKind::Average
    }

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            window: Mutex::new(AverageWindow::default()),
        }
    }
}
