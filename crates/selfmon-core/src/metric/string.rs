use std::sync::Arc;

use parking_lot::Mutex;

use super::{Metric, MetricDescriptor, MetricFactory, MetricKind, MetricValue};

/// Last string value set; emptied on collect.
pub struct StringValue {
    desc: Arc<MetricDescriptor>,
    label_values: Vec<String>,
    value: Mutex<String>,
}

impl StringValue {
    pub fn set(&self, v: impl Into<String>) {
        *self.value.lock() = v.into();
    }

    pub fn get(&self) -> String {
        self.value.lock().clone()
    }

    pub fn collect(&self) -> String {
        std::mem::take(&mut *self.value.lock())
    }
}

impl Metric for StringValue {
    fn descriptor(&self) -> &MetricDescriptor {
        &self.desc
    }

    fn label_values(&self) -> &[String] {
        &self.label_values
    }

    fn get_value(&self) -> MetricValue {
        MetricValue::Text(self.get())
    }

    fn collect_value(&self) -> MetricValue {
        MetricValue::Text(self.collect())
    }
}

impl MetricFactory for StringValue {
    fn supports(kind: MetricKind) -> bool {
        kind == MetricKind::String
    }

    fn new_metric(desc: Arc<MetricDescriptor>, label_values: Vec<String>) -> Self {
        Self {
            desc,
            label_values,
            value: Mutex::new(String::new()),
        }
    }
}
