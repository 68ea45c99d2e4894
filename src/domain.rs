use crate::metrics::schema::MetricSchema;
use std::sync::Arc;

/// A single gauge family of the exported schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl Descriptor {
    pub const fn new(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self { name, help, labels }
    }
}

/// One concrete sample, ready for exposition. `label_values` line up with
/// the descriptor's label keys.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub descriptor: Descriptor,
    pub value: f64,
    pub label_values: Vec<String>,
}

impl MetricReading {
    pub fn new(descriptor: &Descriptor, value: f64) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value,
            label_values: Vec::new(),
        }
    }

    pub fn with_labels(descriptor: &Descriptor, value: f64, label_values: &[&str]) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value,
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

pub trait Metric<T> {
    fn register(self, schema: Arc<MetricSchema>, data_source: T) -> Box<dyn Collector>;
}

#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    async fn collect(&self) -> Vec<MetricReading>;
}
