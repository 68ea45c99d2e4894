use crate::domain::MetricReading;
use crate::metrics::schema::MetricSchema;
use anyhow::anyhow;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Renders one scrape's readings in the Prometheus text format.
///
/// A fresh registry is built for every call so that instances which
/// disappeared since the previous scrape never linger, and concurrent scrapes
/// share nothing. Families without readings are left out of the output.
pub fn encode(schema: &MetricSchema, readings: &[MetricReading]) -> anyhow::Result<String> {
    let registry = Registry::new();
    let mut families = HashMap::new();

    for desc in schema.descriptors() {
        let gauge = GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)?;
        registry.register(Box::new(gauge.clone()))?;
        families.insert(desc.name, gauge);
    }

    for reading in readings {
        let gauge = families
            .get(reading.descriptor.name)
            .ok_or_else(|| anyhow!("Unknown metric: {}", reading.descriptor.name))?;

        let labels: Vec<&str> = reading.label_values.iter().map(String::as_str).collect();
        gauge
            .get_metric_with_label_values(labels.as_slice())?
            .set(reading.value);
    }

    let encoder = TextEncoder::new();
    Ok(encoder.encode_to_string(&registry.gather())?)
}

pub fn content_type() -> &'static str {
    prometheus::TEXT_FORMAT
}
