use crate::domain::{Collector, Metric, MetricReading};
use crate::error::FetchError;
use crate::metrics::schema::MetricSchema;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

pub const STATE_RUNNING: &str = "Running";
pub const STATE_STOPPED: &str = "Stopped";
pub const STATE_DELETED: &str = "Deleted";
pub const STATE_SUSPENDED: &str = "Suspended";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceRecord {
    pub name: String,
    pub state: String,
    pub release: String,
    /// Zero means the tool reported no usage data.
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub cpu_count: String,
    pub load_averages: Option<[f64; 3]>,
}

/// All instances from one inventory query, keyed by instance name.
pub type InstanceSnapshot = BTreeMap<String, InstanceRecord>;

pub trait DataSource {
    fn instances(&self) -> impl Future<Output = Result<InstanceSnapshot, FetchError>> + Send;
}

/// Computes every reading for one snapshot. Pure: the same snapshot always
/// yields the same ordered readings.
pub fn derive(schema: &MetricSchema, snapshot: &InstanceSnapshot) -> Vec<MetricReading> {
    let mut readings = Vec::with_capacity(5 + snapshot.len() * 5);

    readings.push(MetricReading::new(
        &schema.instances_total,
        snapshot.len() as f64,
    ));

    for (desc, state) in [
        (&schema.instances_running, STATE_RUNNING),
        (&schema.instances_stopped, STATE_STOPPED),
        (&schema.instances_deleted, STATE_DELETED),
        (&schema.instances_suspended, STATE_SUSPENDED),
    ] {
        let count = count_by_state(snapshot, state);
        tracing::debug!(metric = desc.name, count, "Collecting instance metric");
        readings.push(MetricReading::new(desc, count as f64));
    }

    collect_memory(schema, snapshot, &mut readings);
    collect_cpu(schema, snapshot, &mut readings);
    collect_load(schema, snapshot, &mut readings);

    readings
}

/// The single reading published in place of the normal set when fetching fails.
pub fn error_readings(schema: &MetricSchema) -> Vec<MetricReading> {
    vec![MetricReading::new(&schema.collection_error, 1.0)]
}

pub fn count_by_state(snapshot: &InstanceSnapshot, state: &str) -> usize {
    snapshot.values().filter(|i| i.state == state).count()
}

fn collect_memory(schema: &MetricSchema, snapshot: &InstanceSnapshot, out: &mut Vec<MetricReading>) {
    let mut collected = 0;

    for (name, info) in snapshot {
        if info.memory_used_bytes == 0 {
            tracing::debug!(instance = %name, "Skipping instance - memory usage is 0");
            continue;
        }

        out.push(MetricReading::with_labels(
            &schema.instance_memory_bytes,
            info.memory_used_bytes as f64,
            &[name.as_str(), info.release.as_str()],
        ));
        collected += 1;
    }

    tracing::debug!(metrics_collected = collected, "Collected memory metrics");
}

fn collect_cpu(schema: &MetricSchema, snapshot: &InstanceSnapshot, out: &mut Vec<MetricReading>) {
    let mut collected = 0;

    for (name, info) in snapshot {
        let raw = info.cpu_count.trim();
        if raw.is_empty() {
            tracing::debug!(instance = %name, "Skipping instance - CPU count is empty");
            continue;
        }

        let Some(cpu_count) = leading_integer(raw) else {
            tracing::error!(instance = %name, cpu_count = raw, "Failed to parse CPU count");
            continue;
        };

        out.push(MetricReading::with_labels(
            &schema.instance_cpu_total,
            cpu_count as f64,
            &[name.as_str(), info.release.as_str()],
        ));
        collected += 1;
    }

    tracing::debug!(metrics_collected = collected, "Collected CPU metrics");
}

/// Reads the integer at the start of `raw`, ignoring whatever trails it, so
/// `"3"`, `"3.0"` and `"3 cores"` all read as 3.
pub fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits_len = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits_len == 0 {
        return None;
    }

    raw[..sign_len + digits_len].parse().ok()
}

fn collect_load(schema: &MetricSchema, snapshot: &InstanceSnapshot, out: &mut Vec<MetricReading>) {
    let mut collected = 0;

    for (name, info) in snapshot {
        let Some([load1m, load5m, load15m]) = info.load_averages else {
            tracing::debug!(instance = %name, "Skipping instance - load needs 3 values");
            continue;
        };

        let labels = [name.as_str(), info.release.as_str()];
        out.push(MetricReading::with_labels(&schema.instance_load_1m, load1m, &labels));
        out.push(MetricReading::with_labels(&schema.instance_load_5m, load5m, &labels));
        out.push(MetricReading::with_labels(&schema.instance_load_15m, load15m, &labels));
        collected += 1;
    }

    tracing::debug!(metrics_collected = collected, "Collected CPU load metrics");
}

pub struct Instances;

impl Instances {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Instances {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Metric<T> for Instances
where
    T: DataSource + Send + Sync + 'static,
{
    fn register(self, schema: Arc<MetricSchema>, data_source: T) -> Box<dyn Collector> {
        Box::new(InstanceCollector::new(schema, data_source))
    }
}

pub struct InstanceCollector<T> {
    schema: Arc<MetricSchema>,
    data_source: T,
}

impl<T> InstanceCollector<T>
where
    T: DataSource + Send + Sync + 'static,
{
    pub fn new(schema: Arc<MetricSchema>, data_source: T) -> Self {
        Self {
            schema,
            data_source,
        }
    }
}

#[async_trait::async_trait]
impl<T> Collector for InstanceCollector<T>
where
    T: DataSource + Send + Sync + 'static,
{
    async fn collect(&self) -> Vec<MetricReading> {
        tracing::debug!("Starting metrics collection");

        match self.data_source.instances().await {
            Ok(snapshot) => derive(&self.schema, &snapshot),
            Err(e) => {
                tracing::error!("Failed to get multipass info: {}", e);
                error_readings(&self.schema)
            }
        }
    }
}
