use crate::domain::Descriptor;

const INSTANCE_LABELS: &[&str] = &["name", "release"];

/// The fixed table of every family this exporter can publish. Built once at
/// startup and shared by reference, never registered globally.
#[derive(Debug, Clone)]
pub struct MetricSchema {
    pub instances_total: Descriptor,
    pub instances_running: Descriptor,
    pub instances_stopped: Descriptor,
    pub instances_deleted: Descriptor,
    pub instances_suspended: Descriptor,
    pub instance_memory_bytes: Descriptor,
    pub instance_cpu_total: Descriptor,
    pub instance_load_1m: Descriptor,
    pub instance_load_5m: Descriptor,
    pub instance_load_15m: Descriptor,
    pub collection_error: Descriptor,
}

impl MetricSchema {
    pub fn new() -> Self {
        Self {
            instances_total: Descriptor::new(
                "multipass_instances_total",
                "Total number of Multipass instances",
                &[],
            ),
            instances_running: Descriptor::new(
                "multipass_instances_running",
                "Total number of Multipass running instances",
                &[],
            ),
            instances_stopped: Descriptor::new(
                "multipass_instances_stopped",
                "Total number of Multipass stopped instances",
                &[],
            ),
            instances_deleted: Descriptor::new(
                "multipass_instances_deleted",
                "Total number of Multipass deleted instances",
                &[],
            ),
            instances_suspended: Descriptor::new(
                "multipass_instances_suspended",
                "Total number of Multipass suspended instances",
                &[],
            ),
            instance_memory_bytes: Descriptor::new(
                "multipass_instance_memory_bytes",
                "Memory usage of Multipass instances in bytes",
                INSTANCE_LABELS,
            ),
            instance_cpu_total: Descriptor::new(
                "multipass_instance_cpu_total",
                "Total number of CPUs in Multipass instances",
                INSTANCE_LABELS,
            ),
            instance_load_1m: Descriptor::new(
                "multipass_instance_load_1m",
                "Average number of processes running on the CPU or in queue waiting for CPU time in the last minute",
                INSTANCE_LABELS,
            ),
            instance_load_5m: Descriptor::new(
                "multipass_instance_load_5m",
                "Average number of processes running on the CPU or in queue waiting for CPU time in the last 5 minutes",
                INSTANCE_LABELS,
            ),
            instance_load_15m: Descriptor::new(
                "multipass_instance_load_15m",
                "Average number of processes running on the CPU or in queue waiting for CPU time in the last 15 minutes",
                INSTANCE_LABELS,
            ),
            collection_error: Descriptor::new(
                "multipass_error",
                "Error collecting metrics from Multipass",
                &[],
            ),
        }
    }

    /// Every descriptor, in exposition order.
    pub fn descriptors(&self) -> [&Descriptor; 11] {
        [
            &self.instances_total,
            &self.instances_running,
            &self.instances_stopped,
            &self.instances_deleted,
            &self.instances_suspended,
            &self.instance_memory_bytes,
            &self.instance_cpu_total,
            &self.instance_load_1m,
            &self.instance_load_5m,
            &self.instance_load_15m,
            &self.collection_error,
        ]
    }
}

impl Default for MetricSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::MetricSchema;
    use std::collections::HashSet;

    #[test]
    fn test_descriptor_names_are_unique() {
        let schema = MetricSchema::new();
        let names: HashSet<_> = schema.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(11, names.len());
    }

    #[test]
    fn test_per_instance_families_carry_name_and_release() {
        let schema = MetricSchema::new();
        for desc in [
            &schema.instance_memory_bytes,
            &schema.instance_cpu_total,
            &schema.instance_load_1m,
            &schema.instance_load_5m,
            &schema.instance_load_15m,
        ] {
            assert_eq!(&["name", "release"], desc.labels);
        }

        assert!(schema.instances_total.labels.is_empty());
        assert!(schema.collection_error.labels.is_empty());
    }
}
