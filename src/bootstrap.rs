use crate::config::Configuration;
use crate::data_source::command::TokioCommandRunner;
use crate::data_source::multipass::Multipass;
use crate::domain::{Collector, Metric};
use crate::metrics::instances::Instances;
use crate::metrics::schema::MetricSchema;
use std::sync::Arc;

pub fn init_collectors(
    configuration: &Configuration,
    schema: Arc<MetricSchema>,
) -> Vec<Box<dyn Collector>> {
    let mut collectors = vec![];

    let data_source = Multipass::new(TokioCommandRunner::new(), configuration.timeout());
    collectors.push(Instances::new().register(schema, data_source));

    collectors
}
