use crate::config::Configuration;
use crate::domain::Collector;
use crate::metrics::schema::MetricSchema;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub configuration: Arc<Configuration>,
    pub schema: Arc<MetricSchema>,
    pub collectors: Arc<Vec<Box<dyn Collector>>>,
}
