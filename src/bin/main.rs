use clap::Parser;
use multipass_exporter::bootstrap::init_collectors;
use multipass_exporter::cli::Args;
use multipass_exporter::config::{ConfigSource, Configuration};
use multipass_exporter::logging::setup_logging;
use multipass_exporter::metrics::schema::MetricSchema;
use multipass_exporter::server::start_server;
use multipass_exporter::server::state::AppState;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (configuration, source) = Configuration::load(args.config.as_deref())?;
    let _guard = setup_logging(&configuration.log_level)?;

    match (&source, &args.config) {
        (ConfigSource::File, Some(path)) => {
            tracing::info!(config = %path.display(), "Loaded configuration")
        }
        (ConfigSource::Missing, Some(path)) => {
            tracing::info!(config = %path.display(), "Configuration file not found, using defaults")
        }
        _ => tracing::info!("Using default configuration"),
    }
    tracing::info!(
        port = configuration.port,
        metrics_path = %configuration.metrics_path,
        timeout_seconds = configuration.timeout_seconds,
        log_level = %configuration.log_level,
        "Starting Multipass Exporter"
    );

    let schema = Arc::new(MetricSchema::new());
    let collectors = Arc::new(init_collectors(&configuration, schema.clone()));

    let state = AppState {
        configuration: Arc::new(configuration),
        schema,
        collectors,
    };

    start_server(state).await?;
    tracing::info!("Bye!");

    Ok(())
}
