use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "multipass-exporter", version, about = "Prometheus exporter for Multipass instances")]
pub struct Args {
    /// Path to configuration file (optional)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
