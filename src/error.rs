use std::time::Duration;
use thiserror::Error;

/// Reasons a single inventory query can fail. Every variant aborts the
/// current scrape and nothing else.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("multipass info timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("multipass info failed: {reason}: {stderr}")]
    ExecutionFailure { reason: String, stderr: String },

    #[error("error parsing JSON: {source}; stdout={stdout}; stderr={stderr}")]
    ParseFailure {
        #[source]
        source: serde_json::Error,
        stdout: String,
        stderr: String,
    },
}
