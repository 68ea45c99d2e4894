use crate::data_source::command::{CommandRunner, RunError};
use crate::error::FetchError;
use crate::metrics::instances::{DataSource, InstanceRecord, InstanceSnapshot};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

pub const MULTIPASS_BINARY: &str = "multipass";
pub const INFO_ARGS: &[&str] = &["info", "--format=json"];

/// Top level of `multipass info --format=json`.
#[derive(Debug, Default, Deserialize)]
pub struct InfoResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: BTreeMap<String, InstanceInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstanceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipv4: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_release: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub load: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_count: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: MemoryInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disks: BTreeMap<String, DiskInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mounts: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiskInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<InstanceInfo> for InstanceRecord {
    fn from(info: InstanceInfo) -> Self {
        let load_averages = match info.load.as_slice() {
            &[one, five, fifteen] => Some([one, five, fifteen]),
            _ => None,
        };

        Self {
            name: info.name,
            state: info.state,
            release: info.release,
            memory_used_bytes: info.memory.used,
            memory_total_bytes: info.memory.total,
            cpu_count: info.cpu_count,
            load_averages,
        }
    }
}

pub fn parse_snapshot(stdout: &[u8], stderr: &[u8]) -> Result<InstanceSnapshot, FetchError> {
    let parse_failure = |source: serde_json::Error| FetchError::ParseFailure {
        source,
        stdout: String::from_utf8_lossy(stdout).into_owned(),
        stderr: String::from_utf8_lossy(stderr).into_owned(),
    };

    // serde would happily build the response from a JSON array, so the
    // top level has to be checked before decoding
    let value: serde_json::Value = serde_json::from_slice(stdout).map_err(parse_failure)?;
    if !value.is_object() {
        return Err(parse_failure(serde::de::Error::custom(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(&value)
        ))));
    }

    let response: InfoResponse = serde_json::from_value(value).map_err(parse_failure)?;

    Ok(response
        .info
        .into_iter()
        .map(|(name, info)| (name, InstanceRecord::from(info)))
        .collect())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Queries the local Multipass daemon through its CLI.
#[derive(Debug, Clone)]
pub struct Multipass<R> {
    runner: R,
    timeout: Duration,
}

impl<R> Multipass<R>
where
    R: CommandRunner,
{
    pub fn new(runner: R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<R> DataSource for Multipass<R>
where
    R: CommandRunner + Send + Sync,
{
    fn instances(&self) -> impl Future<Output = Result<InstanceSnapshot, FetchError>> + Send {
        async move {
            tracing::debug!("Executing multipass info command");

            let output = match self
                .runner
                .run(MULTIPASS_BINARY, INFO_ARGS, self.timeout)
                .await
            {
                Ok(output) => output,
                Err(RunError::TimedOut) => {
                    tracing::error!(timeout = ?self.timeout, "multipass info command timed out");
                    return Err(FetchError::Timeout {
                        timeout: self.timeout,
                    });
                }
                Err(RunError::Spawn(e)) => {
                    tracing::error!("multipass info command could not be started: {}", e);
                    return Err(FetchError::ExecutionFailure {
                        reason: e.to_string(),
                        stderr: String::new(),
                    });
                }
            };

            if !output.success {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let reason = match output.code {
                    Some(code) => format!("exit status: {}", code),
                    None => "terminated by signal".to_string(),
                };
                tracing::error!(stderr = %stderr, "multipass info command failed: {}", reason);
                return Err(FetchError::ExecutionFailure { reason, stderr });
            }

            let snapshot = parse_snapshot(&output.stdout, &output.stderr).map_err(|e| {
                tracing::error!("Failed to parse multipass info JSON: {}", e);
                e
            })?;

            tracing::info!(
                instance_count = snapshot.len(),
                "Successfully parsed multipass info"
            );
            Ok(snapshot)
        }
    }
}
