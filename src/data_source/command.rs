use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Everything a finished child process left behind.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("deadline exceeded")]
    TimedOut,

    #[error("failed to spawn: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs a named program with arguments under a deadline.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput, RunError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput, RunError>> + Send {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // the child is killed when the pending output future is dropped on timeout
            .kill_on_drop(true);

        async move {
            let output = tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| RunError::TimedOut)??;

            Ok::<_, RunError>(CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }
}
