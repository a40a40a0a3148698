//! Optional local execution of submitted Python code.
//!
//! Off unless `enable_code_execution` is set. The code is fed to
//! `python3 -` on stdin; there is no sandbox beyond a wall-clock timeout and
//! output truncation.

use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{InterviewError, Result};

/// Default wall-clock limit per run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bytes kept from each of stdout/stderr.
pub const MAX_OUTPUT_BYTES: usize = 16_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when killed by timeout or a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub truncated: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CodeRunner {
    enabled: bool,
    interpreter: String,
    timeout: Duration,
}

impl CodeRunner {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            interpreter: "python3".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the interpreter binary (tests use `sh`).
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Runs `code` and captures its output.
    ///
    /// # Errors
    /// - [`InterviewError::ExecutionDisabled`] when execution is off
    /// - [`InterviewError::InvalidInput`] for empty code
    /// - [`InterviewError::Execution`] if the interpreter cannot be spawned
    pub async fn run(&self, code: &str) -> Result<ExecutionOutput> {
        if !self.enabled {
            return Err(InterviewError::ExecutionDisabled);
        }
        if code.trim().is_empty() {
            return Err(InterviewError::InvalidInput("code must not be empty".into()));
        }

        let started = Instant::now();
        let mut child = Command::new(&self.interpreter)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
            // stdin is dropped here so the interpreter sees EOF
        }

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                let (stdout, cut_out) = truncate_output(&output.stdout);
                let (stderr, cut_err) = truncate_output(&output.stderr);
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    exit_code = ?output.status.code(),
                    duration_ms,
                    "code execution finished"
                );
                Ok(ExecutionOutput {
                    stdout,
                    stderr,
                    exit_code: output.status.code(),
                    timed_out: false,
                    truncated: cut_out || cut_err,
                    duration_ms,
                })
            }
            Err(_) => {
                // the child future was dropped, kill_on_drop reaps the process
                warn!(timeout_secs = self.timeout.as_secs(), "code execution timed out");
                Ok(ExecutionOutput {
                    stdout: String::new(),
                    stderr: format!("execution timed out after {}s", self.timeout.as_secs()),
                    exit_code: None,
                    timed_out: true,
                    truncated: false,
                    duration_ms: started.elapsed().as_millis() as u64,
                })
            }
        }
    }
}

fn truncate_output(bytes: &[u8]) -> (String, bool) {
    if bytes.len() <= MAX_OUTPUT_BYTES {
        (String::from_utf8_lossy(bytes).into_owned(), false)
    } else {
        let mut s = String::from_utf8_lossy(&bytes[..MAX_OUTPUT_BYTES]).into_owned();
        s.push_str("\n... [output truncated]");
        (s, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_runner_refuses() {
        let err = CodeRunner::new(false).run("print(1)").await.unwrap_err();
        assert!(matches!(err, InterviewError::ExecutionDisabled));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let runner = CodeRunner::new(true).with_interpreter("sh");
        let out = runner.run("echo hello; echo oops >&2; exit 3").await.unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.timed_out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn long_running_code_times_out() {
        let runner = CodeRunner::new(true)
            .with_interpreter("sh")
            .with_timeout(Duration::from_millis(200));
        let out = runner.run("sleep 5").await.unwrap();
        assert!(out.timed_out);
        assert_eq!(out.exit_code, None);
    }

    #[test]
    fn truncation_marks_output() {
        let (s, cut) = truncate_output(&vec![b'a'; MAX_OUTPUT_BYTES + 1]);
        assert!(cut);
        assert!(s.ends_with("[output truncated]"));
    }
}
