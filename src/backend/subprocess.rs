//! Backend CLI spawning.

use std::env;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::backend::{BackendOutput, TextGenerationBackend};
use crate::config::BackendSettings;
use crate::error::BackendError;

/// Environment variable to override the configured timeout.
const TIMEOUT_ENV_VAR: &str = "COMMITSMITH_TIMEOUT";

/// Get the timeout, honoring `COMMITSMITH_TIMEOUT` over the configured value.
///
/// Logs a warning if the environment variable is set but contains
/// an invalid value (non-numeric, empty, or negative).
fn get_timeout(configured_secs: u64) -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using {}s",
                    TIMEOUT_ENV_VAR, v, configured_secs
                );
                Duration::from_secs(configured_secs)
            }
        },
        _ => Duration::from_secs(configured_secs),
    }
}

/// Backend that runs a CLI and feeds it the prompt on stdin.
#[derive(Debug, Clone)]
pub struct CliBackend {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CliBackend {
    pub fn new(settings: &BackendSettings) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            timeout: get_timeout(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl TextGenerationBackend for CliBackend {
    /// Uses the `which` crate for cross-platform executable detection.
    fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    /// Run the CLI with the prompt on stdin and capture both streams.
    ///
    /// The process is killed if it outlives the timeout.
    async fn invoke(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        let timeout_secs = self.timeout.as_secs();
        debug!(
            "Invoking {} {:?} with a {} byte prompt",
            self.command,
            self.args,
            prompt.len()
        );

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BackendError::NotInstalled(self.command.clone()),
                _ => BackendError::SpawnFailed(e),
            })?;

        let stdin = child.stdin.take();
        let input = prompt.as_bytes().to_vec();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = timeout(self.timeout, async move {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| BackendError::Timeout(timeout_secs))?;

        // A backend that exits without reading stdin is judged by its exit code.
        if let Err(e) = fed {
            debug!("Backend did not consume the whole prompt: {e}");
        }
        let output = output.map_err(BackendError::Io)?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        Ok(BackendOutput {
            output: combined,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
