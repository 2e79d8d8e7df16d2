//! Text-generation backend integration.

pub mod subprocess;

use async_trait::async_trait;

use crate::error::BackendError;

pub use subprocess::CliBackend;

/// What the backend process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutput {
    /// Standard output followed by standard error.
    pub output: String,
    /// Process exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
}

impl BackendOutput {
    /// Exit code 0 and some non-blank output.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && !self.output.trim().is_empty()
    }
}

/// A service that turns a prompt into text.
///
/// This abstraction allows substituting the backend process in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Whether the backend can be invoked at all.
    fn is_available(&self) -> bool;

    /// Send `prompt` and wait for the result.
    async fn invoke(&self, prompt: &str) -> Result<BackendOutput, BackendError>;
}
