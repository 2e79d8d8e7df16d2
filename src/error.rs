//! Error types for commitsmith modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, parsing, and validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Global config not found at {}. Create it with at least a prompt_template.",
        .0.display()
    )]
    Missing(PathBuf),

    #[error("Could not determine the global config location (no home directory)")]
    NoConfigDir,

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config key '{key}' must be {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("Invalid pattern '{pattern}' in {key}: {source}")]
    InvalidPattern {
        key: &'static str,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },
}

/// Errors from git repository access.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not inside a git repository: {0}")]
    Discover(#[source] git2::Error),

    #[error("Repository has no work tree (bare repositories are not supported)")]
    Bare,

    #[error("Failed to collect staged diff: {0}")]
    Diff(#[source] git2::Error),
}

/// Errors from the text-generation backend process.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend '{0}' not found on PATH")]
    NotInstalled(String),

    #[error("Failed to spawn backend process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Backend I/O failed: {0}")]
    Io(#[source] std::io::Error),

    #[error("Backend process timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors from parsing the backend response.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResponseError {
    #[error("No fenced commit message block found in backend output")]
    NoCommitBlockFound,
}

/// Errors that abort the hook with a non-zero exit.
#[derive(Error, Debug)]
pub enum HookError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Backend exited with code {code} without a usable message. Output:\n{excerpt}")]
    BackendInvocationFailure { code: i32, excerpt: String },

    #[error("Backend output contained no fenced commit message block. Output:\n{excerpt}")]
    NoCommitBlockFound { excerpt: String },

    #[error("Failed to write commit message to {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
