//! commitsmith - A git `prepare-commit-msg` hook that drafts commit messages.
//!
//! # Overview
//!
//! commitsmith reads the staged diff, drops files matching configured ignore
//! globs, renders a prompt template with repository context, and asks an AI
//! CLI for a message. The first fenced block of the reply is written to the
//! commit message file. Every precondition that fails quietly skips the hook
//! so a commit is never blocked by a missing tool or disabled setting.

pub mod backend;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod git;
pub mod hook;
pub mod prompt;
pub mod response;

// Re-export commonly used types
pub use backend::{BackendOutput, CliBackend, TextGenerationBackend};
pub use config::{ConfigPaths, EffectiveConfig, HookSettings};
pub use diff::{DiffFilter, UnifiedDiff};
pub use error::{BackendError, ConfigError, GitError, HookError, ResponseError};
pub use git::{Git2Source, GitSource};
pub use hook::{Hook, HookArgs, HookOutcome, HookStage};
