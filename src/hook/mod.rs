//! The prepare-commit-msg hook pipeline.
//!
//! Stages run in a fixed order and most of them can end the run early:
//!
//! 1. [`HookStage::CheckInvocationSource`]
//! 2. [`HookStage::CheckRebaseInProgress`]
//! 3. [`HookStage::LoadAndValidateConfig`] (fatal on failure)
//! 4. [`HookStage::CheckGlobalEnable`]
//! 5. [`HookStage::CheckRepoExcluded`]
//! 6. [`HookStage::CheckBackendAvailable`]
//! 7. [`HookStage::CheckGenerationEnabled`]
//! 8. [`HookStage::ObtainStagedDiff`]
//! 9. [`HookStage::FilterDiff`]
//! 10. [`HookStage::CheckExistingMessageSkipPattern`]
//! 11. [`HookStage::GenerateMessage`] (fatal on failure)

pub mod skip;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::backend::TextGenerationBackend;
use crate::config::{self, BackendSettings, ConfigPaths, HookSettings};
use crate::context::ContextCollector;
use crate::diff::UnifiedDiff;
use crate::error::{HookError, ResponseError};
use crate::git::GitSource;
use crate::prompt::{PromptVars, render};
use crate::response;

/// Invocation sources that let the hook run.
const PROCEED_SOURCES: [&str; 2] = ["", "message"];

/// Arguments git passes to `prepare-commit-msg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookArgs {
    pub message_file: PathBuf,
    /// `message`, `template`, `merge`, `squash`, `commit`, or absent.
    pub source: Option<String>,
    /// Commit git passes for amend and `-c`/`-C`. Only logged; the message
    /// is generated from the staged diff either way.
    pub sha: Option<String>,
}

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    CheckInvocationSource,
    CheckRebaseInProgress,
    LoadAndValidateConfig,
    CheckGlobalEnable,
    CheckRepoExcluded,
    CheckBackendAvailable,
    CheckGenerationEnabled,
    ObtainStagedDiff,
    FilterDiff,
    CheckExistingMessageSkipPattern,
    GenerateMessage,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookStage::CheckInvocationSource => "invocation source",
            HookStage::CheckRebaseInProgress => "rebase in progress",
            HookStage::LoadAndValidateConfig => "configuration",
            HookStage::CheckGlobalEnable => "hook disabled",
            HookStage::CheckRepoExcluded => "repository excluded",
            HookStage::CheckBackendAvailable => "backend unavailable",
            HookStage::CheckGenerationEnabled => "message generation disabled",
            HookStage::ObtainStagedDiff => "nothing staged",
            HookStage::FilterDiff => "all staged files ignored",
            HookStage::CheckExistingMessageSkipPattern => "existing message kept",
            HookStage::GenerateMessage => "message generation",
        };
        f.write_str(name)
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The hook stopped early at this stage and left the message file alone.
    Skipped(HookStage),
    /// A generated message was written to the message file.
    Written(String),
}

/// Drives one hook run against a repository.
pub struct Hook<G: GitSource> {
    git: G,
    config_paths: ConfigPaths,
}

impl<G: GitSource> Hook<G> {
    pub fn new(git: G, config_paths: ConfigPaths) -> Self {
        Self { git, config_paths }
    }

    /// Run every stage in order.
    ///
    /// `make_backend` is called once the configuration is known. Skips
    /// return `Ok(HookOutcome::Skipped(_))`; only configuration problems
    /// and a failed generation are errors.
    pub async fn run<B, F>(
        &self,
        args: &HookArgs,
        make_backend: F,
    ) -> Result<HookOutcome, HookError>
    where
        B: TextGenerationBackend,
        F: FnOnce(&BackendSettings) -> B,
    {
        let source = args.source.as_deref().unwrap_or("");
        debug!("Invoked with source {source:?}, sha {:?}", args.sha);
        if !PROCEED_SOURCES.contains(&source) {
            return Ok(skip(HookStage::CheckInvocationSource));
        }

        if self.git.rebase_in_progress() {
            return Ok(skip(HookStage::CheckRebaseInProgress));
        }

        let effective = config::load(&self.config_paths)?;
        config::validate(&effective)?;
        let settings = HookSettings::from_config(&effective)?;

        if !settings.enabled {
            return Ok(skip(HookStage::CheckGlobalEnable));
        }

        let repo_name = self.git.repo_name();
        if settings.is_excluded(&repo_name) {
            return Ok(skip(HookStage::CheckRepoExcluded));
        }

        let backend = make_backend(&settings.backend);
        if !backend.is_available() {
            warn!(
                "Backend '{}' not found; leaving the commit message to you",
                settings.backend.command
            );
            return Ok(skip(HookStage::CheckBackendAvailable));
        }

        if !settings.message_generation_enabled {
            return Ok(skip(HookStage::CheckGenerationEnabled));
        }

        let raw_diff = self.git.staged_diff()?;
        if raw_diff.trim().is_empty() {
            return Ok(skip(HookStage::ObtainStagedDiff));
        }

        let diff = settings.diff_filter.filter(UnifiedDiff::parse(&raw_diff));
        if diff.is_blank() {
            return Ok(skip(HookStage::FilterDiff));
        }

        let existing = read_existing_message(&args.message_file);
        if !existing.trim().is_empty()
            && let Some(pattern) = settings.skip_patterns.first_match(&existing)
        {
            debug!("Existing message matches skip pattern '{pattern}'");
            return Ok(skip(HookStage::CheckExistingMessageSkipPattern));
        }

        let message = self.generate(&settings, &repo_name, &diff, &backend).await?;
        write_message(&args.message_file, &message)?;
        info!("Wrote generated commit message to {}", args.message_file.display());
        Ok(HookOutcome::Written(message))
    }

    async fn generate<B: TextGenerationBackend>(
        &self,
        settings: &HookSettings,
        repo_name: &str,
        diff: &UnifiedDiff,
        backend: &B,
    ) -> Result<String, HookError> {
        let (author_name, author_email) = self.git.author();
        let vars = PromptVars {
            repo_name: repo_name.to_string(),
            max_subject_length: settings.max_subject_length,
            max_body_length: settings.max_body_line_length,
            author_name,
            author_email,
            project_context: ContextCollector::new(self.git.work_dir()).collect(),
            diff: diff.to_text(),
        };
        let prompt = render(&settings.prompt_template, &vars);
        debug!(
            "Prompt is {} chars covering {} file(s)",
            prompt.len(),
            diff.paths().len()
        );

        let result = backend.invoke(&prompt).await?;
        if !result.is_success() {
            return Err(HookError::BackendInvocationFailure {
                code: result.exit_code,
                excerpt: response::excerpt(&result.output),
            });
        }

        response::parse(&result.output).map_err(|_: ResponseError| {
            HookError::NoCommitBlockFound {
                excerpt: response::excerpt(&result.output),
            }
        })
    }
}

fn skip(stage: HookStage) -> HookOutcome {
    info!("Skipping commit message generation: {stage}");
    HookOutcome::Skipped(stage)
}

/// The message git or `-m` already put in the file, without comment lines.
fn read_existing_message(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => skip::strip_comments(&content),
        Err(e) => {
            debug!("No existing message at {}: {e}", path.display());
            String::new()
        }
    }
}

/// Replace the message file atomically.
///
/// The temp file lives next to the target and is removed on drop if
/// anything fails before the rename.
fn write_message(path: &Path, message: &str) -> Result<(), HookError> {
    let write_failed = |source| HookError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(message.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
