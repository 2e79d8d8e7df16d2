//! Typed view of the effective configuration.

use crate::config::store::EffectiveConfig;
use crate::diff::DiffFilter;
use crate::error::ConfigError;
use crate::hook::skip::SkipPatterns;

pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 50;
pub const DEFAULT_MAX_BODY_LINE_LENGTH: usize = 72;
pub const DEFAULT_BACKEND_COMMAND: &str = "claude";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 60;

/// How to reach the text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_BACKEND_COMMAND.to_string(),
            args: vec!["-p".to_string()],
            timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
        }
    }
}

/// Everything the hook needs from configuration, with defaults applied
/// and patterns compiled.
#[derive(Debug, Clone)]
pub struct HookSettings {
    pub prompt_template: String,
    pub enabled: bool,
    pub message_generation_enabled: bool,
    pub max_subject_length: usize,
    pub max_body_line_length: usize,
    pub excluded_repositories: Vec<String>,
    pub skip_patterns: SkipPatterns,
    pub diff_filter: DiffFilter,
    pub backend: BackendSettings,
}

impl HookSettings {
    /// Build settings from a validated config.
    pub fn from_config(config: &EffectiveConfig) -> Result<Self, ConfigError> {
        let prompt_template = config
            .get_str("prompt_template")?
            .unwrap_or_default()
            .to_string();

        let defaults = BackendSettings::default();
        let backend = BackendSettings {
            command: config
                .get_str("backend.command")?
                .map(str::to_string)
                .unwrap_or(defaults.command),
            args: match config.get("backend.args") {
                Some(_) => config.get_str_list("backend.args")?,
                None => defaults.args,
            },
            timeout_secs: config
                .get_usize("backend.timeout_secs", defaults.timeout_secs as usize)?
                as u64,
        };

        Ok(Self {
            prompt_template,
            enabled: config.get_bool("enabled", true)?,
            message_generation_enabled: config.get_bool("message_generation_enabled", true)?,
            max_subject_length: config
                .get_usize("max_subject_length", DEFAULT_MAX_SUBJECT_LENGTH)?,
            max_body_line_length: config
                .get_usize("max_body_line_length", DEFAULT_MAX_BODY_LINE_LENGTH)?,
            excluded_repositories: config.get_str_list("excluded_repositories")?,
            skip_patterns: SkipPatterns::new(&config.get_str_list("skip_patterns")?),
            diff_filter: DiffFilter::new(&config.get_str_list("file_ignore_patterns")?)?,
            backend,
        })
    }

    pub fn is_excluded(&self, repo_name: &str) -> bool {
        self.excluded_repositories.iter().any(|r| r == repo_name)
    }
}
