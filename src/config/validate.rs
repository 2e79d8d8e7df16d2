//! Structural checks on the effective configuration.

use crate::config::store::EffectiveConfig;
use crate::config::value::ConfigValue;
use crate::error::ConfigError;

/// Placeholder that every prompt template must contain.
pub const DIFF_PLACEHOLDER: &str = "{diff}";

/// Validate the effective configuration before the hook does any work.
///
/// Checks in order and stops at the first failure:
/// 1. `prompt_template` is a non-empty string
/// 2. it contains `{diff}`
pub fn validate(config: &EffectiveConfig) -> Result<(), ConfigError> {
    let template = match config.get("prompt_template") {
        None => {
            return Err(ConfigError::Invalid(
                "prompt_template is missing".to_string(),
            ));
        }
        Some(ConfigValue::String(s)) => s,
        Some(other) => {
            return Err(ConfigError::Invalid(format!(
                "prompt_template must be a string, found {}",
                other.kind()
            )));
        }
    };

    if template.trim().is_empty() {
        return Err(ConfigError::Invalid("prompt_template is empty".to_string()));
    }

    if !template.contains(DIFF_PLACEHOLDER) {
        return Err(ConfigError::Invalid(format!(
            "prompt_template must contain the {DIFF_PLACEHOLDER} placeholder"
        )));
    }

    Ok(())
}
