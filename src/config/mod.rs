//! Layered YAML configuration: global file, repository-local overlay.

pub mod settings;
pub mod store;
pub mod validate;
pub mod value;

pub use settings::{BackendSettings, HookSettings};
pub use store::{ConfigPaths, EffectiveConfig, deep_merge, global_config_path, load};
pub use validate::validate;
pub use value::ConfigValue;
