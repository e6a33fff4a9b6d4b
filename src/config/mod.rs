//! Detox config documents
//!
//! Loading the external config file, merging raw documents, built-in
//! defaults, and the typed records composition works on.

mod defaults;
mod loader;
mod merge;
mod types;

pub use defaults::BuiltinDefaults;
pub use loader::{load_external_config, LoadedConfig, PACKAGE_JSON_KEY, SEARCH_PLACES};
pub use merge::{deep_merge, defaults_deep, fill_layers, merge_layers, Layer};
pub use types::{
    ArtifactsSection, BehaviorLayer, CleanupLayer, DetoxConfig, DeviceConfig, InitLayer,
    PluginSetting, PluginsSection, SessionLayer,
};
