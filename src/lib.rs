//! Detox configuration composition
//!
//! Merges command-line flags, an external config file (`.detoxrc*` or the
//! `detox` section of `package.json`) and built-in defaults into one
//! composed configuration with device, artifacts, behavior and session
//! sections.

pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::CliArgs;
pub use compose::{
    compose_artifacts_config, compose_behavior_config, compose_detox_config,
    compose_device_config, compose_session_config, ArtifactsConfig, BehaviorConfig,
    ComposeOptions, ComposedConfig, ConfigMeta, ModuleResolver, PathBuilderExport,
    PathBuilderRegistry, SelectedDevice, SessionConfig, UserParams,
};
pub use config::{load_external_config, DetoxConfig, DeviceConfig, LoadedConfig};
pub use error::{Error, Result};
