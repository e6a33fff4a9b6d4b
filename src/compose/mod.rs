//! Configuration composition
//!
//! `compose_detox_config` loads the external config, merges the caller's
//! override on top, selects the device configuration and derives the
//! artifacts, behavior and session sections from it.

mod artifacts;
mod behavior;
mod device;
mod session;

pub use artifacts::{
    compose_artifacts_config, resolve_artifacts_path_builder, ArtifactPlugins, ArtifactsConfig,
    ModuleResolver, PathBuilderExport, PathBuilderFactory, PathBuilderRegistry,
};
pub use behavior::{
    compose_behavior_config, BehaviorConfig, CleanupBehavior, InitBehavior, UserParams,
};
pub use device::{compose_device_config, hint_configurations, SelectedDevice};
pub use session::{allocate_free_port, compose_session_config, generate_session_id, SessionConfig};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_external_config, merge_layers, DetoxConfig, DeviceConfig};
use crate::error::{Error, Result};

/// Inputs to a single composition.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Directory the config search starts from; the process working
    /// directory when unset
    pub cwd: Option<PathBuf>,

    /// Command-line overrides
    pub argv: CliArgs,

    /// Configuration name chosen by the caller; beats `--configuration`
    pub selected_configuration: Option<String>,

    /// Merged over the external config, overlay wins
    pub override_config: Option<Value>,

    pub user_params: Option<UserParams>,

    /// Run start time, used to name the artifacts root directory
    pub start_time: DateTime<Utc>,

    /// Resolves `artifacts.pathBuilder` module paths
    pub module_resolver: Arc<dyn ModuleResolver>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            argv: CliArgs::default(),
            selected_configuration: None,
            override_config: None,
            user_params: None,
            start_time: Utc::now(),
            module_resolver: Arc::new(PathBuilderRegistry::default()),
        }
    }
}

/// Where the composed configuration came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMeta {
    /// Name of the selected device configuration
    pub configuration: String,

    /// Config file that was loaded, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

/// The fully composed Detox configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedConfig {
    pub meta: ConfigMeta,
    pub artifacts_config: ArtifactsConfig,
    pub behavior_config: BehaviorConfig,
    pub device_config: DeviceConfig,
    pub session_config: SessionConfig,
}

fn is_empty_config(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn no_config() -> Error {
    Error::Runtime {
        message: "Cannot start Detox without a configuration".to_string(),
        hint: Some(
            "Make sure your package.json has \"detox\" section, or there's .detoxrc file \
             in the working directory"
                .to_string(),
        ),
        debug_info: None,
    }
}

/// Compose the configuration for one test run.
pub async fn compose_detox_config(options: ComposeOptions) -> Result<ComposedConfig> {
    let ComposeOptions {
        cwd,
        argv: cli,
        selected_configuration,
        override_config,
        user_params,
        start_time,
        module_resolver,
    } = options;

    let cwd = match cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    let external = load_external_config(cli.config_path.as_deref(), &cwd).await?;
    let location = external.as_ref().map(|loaded| loaded.filepath.clone());

    let layers: Vec<Value> = external
        .map(|loaded| loaded.config)
        .into_iter()
        .chain(override_config)
        .collect();
    let merged = merge_layers(layers);

    if is_empty_config(&merged) {
        return Err(no_config());
    }

    let mut detox_config = DetoxConfig::from_value(merged)?;

    let requested = selected_configuration
        .filter(|name| !name.is_empty())
        .or_else(|| cli.configuration.clone().filter(|name| !name.is_empty()));
    if let Some(name) = requested {
        debug!(configuration = %name, "Configuration selected explicitly");
        detox_config.selected_configuration = Some(name);
    }

    let SelectedDevice {
        name: configuration,
        config: device_config,
    } = compose_device_config(&detox_config, &cli)?;

    let artifacts_config = compose_artifacts_config(
        &configuration,
        &device_config,
        &detox_config,
        &cli,
        start_time,
        module_resolver.as_ref(),
    )?;
    let behavior_config =
        compose_behavior_config(&detox_config, &device_config, user_params.as_ref(), &cli);
    let session_config = compose_session_config(&detox_config, &device_config).await?;

    info!(
        configuration = %configuration,
        location = ?location,
        server = %session_config.server,
        "Composed Detox config"
    );

    Ok(ComposedConfig {
        meta: ConfigMeta {
            configuration,
            location,
        },
        artifacts_config,
        behavior_config,
        device_config,
        session_config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> ComposeOptions {
        ComposeOptions {
            cwd: Some(dir.path().to_path_buf()),
            ..ComposeOptions::default()
        }
    }

    #[tokio::test]
    async fn test_override_only() {
        let dir = TempDir::new().unwrap();
        let composed = compose_detox_config(ComposeOptions {
            override_config: Some(json!({
                "configurations": {"ios": {"type": "ios.simulator", "device": "iPhone X"}}
            })),
            ..options(&dir)
        })
        .await
        .unwrap();

        assert_eq!(composed.meta.configuration, "ios");
        assert!(composed.meta.location.is_none());
        assert_eq!(composed.device_config.device, "iPhone X");
    }

    #[tokio::test]
    async fn test_nothing_to_compose() {
        let dir = TempDir::new().unwrap();
        let err = compose_detox_config(options(&dir)).await.unwrap_err();

        assert!(err.to_string().contains("Cannot start Detox without a configuration"));
        assert!(err.hint().unwrap().contains(".detoxrc"));
    }

    #[tokio::test]
    async fn test_empty_override_is_no_config() {
        let dir = TempDir::new().unwrap();
        let err = compose_detox_config(ComposeOptions {
            override_config: Some(json!({})),
            ..options(&dir)
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Cannot start Detox"));
    }

    #[tokio::test]
    async fn test_call_parameter_beats_cli_configuration() {
        let dir = TempDir::new().unwrap();
        let composed = compose_detox_config(ComposeOptions {
            override_config: Some(json!({
                "configurations": {
                    "a": {"type": "ios.simulator", "device": "iPhone X"},
                    "b": {"type": "android.emulator", "device": "Pixel"}
                }
            })),
            selected_configuration: Some("a".to_string()),
            argv: CliArgs {
                configuration: Some("b".to_string()),
                ..CliArgs::default()
            },
            ..options(&dir)
        })
        .await
        .unwrap();

        assert_eq!(composed.meta.configuration, "a");
    }

    #[tokio::test]
    async fn test_composed_shape() {
        let dir = TempDir::new().unwrap();
        let composed = compose_detox_config(ComposeOptions {
            override_config: Some(json!({
                "configurations": {"ios": {"type": "ios.simulator", "device": "iPhone X"}}
            })),
            ..options(&dir)
        })
        .await
        .unwrap();

        let value = serde_json::to_value(&composed).unwrap();
        for key in ["meta", "artifactsConfig", "behaviorConfig", "deviceConfig", "sessionConfig"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["meta"]["configuration"], "ios");
        assert!(value["meta"].get("location").is_none());
    }
}
