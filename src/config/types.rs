//! Typed views of the Detox config document
//!
//! The raw document is merged as untyped JSON, then read into these records.
//! Sections that take part in precedence merging have only optional fields;
//! keys this crate does not know about are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use detox_artifacts::{RecordingPluginConfig, ScreenshotPluginConfig, TogglePluginConfig};

use crate::error::{Error, Result};

/// The merged Detox config (external file + caller override).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetoxConfig {
    /// Raw device configurations by name, in document order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_configuration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorLayer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionLayer>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DetoxConfig {
    /// Read a merged config document.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::config_with_hint(
                format!("Invalid Detox config: {}", e),
                "Check that \"artifacts\", \"behavior\" and \"session\" are objects \
                 and \"configurations\" maps names to device configurations",
            )
        })
    }

    /// Configuration names in document order.
    pub fn configuration_names(&self) -> Vec<&str> {
        self.configurations
            .iter()
            .flat_map(|configurations| configurations.keys())
            .map(String::as_str)
            .collect()
    }
}

/// A selected device configuration, with `device` resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// Device driver, e.g. `ios.simulator` or `android.emulator`
    #[serde(rename = "type")]
    pub device_type: String,

    /// Device query the driver resolves to a concrete device
    pub device: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorLayer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionLayer>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceConfig {
    /// The app binary path, required by drivers that install an app.
    pub fn require_binary_path(&self) -> Result<&str> {
        match self.binary_path.as_deref() {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(Error::empty_binary_path()),
        }
    }
}

/// A plugin entry: shorthand mode or expanded settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSetting<T> {
    Mode(String),
    Config(T),
}

/// `artifacts.plugins` as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<PluginSetting<RecordingPluginConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PluginSetting<ScreenshotPluginConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<PluginSetting<RecordingPluginConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<PluginSetting<TogglePluginConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<PluginSetting<TogglePluginConfig>>,

    /// Third-party plugins, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `artifacts` as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,

    /// Module path of a custom path builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_builder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginsSection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_globals: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reinstall_app: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_app: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_device: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `behavior` section (top-level or per device).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitLayer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupLayer>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `session` section (top-level or per device).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
