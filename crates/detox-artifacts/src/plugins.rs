//! Artifact plugin settings and shorthand parsing.
//!
//! Every plugin accepts either a full settings object or a mode string.
//! Mode strings are expanded here; settings objects are left to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shorthand parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginConfigError {
    #[error("Unknown {plugin} artifacts mode '{mode}', expected one of: {}", .expected.join(", "))]
    UnknownMode {
        plugin: &'static str,
        mode: String,
        expected: &'static [&'static str],
    },
}

/// An artifact plugin known to the configuration layer.
pub trait ArtifactPlugin {
    /// Key of the plugin under `artifacts.plugins`.
    const NAME: &'static str;

    /// Accepted shorthand modes.
    const MODES: &'static [&'static str];

    /// Expanded settings object.
    type Config;

    /// Expand a shorthand mode string into the plugin's settings.
    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError>;

    /// Error for a mode string this plugin does not accept.
    fn unknown_mode(mode: &str) -> PluginConfigError {
        PluginConfigError::UnknownMode {
            plugin: Self::NAME,
            mode: mode.to_string(),
            expected: Self::MODES,
        }
    }
}

/// Settings for recorders that keep artifacts for all or only failing tests
/// (device logs, videos).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingPluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_only_failed_tests_artifacts: Option<bool>,

    /// Plugin-specific keys (e.g. `android`, `simulator` recorder options)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordingPluginConfig {
    fn new(enabled: bool, keep_only_failed: bool) -> Self {
        Self {
            enabled: Some(enabled),
            keep_only_failed_tests_artifacts: Some(keep_only_failed),
            extra: Map::new(),
        }
    }

    fn parse_mode(mode: &str) -> Option<Self> {
        match mode {
            "all" => Some(Self::new(true, false)),
            "failing" => Some(Self::new(true, true)),
            "none" => Some(Self::new(false, false)),
            _ => None,
        }
    }
}

/// Which test lifecycle points trigger an automatic screenshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeWhen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_start: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_done: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_not_ready: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Screenshot plugin settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotPluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_take_automatic_snapshots: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_only_failed_tests_artifacts: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_when: Option<TakeWhen>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScreenshotPluginConfig {
    fn automatic(keep_only_failed: bool) -> Self {
        Self {
            enabled: Some(true),
            should_take_automatic_snapshots: Some(true),
            keep_only_failed_tests_artifacts: Some(keep_only_failed),
            take_when: Some(TakeWhen {
                test_start: Some(true),
                test_done: Some(true),
                ..TakeWhen::default()
            }),
            extra: Map::new(),
        }
    }

    fn without_snapshots(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            should_take_automatic_snapshots: Some(false),
            keep_only_failed_tests_artifacts: Some(false),
            take_when: None,
            extra: Map::new(),
        }
    }
}

/// Settings for plugins that are simply on or off (instruments, timeline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TogglePluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TogglePluginConfig {
    fn parse_mode(mode: &str) -> Option<Self> {
        let enabled = match mode {
            "all" => true,
            "none" => false,
            _ => return None,
        };
        Some(Self {
            enabled: Some(enabled),
            extra: Map::new(),
        })
    }
}

/// Device log recorder
pub struct LogPlugin;

impl ArtifactPlugin for LogPlugin {
    const NAME: &'static str = "log";
    const MODES: &'static [&'static str] = &["all", "failing", "none"];
    type Config = RecordingPluginConfig;

    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError> {
        RecordingPluginConfig::parse_mode(mode).ok_or_else(|| Self::unknown_mode(mode))
    }
}

/// Screenshot taker
pub struct ScreenshotPlugin;

impl ArtifactPlugin for ScreenshotPlugin {
    const NAME: &'static str = "screenshot";
    const MODES: &'static [&'static str] = &["all", "failing", "manual", "none"];
    type Config = ScreenshotPluginConfig;

    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError> {
        match mode {
            "all" => Ok(ScreenshotPluginConfig::automatic(false)),
            "failing" => Ok(ScreenshotPluginConfig::automatic(true)),
            "manual" => Ok(ScreenshotPluginConfig::without_snapshots(true)),
            "none" => Ok(ScreenshotPluginConfig::without_snapshots(false)),
            other => Err(Self::unknown_mode(other)),
        }
    }
}

/// Video recorder
pub struct VideoPlugin;

impl ArtifactPlugin for VideoPlugin {
    const NAME: &'static str = "video";
    const MODES: &'static [&'static str] = &["all", "failing", "none"];
    type Config = RecordingPluginConfig;

    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError> {
        RecordingPluginConfig::parse_mode(mode).ok_or_else(|| Self::unknown_mode(mode))
    }
}

/// Performance recorder (`--record-performance`)
pub struct InstrumentsPlugin;

impl ArtifactPlugin for InstrumentsPlugin {
    const NAME: &'static str = "instruments";
    const MODES: &'static [&'static str] = &["all", "none"];
    type Config = TogglePluginConfig;

    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError> {
        TogglePluginConfig::parse_mode(mode).ok_or_else(|| Self::unknown_mode(mode))
    }
}

/// Timeline recorder
pub struct TimelinePlugin;

impl ArtifactPlugin for TimelinePlugin {
    const NAME: &'static str = "timeline";
    const MODES: &'static [&'static str] = &["all", "none"];
    type Config = TogglePluginConfig;

    fn parse_config(mode: &str) -> Result<Self::Config, PluginConfigError> {
        TogglePluginConfig::parse_mode(mode).ok_or_else(|| Self::unknown_mode(mode))
    }
}
