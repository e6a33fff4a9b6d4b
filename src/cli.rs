//! Command-line overrides
//!
//! `CliArgs` is the explicit argument bag handed to the composer. It is a
//! clap `Args` group so the binary can flatten it into its subcommands, and
//! each flag can also come from a `DETOX_*` environment variable.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Command-line names of every flag in [`CliArgs`].
pub const FLAG_NAMES: &[&str] = &[
    "config-path",
    "configuration",
    "device-name",
    "reuse",
    "cleanup",
    "artifacts-location",
    "record-logs",
    "take-screenshots",
    "record-videos",
    "record-performance",
    "record-timeline",
];

/// Flags that influence configuration composition.
///
/// Every field is optional: an absent flag means "not provided" and lets
/// lower-precedence layers apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliArgs {
    /// Detox config file path. Without it, .detoxrc[.json|.toml] or the
    /// "detox" section of package.json is searched for
    #[arg(short = 'C', long, env = "DETOX_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Device configuration to use; may be omitted when only one is defined
    #[arg(short = 'c', long, env = "DETOX_CONFIGURATION")]
    pub configuration: Option<String>,

    /// Override the device query of the selected configuration
    #[arg(short = 'n', long, env = "DETOX_DEVICE_NAME")]
    pub device_name: Option<String>,

    /// Reuse the installed app instead of reinstalling it
    #[arg(long, env = "DETOX_REUSE")]
    pub reuse: bool,

    /// Shut the device down when the run ends
    #[arg(long, env = "DETOX_CLEANUP")]
    pub cleanup: bool,

    /// Artifacts root directory
    #[arg(short = 'a', long, env = "DETOX_ARTIFACTS_LOCATION")]
    pub artifacts_location: Option<String>,

    /// Device log recording mode: all, failing, none
    #[arg(long, env = "DETOX_RECORD_LOGS")]
    pub record_logs: Option<String>,

    /// Screenshot mode: all, failing, manual, none
    #[arg(long, env = "DETOX_TAKE_SCREENSHOTS")]
    pub take_screenshots: Option<String>,

    /// Video recording mode: all, failing, none
    #[arg(long, env = "DETOX_RECORD_VIDEOS")]
    pub record_videos: Option<String>,

    /// Performance recording mode: all, none
    #[arg(long, env = "DETOX_RECORD_PERFORMANCE")]
    pub record_performance: Option<String>,

    /// Timeline recording mode: all, none
    #[arg(long, env = "DETOX_RECORD_TIMELINE")]
    pub record_timeline: Option<String>,
}

impl CliArgs {
    /// Flags that were given, as `(name, value)` pairs.
    pub fn provided(&self) -> Vec<(&'static str, String)> {
        FLAG_NAMES
            .iter()
            .filter_map(|name| self.get_arg_value(name).map(|value| (*name, value)))
            .collect()
    }

    /// Look a flag up by its command-line name (e.g. `"device-name"`).
    ///
    /// Boolean flags yield `Some("true")` when set and `None` otherwise.
    pub fn get_arg_value(&self, name: &str) -> Option<String> {
        let flag = |set: bool| set.then(|| "true".to_string());
        match name {
            "config-path" => self
                .config_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            "configuration" => self.configuration.clone(),
            "device-name" => self.device_name.clone(),
            "reuse" => flag(self.reuse),
            "cleanup" => flag(self.cleanup),
            "artifacts-location" => self.artifacts_location.clone(),
            "record-logs" => self.record_logs.clone(),
            "take-screenshots" => self.take_screenshots.clone(),
            "record-videos" => self.record_videos.clone(),
            "record-performance" => self.record_performance.clone(),
            "record-timeline" => self.record_timeline.clone(),
            _ => None,
        }
    }
}
