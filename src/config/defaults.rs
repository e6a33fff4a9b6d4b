//! Built-in defaults (lowest precedence layer)
//!
//! Hardcoded values used when neither the CLI, the device configuration nor
//! the top-level Detox config set a field.

use serde_json::Map;

use detox_artifacts::DEFAULT_ROOT_DIR;

use super::types::{
    ArtifactsSection, BehaviorLayer, CleanupLayer, InitLayer, PluginSetting, PluginsSection,
};

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Expose Detox globals (`device`, `element`, ...) (default: true)
    pub expose_globals: bool,

    /// Reinstall the app before the run (default: true)
    pub reinstall_app: bool,

    /// Launch the app once the device is ready (default: true)
    pub launch_app: bool,

    /// Shut the device down after the run (default: false)
    pub shutdown_device: bool,

    /// Artifacts root directory (default: "artifacts")
    pub artifacts_root_dir: String,

    /// Device log mode (default: "none")
    pub log_mode: String,

    /// Screenshot mode (default: "manual")
    pub screenshot_mode: String,

    /// Video mode (default: "none")
    pub video_mode: String,

    /// Performance recording mode (default: "none")
    pub instruments_mode: String,

    /// Timeline mode (default: "none")
    pub timeline_mode: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            expose_globals: true,
            reinstall_app: true,
            launch_app: true,
            shutdown_device: false,
            artifacts_root_dir: DEFAULT_ROOT_DIR.to_string(),
            log_mode: "none".to_string(),
            screenshot_mode: "manual".to_string(),
            video_mode: "none".to_string(),
            instruments_mode: "none".to_string(),
            timeline_mode: "none".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Behavior layer with every field set
    pub fn behavior(&self) -> BehaviorLayer {
        BehaviorLayer {
            init: Some(InitLayer {
                expose_globals: Some(self.expose_globals),
                reinstall_app: Some(self.reinstall_app),
                launch_app: Some(self.launch_app),
                extra: Map::new(),
            }),
            cleanup: Some(CleanupLayer {
                shutdown_device: Some(self.shutdown_device),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// Artifacts section with every plugin in its disabled mode and no
    /// custom path builder
    pub fn artifacts(&self) -> ArtifactsSection {
        ArtifactsSection {
            root_dir: Some(self.artifacts_root_dir.clone()),
            path_builder: None,
            plugins: Some(PluginsSection {
                log: Some(PluginSetting::Mode(self.log_mode.clone())),
                screenshot: Some(PluginSetting::Mode(self.screenshot_mode.clone())),
                video: Some(PluginSetting::Mode(self.video_mode.clone())),
                instruments: Some(PluginSetting::Mode(self.instruments_mode.clone())),
                timeline: Some(PluginSetting::Mode(self.timeline_mode.clone())),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert!(defaults.expose_globals);
        assert!(defaults.reinstall_app);
        assert!(defaults.launch_app);
        assert!(!defaults.shutdown_device);
        assert_eq!(defaults.artifacts_root_dir, "artifacts");
        assert_eq!(defaults.screenshot_mode, "manual");
    }

    #[test]
    fn test_behavior_layer_is_complete() {
        let behavior = BuiltinDefaults::default().behavior();
        let init = behavior.init.unwrap();
        assert_eq!(init.expose_globals, Some(true));
        assert_eq!(init.reinstall_app, Some(true));
        assert_eq!(init.launch_app, Some(true));
        assert_eq!(behavior.cleanup.unwrap().shutdown_device, Some(false));
    }

    #[test]
    fn test_artifacts_section_uses_shorthands() {
        let artifacts = BuiltinDefaults::default().artifacts();
        assert_eq!(artifacts.root_dir.as_deref(), Some("artifacts"));
        assert!(artifacts.path_builder.is_none());

        let plugins = artifacts.plugins.unwrap();
        assert_eq!(plugins.screenshot, Some(PluginSetting::Mode("manual".to_string())));
        assert_eq!(plugins.timeline, Some(PluginSetting::Mode("none".to_string())));
    }
}
