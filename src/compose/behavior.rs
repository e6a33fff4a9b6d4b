//! Behavior configuration composition
//!
//! Precedence, highest first: CLI flags, caller user params, device-level
//! `behavior`, top-level `behavior`, built-in defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cli::CliArgs;
use crate::config::{
    fill_layers, BehaviorLayer, BuiltinDefaults, CleanupLayer, DetoxConfig, DeviceConfig,
    InitLayer, Layer,
};

/// Parameters a test-runner integration passes programmatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
    /// Expose Detox globals
    #[serde(default)]
    pub init_globals: Option<bool>,

    #[serde(default)]
    pub launch_app: Option<bool>,

    /// Keep the installed app (inverse of `reinstallApp`)
    #[serde(default)]
    pub reuse: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitBehavior {
    pub expose_globals: bool,
    pub reinstall_app: bool,
    pub launch_app: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupBehavior {
    pub shutdown_device: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Composed behavior section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorConfig {
    pub init: InitBehavior,
    pub cleanup: CleanupBehavior,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Layer for InitLayer {
    fn fill(self, lower: Self) -> Self {
        Self {
            expose_globals: self.expose_globals.fill(lower.expose_globals),
            reinstall_app: self.reinstall_app.fill(lower.reinstall_app),
            launch_app: self.launch_app.fill(lower.launch_app),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for CleanupLayer {
    fn fill(self, lower: Self) -> Self {
        Self {
            shutdown_device: self.shutdown_device.fill(lower.shutdown_device),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for BehaviorLayer {
    fn fill(self, lower: Self) -> Self {
        Self {
            init: self.init.fill(lower.init),
            cleanup: self.cleanup.fill(lower.cleanup),
            extra: self.extra.fill(lower.extra),
        }
    }
}

fn cli_layer(cli: &CliArgs) -> BehaviorLayer {
    BehaviorLayer {
        init: Some(InitLayer {
            reinstall_app: cli.reuse.then_some(false),
            ..InitLayer::default()
        }),
        cleanup: Some(CleanupLayer {
            shutdown_device: cli.cleanup.then_some(true),
            ..CleanupLayer::default()
        }),
        extra: Map::new(),
    }
}

fn user_params_layer(params: &UserParams) -> BehaviorLayer {
    BehaviorLayer {
        init: Some(InitLayer {
            expose_globals: params.init_globals,
            launch_app: params.launch_app,
            reinstall_app: params.reuse.map(|reuse| !reuse),
            extra: Map::new(),
        }),
        ..BehaviorLayer::default()
    }
}

/// Compose the behavior section for the selected device.
pub fn compose_behavior_config(
    detox_config: &DetoxConfig,
    device_config: &DeviceConfig,
    user_params: Option<&UserParams>,
    cli: &CliArgs,
) -> BehaviorConfig {
    let defaults = BuiltinDefaults::default();

    let merged = fill_layers([
        Some(cli_layer(cli)),
        user_params.map(user_params_layer),
        device_config.behavior.clone(),
        detox_config.behavior.clone(),
        Some(defaults.behavior()),
    ])
    .unwrap_or_default();

    let init = merged.init.unwrap_or_default();
    let cleanup = merged.cleanup.unwrap_or_default();

    BehaviorConfig {
        init: InitBehavior {
            expose_globals: init.expose_globals.unwrap_or(defaults.expose_globals),
            reinstall_app: init.reinstall_app.unwrap_or(defaults.reinstall_app),
            launch_app: init.launch_app.unwrap_or(defaults.launch_app),
            extra: init.extra,
        },
        cleanup: CleanupBehavior {
            shutdown_device: cleanup.shutdown_device.unwrap_or(defaults.shutdown_device),
            extra: cleanup.extra,
        },
        extra: merged.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device(behavior: Value) -> DeviceConfig {
        serde_json::from_value(json!({
            "type": "ios.simulator",
            "device": "iPhone X",
            "behavior": behavior
        }))
        .unwrap()
    }

    fn plain_device() -> DeviceConfig {
        serde_json::from_value(json!({"type": "ios.simulator", "device": "iPhone X"})).unwrap()
    }

    #[test]
    fn test_defaults_only() {
        let behavior = compose_behavior_config(
            &DetoxConfig::default(),
            &plain_device(),
            None,
            &CliArgs::default(),
        );

        assert!(behavior.init.expose_globals);
        assert!(behavior.init.reinstall_app);
        assert!(behavior.init.launch_app);
        assert!(!behavior.cleanup.shutdown_device);
    }

    #[test]
    fn test_top_level_launch_app_false() {
        let detox_config =
            DetoxConfig::from_value(json!({"behavior": {"init": {"launchApp": false}}})).unwrap();
        let behavior =
            compose_behavior_config(&detox_config, &plain_device(), None, &CliArgs::default());

        assert!(!behavior.init.launch_app);
        assert!(behavior.init.reinstall_app);
        assert!(!behavior.cleanup.shutdown_device);
    }

    #[test]
    fn test_device_behavior_beats_top_level() {
        let detox_config = DetoxConfig::from_value(json!({
            "behavior": {"init": {"exposeGlobals": true, "launchApp": false}}
        }))
        .unwrap();
        let device = device(json!({"init": {"exposeGlobals": false}}));

        let behavior = compose_behavior_config(&detox_config, &device, None, &CliArgs::default());
        assert!(!behavior.init.expose_globals);
        assert!(!behavior.init.launch_app);
    }

    #[test]
    fn test_user_params_beat_device_behavior() {
        let device = device(json!({"init": {"reinstallApp": true, "launchApp": false}}));
        let params = UserParams {
            init_globals: Some(false),
            launch_app: Some(true),
            reuse: Some(true),
        };

        let behavior = compose_behavior_config(
            &DetoxConfig::default(),
            &device,
            Some(&params),
            &CliArgs::default(),
        );
        assert!(!behavior.init.expose_globals);
        assert!(behavior.init.launch_app);
        assert!(!behavior.init.reinstall_app);
    }

    #[test]
    fn test_unset_reuse_user_param_leaves_lower_layers() {
        let device = device(json!({"init": {"reinstallApp": false}}));
        let params = UserParams::default();

        let behavior = compose_behavior_config(
            &DetoxConfig::default(),
            &device,
            Some(&params),
            &CliArgs::default(),
        );
        assert!(!behavior.init.reinstall_app);
    }

    #[test]
    fn test_cli_reuse_beats_everything() {
        let detox_config =
            DetoxConfig::from_value(json!({"behavior": {"init": {"reinstallApp": true}}})).unwrap();
        let device = device(json!({"init": {"reinstallApp": true}}));
        let params = UserParams {
            reuse: Some(false),
            ..UserParams::default()
        };
        let cli = CliArgs {
            reuse: true,
            ..CliArgs::default()
        };

        let behavior = compose_behavior_config(&detox_config, &device, Some(&params), &cli);
        assert!(!behavior.init.reinstall_app);
    }

    #[test]
    fn test_cli_cleanup_forces_shutdown() {
        let device = device(json!({"cleanup": {"shutdownDevice": false}}));
        let cli = CliArgs {
            cleanup: true,
            ..CliArgs::default()
        };

        let behavior = compose_behavior_config(&DetoxConfig::default(), &device, None, &cli);
        assert!(behavior.cleanup.shutdown_device);
    }

    #[test]
    fn test_unknown_keys_are_carried() {
        let device = device(json!({"init": {"keepLockFile": true}}));
        let behavior =
            compose_behavior_config(&DetoxConfig::default(), &device, None, &CliArgs::default());

        let value = serde_json::to_value(&behavior).unwrap();
        assert_eq!(value["init"]["keepLockFile"], true);
        assert_eq!(value["init"]["reinstallApp"], true);
    }
}
