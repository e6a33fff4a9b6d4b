//! Device configuration selection
//!
//! Picks one entry out of `configurations`:
//! 1. The explicitly selected name (call parameter, `--configuration`, or
//!    `selectedConfiguration` in the file)
//! 2. Otherwise the only configuration, if there is exactly one
//!
//! The entry's `device` is then resolved as `--device-name` > `device` >
//! legacy `name`, and `name` is dropped.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{DetoxConfig, DeviceConfig};
use crate::error::{Error, Result};

/// The chosen device configuration and the name it was found under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedDevice {
    pub name: String,
    pub config: DeviceConfig,
}

/// Select and normalize the device configuration for this run.
pub fn compose_device_config(detox_config: &DetoxConfig, cli: &CliArgs) -> Result<SelectedDevice> {
    let configurations = match &detox_config.configurations {
        Some(configurations) if !configurations.is_empty() => configurations,
        _ => return Err(no_configurations(detox_config)),
    };

    let requested = non_empty(detox_config.selected_configuration.as_deref())
        .or_else(|| non_empty(cli.configuration.as_deref()));

    let (name, entry) = match requested {
        None if configurations.len() == 1 => match configurations.iter().next() {
            Some((name, entry)) => (name.as_str(), entry),
            None => return Err(no_configurations(detox_config)),
        },
        None => return Err(cannot_determine(detox_config)),
        Some(name) => match configurations.get(name) {
            Some(entry) => (name, entry),
            None => return Err(cannot_determine(detox_config)),
        },
    };

    let mut entry = match entry {
        Value::Object(map) => map.clone(),
        _ => {
            return Err(Error::config(format!(
                "Configuration '{}' should be an object with at least \"type\" and \"device\" properties",
                name
            )))
        }
    };

    if is_blank(entry.get("type")) {
        return Err(Error::empty_type());
    }

    let legacy_name = entry.remove("name");
    let device = match non_empty(cli.device_name.as_deref()) {
        Some(device_name) => Some(Value::String(device_name.to_string())),
        None => entry
            .remove("device")
            .filter(|device| !is_blank(Some(device)))
            .or(legacy_name),
    };

    match device {
        Some(device) if !is_blank(Some(&device)) => {
            entry.insert("device".to_string(), device);
        }
        _ => return Err(Error::empty_device()),
    }

    let config: DeviceConfig = serde_json::from_value(Value::Object(entry)).map_err(|e| {
        Error::config_with_hint(
            format!("Invalid device configuration '{}': {}", name, e),
            format!("Check detox.configurations[\"{}\"] in your Detox config", name),
        )
    })?;

    info!(
        configuration = name,
        device_type = %config.device_type,
        device = %config.device,
        "Selected device configuration"
    );

    Ok(SelectedDevice {
        name: name.to_string(),
        config,
    })
}

/// Bulleted list of configuration names for hints.
pub fn hint_configurations<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|name| format!("* {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn no_configurations(detox_config: &DetoxConfig) -> Error {
    Error::Runtime {
        message: "There are no device configurations in the given Detox config:".to_string(),
        hint: None,
        debug_info: serde_json::to_string_pretty(detox_config).ok(),
    }
}

fn cannot_determine(detox_config: &DetoxConfig) -> Error {
    Error::Runtime {
        message: "Cannot determine which configuration to use.".to_string(),
        hint: Some(format!(
            "Use --configuration to choose one of the following:\n{}",
            hint_configurations(detox_config.configuration_names())
        )),
        debug_info: None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Missing, null, false or an empty string/object.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
