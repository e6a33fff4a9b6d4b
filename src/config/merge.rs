//! Configuration merge logic
//!
//! Two merge directions are used:
//! - `deep_merge`: the overlay wins (external config + caller override)
//! - `defaults_deep` / `Layer::fill`: the base wins, only absent keys are
//!   filled from lower-precedence layers (CLI > device > top-level > builtin)
//!
//! For both, objects merge recursively by key. `deep_merge` merges arrays
//! element by element and replaces scalars; `defaults_deep` keeps whatever
//! the base already has.

use serde_json::{Map, Value};

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: merge by index; elements past the overlay's length are kept
/// - Scalars: override (second wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (Value::Array(base_items), Value::Array(overlay_items)) => {
            let mut base_items = base_items.into_iter();
            let mut merged: Vec<Value> = overlay_items
                .into_iter()
                .map(|overlay_item| match base_items.next() {
                    Some(base_item) => deep_merge(base_item, overlay_item),
                    None => overlay_item,
                })
                .collect();
            merged.extend(base_items);
            Value::Array(merged)
        }

        (_, overlay) => overlay,
    }
}

/// Merge multiple config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

/// Fill keys missing from `value` with those of `defaults`, recursively.
///
/// `null` counts as missing.
pub fn defaults_deep(value: Value, defaults: Value) -> Value {
    match (value, defaults) {
        (Value::Object(map), Value::Object(default_map)) => {
            Value::Object(fill_map(map, default_map))
        }
        (Value::Null, defaults) => defaults,
        (value, _) => value,
    }
}

fn fill_map(mut map: Map<String, Value>, defaults: Map<String, Value>) -> Map<String, Value> {
    for (key, default_value) in defaults {
        match map.get_mut(&key) {
            Some(slot) => {
                let current = slot.take();
                *slot = defaults_deep(current, default_value);
            }
            None => {
                map.insert(key, default_value);
            }
        }
    }
    map
}

/// A precedence layer of an optional-field record.
///
/// `fill` keeps every field already set on `self` and takes the rest from
/// `lower`, recursing into nested layers.
pub trait Layer: Sized {
    fn fill(self, lower: Self) -> Self;
}

impl<T: Layer> Layer for Option<T> {
    fn fill(self, lower: Self) -> Self {
        match (self, lower) {
            (Some(upper), Some(lower)) => Some(upper.fill(lower)),
            (upper, lower) => upper.or(lower),
        }
    }
}

macro_rules! leaf_layer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Layer for $ty {
                fn fill(self, _lower: Self) -> Self {
                    self
                }
            }
        )*
    };
}

leaf_layer!(bool, String);

impl Layer for Map<String, Value> {
    fn fill(self, lower: Self) -> Self {
        fill_map(self, lower)
    }
}

/// Apply layers from highest to lowest precedence.
pub fn fill_layers<T: Layer>(layers: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    layers.into_iter().fold(None, |acc, layer| acc.fill(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"session": {"server": "ws://localhost:8099"}});
        let overlay = json!({"session": {"server": "ws://localhost:9999"}});
        let result = deep_merge(base, overlay);
        assert_eq!(result["session"]["server"], "ws://localhost:9999");
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "configurations": {
                "ios": {"type": "ios.simulator", "device": "iPhone 11"}
            }
        });
        let overlay = json!({
            "configurations": {
                "ios": {"device": "iPhone X"},
                "android": {"type": "android.emulator", "device": "Pixel"}
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["configurations"]["ios"]["type"], "ios.simulator");
        assert_eq!(result["configurations"]["ios"]["device"], "iPhone X");
        assert_eq!(result["configurations"]["android"]["device"], "Pixel");
    }

    #[test]
    fn test_array_merge_by_index() {
        let base = json!({"launchArgs": ["--a", "--b", "--c"]});
        let overlay = json!({"launchArgs": ["--x"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["launchArgs"], json!(["--x", "--b", "--c"]));
    }

    #[test]
    fn test_array_merge_longer_overlay_and_nested_objects() {
        let base = json!({"apps": [{"name": "a", "binaryPath": "a.app"}]});
        let overlay = json!({"apps": [{"binaryPath": "b.app"}, {"name": "c"}]});
        let result = deep_merge(base, overlay);

        assert_eq!(
            result["apps"],
            json!([{"name": "a", "binaryPath": "b.app"}, {"name": "c"}])
        );
    }

    #[test]
    fn test_null_override() {
        let base = json!({"session": {"sessionId": "abc"}});
        let overlay = json!({"session": null});
        let result = deep_merge(base, overlay);

        assert!(result["session"].is_null());
    }

    #[test]
    fn test_merge_layers_from_nothing() {
        assert!(merge_layers(vec![]).is_null());

        let result = merge_layers(vec![json!({"a": 1}), json!({"b": 2}), json!({"a": 3})]);
        assert_eq!(result, json!({"a": 3, "b": 2}));
    }

    #[test]
    fn test_defaults_deep_keeps_existing_values() {
        let value = json!({"init": {"launchApp": false}});
        let defaults = json!({
            "init": {"launchApp": true, "reinstallApp": true},
            "cleanup": {"shutdownDevice": false}
        });
        let result = defaults_deep(value, defaults);

        assert_eq!(result["init"]["launchApp"], false);
        assert_eq!(result["init"]["reinstallApp"], true);
        assert_eq!(result["cleanup"]["shutdownDevice"], false);
    }

    #[test]
    fn test_defaults_deep_does_not_descend_into_scalars() {
        let result = defaults_deep(json!({"screenshot": "manual"}), json!({"screenshot": {"enabled": true}}));
        assert_eq!(result["screenshot"], "manual");
    }

    #[test]
    fn test_defaults_deep_treats_null_as_missing() {
        let result = defaults_deep(json!({"pathBuilder": null}), json!({"pathBuilder": "./builder"}));
        assert_eq!(result["pathBuilder"], "./builder");
    }

    #[test]
    fn test_option_layer() {
        assert_eq!(Some(false).fill(Some(true)), Some(false));
        assert_eq!(None.fill(Some(true)), Some(true));
        assert_eq!(Some(true).fill(None), Some(true));
        assert_eq!(None::<bool>.fill(None), None);
    }

    #[test]
    fn test_fill_layers_order() {
        let result = fill_layers([None, Some("cli".to_string()), Some("device".to_string())]);
        assert_eq!(result.as_deref(), Some("cli"));

        let result = fill_layers::<String>([None, None]);
        assert!(result.is_none());
    }
}
