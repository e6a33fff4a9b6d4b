//! External Detox config discovery and loading
//!
//! With an explicit path the file is loaded as-is. Otherwise every directory
//! from the working directory up to the home directory (or the file-system
//! root, when the working directory is outside home) is searched for the
//! well-known file names in `SEARCH_PLACES`; the first hit wins.

use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// File names searched in each directory, in order.
pub const SEARCH_PLACES: &[&str] = &[
    "package.json",
    ".detoxrc",
    ".detoxrc.json",
    ".detoxrc.yaml",
    ".detoxrc.yml",
    ".detoxrc.toml",
    ".detoxrc.js",
];

/// Key holding the Detox config inside package.json
pub const PACKAGE_JSON_KEY: &str = "detox";

/// A config document together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Value,
    pub filepath: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    PackageJson,
    Json,
    /// YAML, which also covers JSON; used for the extension-less `.detoxrc`
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn of(path: &Path) -> Result<Self> {
        if path.file_name().is_some_and(|name| name == "package.json") {
            return Ok(Self::PackageJson);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("js") | Some("cjs") | Some("mjs") => Err(Error::config_with_hint(
                format!(
                    "Cannot load '{}': JavaScript config files are not supported",
                    path.display()
                ),
                "Move the exported object to .detoxrc.json (or .detoxrc.toml)",
            )),
            Some(_) => Ok(Self::Json),
            None => Ok(Self::Yaml),
        }
    }
}

/// Load the Detox config from `config_path`, or search for one from `cwd`.
///
/// Returns `Ok(None)` when no explicit path was given and nothing was found.
/// A relative `config_path` is resolved against `cwd`.
pub async fn load_external_config(
    config_path: Option<&Path>,
    cwd: &Path,
) -> Result<Option<LoadedConfig>> {
    match config_path {
        Some(path) => {
            let path = cwd.join(path);
            let config = load_file(&path).await?;
            if config.is_none() {
                warn!(path = %path.display(), "package.json has no \"detox\" section");
            }
            Ok(config.map(|config| LoadedConfig {
                config,
                filepath: path,
            }))
        }
        None => search(cwd, dirs::home_dir().as_deref()).await,
    }
}

/// Search `cwd` and its ancestors, stopping after `stop_dir` when it is one
/// of them.
async fn search(cwd: &Path, stop_dir: Option<&Path>) -> Result<Option<LoadedConfig>> {
    debug!(cwd = %cwd.display(), stop_dir = ?stop_dir, "Searching for Detox config");

    for dir in cwd.ancestors() {
        for place in SEARCH_PLACES {
            let candidate = dir.join(place);
            if !is_file(&candidate).await? {
                continue;
            }

            match load_file(&candidate).await? {
                Some(config) => {
                    info!(path = %candidate.display(), "Found Detox config");
                    return Ok(Some(LoadedConfig {
                        config,
                        filepath: candidate,
                    }));
                }
                None => debug!(path = %candidate.display(), "Skipping package.json without \"detox\" section"),
            }
        }

        if stop_dir == Some(dir) {
            break;
        }
    }

    Ok(None)
}

/// Whether a search candidate exists as a regular file. Only a missing entry
/// or a directory means "not here"; other failures are reported.
async fn is_file(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::file_read(path, e)),
    }
}

/// Load one config file. `None` means a package.json without a Detox section.
async fn load_file(path: &Path) -> Result<Option<Value>> {
    let format = ConfigFormat::of(path)?;
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::file_read(path, e))?;

    match format {
        ConfigFormat::PackageJson => {
            let mut package = parse_json(path, &contents)?;
            Ok(package
                .get_mut(PACKAGE_JSON_KEY)
                .map(Value::take)
                .filter(|section| !section.is_null()))
        }
        ConfigFormat::Json => parse_json(path, &contents).map(Some),
        ConfigFormat::Yaml => parse_yaml(path, &contents).map(Some),
        ConfigFormat::Toml => parse_toml(path, &contents).map(Some),
    }
}

fn parse_json(path: &Path, contents: &str) -> Result<Value> {
    serde_json::from_str(contents)
        .map_err(|e| Error::config_parse(path, format!("JSON parse error: {}", e)))
}

fn parse_yaml(path: &Path, contents: &str) -> Result<Value> {
    serde_yaml::from_str(contents)
        .map_err(|e| Error::config_parse(path, format!("YAML parse error: {}", e)))
}

fn parse_toml(path: &Path, contents: &str) -> Result<Value> {
    let value: toml::Value = toml::from_str(contents)
        .map_err(|e| Error::config_parse(path, format!("TOML parse error: {}", e)))?;
    Ok(toml_to_json(value))
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
