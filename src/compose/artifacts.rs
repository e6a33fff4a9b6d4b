//! Artifacts configuration composition
//!
//! Layers, highest first: CLI flags, device-level `artifacts`, top-level
//! `artifacts`, built-in defaults. Plugin shorthands are expanded inside
//! each layer before the layers are merged, so a shorthand given on the
//! command line fully replaces the plugin settings of lower layers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use detox_artifacts::{
    build_default_artifacts_root_dirpath, ArtifactPathBuilder, ArtifactPlugin, InstrumentsPlugin,
    LogPlugin, PathBuilder, PathBuilderOptions, RecordingPluginConfig, ScreenshotPlugin,
    ScreenshotPluginConfig, TakeWhen, TimelinePlugin, TogglePluginConfig, VideoPlugin,
    DEFAULT_ROOT_DIR,
};

use crate::cli::CliArgs;
use crate::config::{
    fill_layers, ArtifactsSection, BuiltinDefaults, DetoxConfig, DeviceConfig, Layer,
    PluginSetting, PluginsSection,
};
use crate::error::{Error, Result};

/// Builds a path builder for a given artifacts root.
pub type PathBuilderFactory =
    Arc<dyn Fn(&PathBuilderOptions) -> Result<Arc<dyn PathBuilder>> + Send + Sync>;

/// What a path builder module provides.
#[derive(Clone)]
pub enum PathBuilderExport {
    /// Called with `{ rootDir }` to build the path builder
    Factory(PathBuilderFactory),
    /// A ready-made path builder, used as-is
    Instance(Arc<dyn PathBuilder>),
}

impl fmt::Debug for PathBuilderExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Instance(instance) => f.debug_tuple("Instance").field(instance).finish(),
        }
    }
}

/// Resolves the `artifacts.pathBuilder` module path of a config file.
pub trait ModuleResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, request: &str) -> Result<PathBuilderExport>;
}

/// Module resolver backed by path builders registered by the caller.
#[derive(Debug, Clone, Default)]
pub struct PathBuilderRegistry {
    exports: BTreeMap<String, PathBuilderExport>,
}

impl PathBuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under the module path used in config files.
    pub fn register_factory<F>(&mut self, request: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&PathBuilderOptions) -> Result<Arc<dyn PathBuilder>> + Send + Sync + 'static,
    {
        self.exports
            .insert(request.into(), PathBuilderExport::Factory(Arc::new(factory)));
        self
    }

    /// Register a ready-made path builder.
    pub fn register_instance(
        &mut self,
        request: impl Into<String>,
        instance: Arc<dyn PathBuilder>,
    ) -> &mut Self {
        self.exports
            .insert(request.into(), PathBuilderExport::Instance(instance));
        self
    }
}

impl ModuleResolver for PathBuilderRegistry {
    fn resolve(&self, request: &str) -> Result<PathBuilderExport> {
        self.exports.get(request).cloned().ok_or_else(|| {
            let known = if self.exports.is_empty() {
                "none".to_string()
            } else {
                self.exports.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            Error::config_with_hint(
                format!("Cannot resolve artifacts path builder module '{}'", request),
                format!(
                    "Register the path builder before composing the config (registered: {})",
                    known
                ),
            )
        })
    }
}

/// Composed plugin settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactPlugins {
    pub log: RecordingPluginConfig,
    pub screenshot: ScreenshotPluginConfig,
    pub video: RecordingPluginConfig,
    pub instruments: TogglePluginConfig,
    pub timeline: TogglePluginConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Composed artifacts section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactsConfig {
    pub root_dir: String,
    #[serde(serialize_with = "serialize_path_builder")]
    pub path_builder: Arc<dyn PathBuilder>,
    pub plugins: ArtifactPlugins,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn serialize_path_builder<S: Serializer>(
    path_builder: &Arc<dyn PathBuilder>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&path_builder.describe())
}

/// Plugin settings after shorthand expansion.
#[derive(Debug, Clone, Default, PartialEq)]
struct PluginsLayer {
    log: Option<RecordingPluginConfig>,
    screenshot: Option<ScreenshotPluginConfig>,
    video: Option<RecordingPluginConfig>,
    instruments: Option<TogglePluginConfig>,
    timeline: Option<TogglePluginConfig>,
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ArtifactsLayer {
    root_dir: Option<String>,
    path_builder: Option<String>,
    plugins: Option<PluginsLayer>,
    extra: Map<String, Value>,
}

fn expand_plugin<P: ArtifactPlugin>(
    setting: Option<PluginSetting<P::Config>>,
) -> Result<Option<P::Config>> {
    match setting {
        None => Ok(None),
        Some(PluginSetting::Mode(mode)) => Ok(Some(P::parse_config(&mode)?)),
        Some(PluginSetting::Config(config)) => Ok(Some(config)),
    }
}

impl PluginsLayer {
    fn expand(section: PluginsSection) -> Result<Self> {
        Ok(Self {
            log: expand_plugin::<LogPlugin>(section.log)?,
            screenshot: expand_plugin::<ScreenshotPlugin>(section.screenshot)?,
            video: expand_plugin::<VideoPlugin>(section.video)?,
            instruments: expand_plugin::<InstrumentsPlugin>(section.instruments)?,
            timeline: expand_plugin::<TimelinePlugin>(section.timeline)?,
            extra: section.extra,
        })
    }
}

impl ArtifactsLayer {
    fn expand(section: ArtifactsSection) -> Result<Self> {
        Ok(Self {
            root_dir: section.root_dir,
            path_builder: section.path_builder,
            plugins: section.plugins.map(PluginsLayer::expand).transpose()?,
            extra: section.extra,
        })
    }
}

impl Layer for RecordingPluginConfig {
    fn fill(self, lower: Self) -> Self {
        Self {
            enabled: self.enabled.fill(lower.enabled),
            keep_only_failed_tests_artifacts: self
                .keep_only_failed_tests_artifacts
                .fill(lower.keep_only_failed_tests_artifacts),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for TakeWhen {
    fn fill(self, lower: Self) -> Self {
        Self {
            test_start: self.test_start.fill(lower.test_start),
            test_done: self.test_done.fill(lower.test_done),
            app_not_ready: self.app_not_ready.fill(lower.app_not_ready),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for ScreenshotPluginConfig {
    fn fill(self, lower: Self) -> Self {
        Self {
            enabled: self.enabled.fill(lower.enabled),
            should_take_automatic_snapshots: self
                .should_take_automatic_snapshots
                .fill(lower.should_take_automatic_snapshots),
            keep_only_failed_tests_artifacts: self
                .keep_only_failed_tests_artifacts
                .fill(lower.keep_only_failed_tests_artifacts),
            take_when: self.take_when.fill(lower.take_when),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for TogglePluginConfig {
    fn fill(self, lower: Self) -> Self {
        Self {
            enabled: self.enabled.fill(lower.enabled),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for PluginsLayer {
    fn fill(self, lower: Self) -> Self {
        Self {
            log: self.log.fill(lower.log),
            screenshot: self.screenshot.fill(lower.screenshot),
            video: self.video.fill(lower.video),
            instruments: self.instruments.fill(lower.instruments),
            timeline: self.timeline.fill(lower.timeline),
            extra: self.extra.fill(lower.extra),
        }
    }
}

impl Layer for ArtifactsLayer {
    fn fill(self, lower: Self) -> Self {
        Self {
            root_dir: self.root_dir.fill(lower.root_dir),
            path_builder: self.path_builder.fill(lower.path_builder),
            plugins: self.plugins.fill(lower.plugins),
            extra: self.extra.fill(lower.extra),
        }
    }
}

fn cli_mode<T>(flag: &Option<String>) -> Option<PluginSetting<T>> {
    flag.clone().map(PluginSetting::Mode)
}

fn cli_section(cli: &CliArgs) -> ArtifactsSection {
    ArtifactsSection {
        root_dir: cli.artifacts_location.clone(),
        path_builder: None,
        plugins: Some(PluginsSection {
            log: cli_mode(&cli.record_logs),
            screenshot: cli_mode(&cli.take_screenshots),
            video: cli_mode(&cli.record_videos),
            instruments: cli_mode(&cli.record_performance),
            timeline: cli_mode(&cli.record_timeline),
            extra: Map::new(),
        }),
        extra: Map::new(),
    }
}

/// Turn the configured path builder (if any) into an instance.
pub fn resolve_artifacts_path_builder(
    root_dir: &str,
    path_builder: Option<&str>,
    resolver: &dyn ModuleResolver,
) -> Result<Arc<dyn PathBuilder>> {
    let options = PathBuilderOptions {
        root_dir: root_dir.to_string(),
    };

    match path_builder.filter(|request| !request.is_empty()) {
        Some(request) => {
            debug!(module = request, "Resolving custom artifacts path builder");
            match resolver.resolve(request)? {
                PathBuilderExport::Factory(factory) => factory(&options),
                PathBuilderExport::Instance(instance) => Ok(instance),
            }
        }
        None => Ok(Arc::new(ArtifactPathBuilder::new(options))),
    }
}

/// Compose the artifacts section for the selected configuration.
pub fn compose_artifacts_config(
    configuration_name: &str,
    device_config: &DeviceConfig,
    detox_config: &DetoxConfig,
    cli: &CliArgs,
    start_time: DateTime<Utc>,
    resolver: &dyn ModuleResolver,
) -> Result<ArtifactsConfig> {
    let sections = [
        Some(cli_section(cli)),
        device_config.artifacts.clone(),
        detox_config.artifacts.clone(),
        Some(BuiltinDefaults::default().artifacts()),
    ];

    let layers = sections
        .into_iter()
        .map(|section| section.map(ArtifactsLayer::expand).transpose())
        .collect::<Result<Vec<_>>>()?;

    let merged = fill_layers(layers).unwrap_or_default();
    let plugins = merged.plugins.unwrap_or_default();

    let root_dir = build_default_artifacts_root_dirpath(
        configuration_name,
        merged.root_dir.as_deref().unwrap_or(DEFAULT_ROOT_DIR),
        start_time,
    );
    let path_builder =
        resolve_artifacts_path_builder(&root_dir, merged.path_builder.as_deref(), resolver)?;

    debug!(root_dir = %root_dir, path_builder = %path_builder.describe(), "Composed artifacts config");

    Ok(ArtifactsConfig {
        root_dir,
        path_builder,
        plugins: ArtifactPlugins {
            log: plugins.log.unwrap_or_default(),
            screenshot: plugins.screenshot.unwrap_or_default(),
            video: plugins.video.unwrap_or_default(),
            instruments: plugins.instruments.unwrap_or_default(),
            timeline: plugins.timeline.unwrap_or_default(),
            extra: plugins.extra,
        },
        extra: merged.extra,
    })
}
