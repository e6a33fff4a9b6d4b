//! Artifact-side building blocks for Detox configuration.
//!
//! This crate knows how each artifact plugin expands its shorthand mode
//! (`"all"`, `"failing"`, ...) into a full settings object, how the per-run
//! artifacts root directory is named, and how the default path builder lays
//! out artifact files below that root.

mod path_builder;
mod plugins;
mod root_dir;

pub use path_builder::{
    ArtifactPathBuilder, PathBuilder, PathBuilderOptions, TestStatus, TestSummary,
};
pub use plugins::{
    ArtifactPlugin, InstrumentsPlugin, LogPlugin, PluginConfigError, RecordingPluginConfig,
    ScreenshotPlugin, ScreenshotPluginConfig, TakeWhen, TimelinePlugin, TogglePluginConfig,
    VideoPlugin,
};
pub use root_dir::{build_default_artifacts_root_dirpath, timestamp_string};

/// Default artifacts root directory (relative to the working directory).
pub const DEFAULT_ROOT_DIR: &str = "artifacts";
