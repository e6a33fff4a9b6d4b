//! Artifact path building
//!
//! A path builder decides where an artifact file for a given test lands.
//! The default layout is `<rootDir>/<status prefix><test full name>/<artifact>`.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Maximum length (in bytes) of a single path component.
const MAX_COMPONENT_BYTES: usize = 255;

/// Arguments handed to path builder factories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathBuilderOptions {
    pub root_dir: String,
}

/// Outcome of a test as far as artifact naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Running,
    Passed,
    Failed,
}

/// The bits of a test that artifact paths are derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub title: String,
    pub full_name: String,
    pub status: TestStatus,
}

/// Strategy for placing artifact files.
pub trait PathBuilder: fmt::Debug + Send + Sync {
    /// Root directory every artifact is placed under.
    fn root_dir(&self) -> &Path;

    /// Path for an artifact; without a test summary the artifact belongs to
    /// the whole run.
    fn build_path_for_test_artifact(
        &self,
        artifact_name: &str,
        test_summary: Option<&TestSummary>,
    ) -> PathBuf;

    /// Short label used when the composed configuration is printed.
    fn describe(&self) -> String {
        format!("custom({})", self.root_dir().display())
    }
}

/// Default path builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPathBuilder {
    root_dir: PathBuf,
}

impl ArtifactPathBuilder {
    pub fn new(options: PathBuilderOptions) -> Self {
        Self {
            root_dir: PathBuf::from(options.root_dir),
        }
    }

    fn directory_name_for_test(summary: &TestSummary) -> String {
        let prefix = match summary.status {
            TestStatus::Passed => "✓ ",
            TestStatus::Failed => "✗ ",
            TestStatus::Running => "",
        };
        sanitize_file_name(&format!("{}{}", prefix, summary.full_name))
    }
}

impl PathBuilder for ArtifactPathBuilder {
    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn build_path_for_test_artifact(
        &self,
        artifact_name: &str,
        test_summary: Option<&TestSummary>,
    ) -> PathBuf {
        let file_name = sanitize_file_name(artifact_name);
        match test_summary {
            Some(summary) => self
                .root_dir
                .join(Self::directory_name_for_test(summary))
                .join(file_name),
            None => self.root_dir.join(file_name),
        }
    }

    fn describe(&self) -> String {
        format!("ArtifactPathBuilder({})", self.root_dir.display())
    }
}

fn reserved_chars() -> &'static Regex {
    static RESERVED: OnceLock<Regex> = OnceLock::new();
    RESERVED.get_or_init(|| {
        Regex::new(r#"[/\\?<>:*|"\x00-\x1f\x7f]"#).expect("static pattern")
    })
}

/// Make a string safe to use as a single path component.
fn sanitize_file_name(name: &str) -> String {
    let replaced = reserved_chars().replace_all(name, "_");
    let trimmed = replaced.trim_end_matches(['.', ' ']);

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return "_".to_string();
    }

    let mut end = trimmed.len().min(MAX_COMPONENT_BYTES);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
