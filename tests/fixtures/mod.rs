//! Test fixtures: throwaway project directories with Detox config files.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use detox_config::ComposeOptions;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        let contents = serde_json::to_string_pretty(value).expect("Failed to serialize fixture");
        self.write(relative, &contents)
    }

    /// Compose options rooted at this project, with a fixed start time.
    pub fn options(&self) -> ComposeOptions {
        ComposeOptions {
            cwd: Some(self.root().to_path_buf()),
            start_time: start_time(),
            ..ComposeOptions::default()
        }
    }
}

/// 2024-03-01 09:30:05 UTC
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap()
}
