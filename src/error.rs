//! Error types for configuration composition
//!
//! Two families matter to users: configuration errors (something in the
//! config file needs fixing) and runtime errors (the input is valid but
//! composition cannot proceed, e.g. an ambiguous configuration choice).
//! Both may carry a hint telling the user what to do next.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use detox_artifacts::PluginConfigError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for configuration composition
#[derive(Error, Debug)]
pub enum Error {
    /// Authoring mistake in the Detox config
    #[error("{message}")]
    Config {
        message: String,
        hint: Option<String>,
    },

    /// Valid input that still does not allow composition to continue
    #[error("{message}")]
    Runtime {
        message: String,
        hint: Option<String>,
        debug_info: Option<String>,
    },

    #[error("Failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file '{}': {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to allocate a free port for the session server: {0}")]
    PortAllocation(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a configuration error without a hint
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a runtime error without extra context
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            hint: None,
            debug_info: None,
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: &Path, source: io::Error) -> Self {
        Self::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a parse error for `path`
    pub fn config_parse(path: &Path, message: impl ToString) -> Self {
        Self::ConfigParse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn empty_device() -> Self {
        Self::config(
            "'device' property is empty, should hold the device query to run on \
             (e.g. { \"type\": \"iPhone 11 Pro\" }, { \"avdName\": \"Nexus_5X_API_29\" })",
        )
    }

    pub fn empty_type() -> Self {
        Self::config(
            "'type' property is missing, should hold the device type to test on \
             (e.g. \"ios.simulator\" or \"android.emulator\")",
        )
    }

    pub fn empty_binary_path() -> Self {
        Self::config("'binaryPath' property is missing, should hold the app binary path")
    }

    /// Corrective hint, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } | Self::Runtime { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Extra diagnostic dump, if any
    pub fn debug_info(&self) -> Option<&str> {
        match self {
            Self::Runtime { debug_info, .. } => debug_info.as_deref(),
            _ => None,
        }
    }

    /// Whether the user can fix this by editing their config
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::ConfigParse { .. })
    }

    /// Multi-line report: message, hint and debug info
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        if let Some(hint) = self.hint() {
            out.push_str("\n\nHINT: ");
            out.push_str(hint);
        }
        if let Some(debug_info) = self.debug_info() {
            out.push_str("\n\n");
            out.push_str(debug_info);
        }
        out
    }
}

impl From<PluginConfigError> for Error {
    fn from(e: PluginConfigError) -> Self {
        match &e {
            PluginConfigError::UnknownMode { plugin, .. } => Self::config_with_hint(
                e.to_string(),
                format!(
                    "Check the \"artifacts.plugins.{}\" section of your Detox config \
                     and the matching command-line flag",
                    plugin
                ),
            ),
        }
    }
}
