//! Error types for goscript
//!
//! All modules use `GoscriptResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for goscript operations
pub type GoscriptResult<T> = Result<T, GoscriptError>;

/// All errors that can occur in goscript
#[derive(Error, Debug)]
pub enum GoscriptError {
    // Store errors
    #[error("failed to check cached binary {path}: {source}")]
    Lookup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to prepare build workspace: {context}: {source}")]
    Workspace {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to publish binary {from} -> {to}: {source}")]
    Publish {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Toolchain errors
    #[error("dependency resolution failed:\n{diagnostics}")]
    DependencyResolution { diagnostics: String },

    /// Display is the compiler output, unmodified
    #[error("{diagnostics}")]
    Compile { diagnostics: String },

    #[error("toolchain not found: {program}: {source}")]
    ToolchainNotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {secs}s")]
    ToolchainTimeout { command: String, secs: u64 },

    #[error("goimports: {diagnostics}")]
    Imports { diagnostics: String },

    // Execution errors
    #[error("failed to execute {path}: {source}")]
    Exec {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl GoscriptError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a workspace IO error with context
    pub fn workspace(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Workspace {
            context: context.into(),
            source,
        }
    }

    /// Whether the error comes from the user's script rather than goscript itself
    pub fn is_script_error(&self) -> bool {
        matches!(
            self,
            Self::Compile { .. } | Self::DependencyResolution { .. } | Self::Imports { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolchainNotFound { .. } => {
                Some("Install Go from https://go.dev/dl or set build.go in the config")
            }
            Self::ToolchainTimeout { .. } => Some("Raise or unset build.timeout_secs"),
            Self::Lookup { .. } | Self::Publish { .. } => {
                Some("Check permissions on the cache directory (goscript cache path)")
            }
            _ => None,
        }
    }
}
