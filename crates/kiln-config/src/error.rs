//! Error types for kiln-config

use std::path::PathBuf;

/// Result type for kiln-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicit config path was given but it is not absolute
    #[error("configPath must be an absolute path, got {path}")]
    ConfigPathNotAbsolute { path: PathBuf },

    /// The config file has an extension nothing knows how to load
    #[error("Unsupported config file format: {path}")]
    UnsupportedConfigFormat { path: PathBuf },

    /// The config file needs compiling but no compiler was provided
    #[error("Config file {path} must be compiled before loading, but no compiler is available")]
    CompilerUnavailable { path: PathBuf },

    /// The nested compile of a config file failed
    #[error("Failed to compile config file {path}: {message}")]
    BootstrapCompile { path: PathBuf, message: String },

    /// Importing a module's default export failed
    #[error("Failed to import {path}: {message}")]
    Import { path: PathBuf, message: String },

    /// Failure reported by the external compilation engine
    #[error("Compilation engine error: {message}")]
    Engine { message: String },

    /// No free port could be found, or the strict port is taken
    #[error("Port {port} on {host} is not available")]
    PortUnavailable { host: String, port: u16 },

    /// A configuration value has the wrong shape
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Filesystem error from kiln-fs
    #[error(transparent)]
    Fs(#[from] kiln_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
