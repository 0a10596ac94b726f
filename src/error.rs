//! Error types for protowrap.

use crate::cycles::CycleReport;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for configuration and collection errors.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code when package import cycles were found.
pub const EXIT_CYCLES: i32 = 2;
/// Exit code when a package failed to generate.
pub const EXIT_GENERATION: i32 = 3;

/// Descriptor collection errors
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Empty import path list")]
    NoImportDirs,

    #[error("Empty proto file list")]
    NoProtos,

    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error running {command}\n{status}\nOutput:\n======\n{output}======")]
    ProcessFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to read descriptor set {path:?}: {source}")]
    ReadDescriptors {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode descriptor set: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Descriptor collection I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure to generate a single package
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("error generating package {package}: failed to start {command}: {source}")]
    Spawn {
        package: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "error generating package {package}: error running {command}\n{status}\nOutput:\n======\n{output}======"
    )]
    ProcessFailed {
        package: String,
        command: String,
        status: String,
        output: String,
    },

    #[error("error generating package {package}: {message}")]
    Failed { package: String, message: String },
}

impl GenerateError {
    /// Computed package key of the package that failed.
    pub fn package(&self) -> &str {
        match self {
            GenerateError::Spawn { package, .. }
            | GenerateError::ProcessFailed { package, .. }
            | GenerateError::Failed { package, .. } => package,
        }
    }
}

/// Top-level error for one protowrap run
#[derive(Debug, Error)]
pub enum WrapError {
    #[error("{0}")]
    Config(String),

    #[error("cannot get .proto file information: {0}")]
    Collect(#[from] CollectError),

    #[error("missing file info for {0:?}")]
    MissingFileInfo(String),

    #[error("{file:?} imports {dependency:?}, which has no file information")]
    UnresolvedDependency { file: String, dependency: String },

    #[error("package {0:?} not found in package graph")]
    UnknownPackage(String),

    #[error("{0}")]
    Cycles(CycleReport),

    #[error(transparent)]
    Generation(#[from] GenerateError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WrapError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            WrapError::Cycles(_) => EXIT_CYCLES,
            WrapError::Generation(_) => EXIT_GENERATION,
            _ => EXIT_CONFIG,
        }
    }
}

impl From<config::ConfigError> for WrapError {
    fn from(err: config::ConfigError) -> Self {
        WrapError::Config(err.to_string())
    }
}
