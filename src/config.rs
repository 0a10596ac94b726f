//! Configuration
//!
//! Layered settings for a run, lowest precedence first: built-in defaults, the
//! user config file, the project file (`protowrap.toml` or `--config`), then
//! `PROTOWRAP__*` environment variables. Command-line flags are applied on top
//! by the CLI.

use crate::error::WrapError;
use crate::logging::LoggingConfig;
use crate::wrapper::{DEFAULT_PARALLELISM, DEFAULT_PROTOC_COMMAND};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtowrapConfig {
    /// Command used to run protoc
    #[serde(default = "default_protoc_command")]
    pub protoc_command: String,

    /// Maximum simultaneous protoc runs
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Only use the files given on the command line
    #[serde(default)]
    pub only_specified_files: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_protoc_command() -> String {
    DEFAULT_PROTOC_COMMAND.to_string()
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

impl Default for ProtowrapConfig {
    fn default() -> Self {
        Self {
            protoc_command: default_protoc_command(),
            parallelism: default_parallelism(),
            only_specified_files: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl ProtowrapConfig {
    pub fn validate(&self) -> Result<(), WrapError> {
        if self.protoc_command.trim().is_empty() {
            return Err(WrapError::Config(
                "protoc_command cannot be empty".to_string(),
            ));
        }
        if self.parallelism < 1 {
            return Err(WrapError::Config(format!(
                "parallelism cannot be < 1; got {}",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Serialises tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
