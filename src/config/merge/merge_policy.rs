//! Built-in defaults, the lowest configuration layer.

use crate::wrapper::{DEFAULT_PARALLELISM, DEFAULT_PROTOC_COMMAND};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("protoc_command", DEFAULT_PROTOC_COMMAND)?
        .set_default("parallelism", DEFAULT_PARALLELISM as i64)?
        .set_default("only_specified_files", false)
}
