//! Entry point for loading [`ProtowrapConfig`].

use super::merge::merge_policy;
use super::sources::{environment, project_file, user_file};
use super::ProtowrapConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load with the project file taken from `project_root/protowrap.toml`.
    pub fn load(project_root: &Path) -> Result<ProtowrapConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = user_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        Self::finish(builder)
    }

    /// Load with an explicit project file, which must exist.
    pub fn load_from_file(path: &Path) -> Result<ProtowrapConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = user_file::add_to_builder(builder)?;
        let builder = project_file::add_file(builder, path)?;
        Self::finish(builder)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        user_file::user_config_path()
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<ProtowrapConfig, ConfigError> {
        let config: ProtowrapConfig = environment::add_to_builder(builder)
            .build()?
            .try_deserialize()?;
        debug!(
            protoc_command = %config.protoc_command,
            parallelism = config.parallelism,
            "Loaded configuration"
        );
        Ok(config)
    }
}
