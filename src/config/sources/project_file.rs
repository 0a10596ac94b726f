//! Project config file source: `protowrap.toml` in the project root, or a
//! file named with `--config`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

pub const PROJECT_CONFIG_FILE: &str = "protowrap.toml";

/// Add `project_root/protowrap.toml` to builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    project_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if path.exists() {
        return Ok(builder.add_source(File::from(path).required(false)));
    }
    Ok(builder)
}

/// Add an explicitly requested config file; loading fails if it is missing.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Message(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).required(true)))
}
