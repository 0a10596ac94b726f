//! Descriptor collection
//!
//! Asks protoc to parse every input file (and, through `--include_imports`,
//! everything they import) and reads back the resulting `FileDescriptorSet`.

use crate::command::{combined_output, CommandLine};
use crate::error::CollectError;
use crate::unit::FileDescription;
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use std::collections::HashMap;
use tracing::{debug, info};

/// Source of [`FileDescription`]s for a set of `.proto` files.
pub trait DescriptorCollector {
    /// Describe `protos` and everything they import, keyed by file name.
    fn collect(
        &self,
        import_dirs: &[String],
        protos: &[String],
    ) -> Result<HashMap<String, FileDescription>, CollectError>;
}

/// Collects descriptors by running protoc with `--descriptor_set_out`.
#[derive(Debug, Clone)]
pub struct ProtocCollector {
    protoc_command: String,
}

impl ProtocCollector {
    pub fn new(protoc_command: impl Into<String>) -> Self {
        Self {
            protoc_command: protoc_command.into(),
        }
    }

    fn command_line(&self, import_dirs: &[String], protos: &[String], descriptor_out: &str) -> CommandLine {
        let mut args = Vec::with_capacity(import_dirs.len() * 2 + protos.len() + 2);
        for dir in import_dirs {
            args.push("-I".to_string());
            args.push(dir.clone());
        }
        args.push(format!("--descriptor_set_out={}", descriptor_out));
        args.push("--include_imports".to_string());
        args.extend(protos.iter().cloned());
        CommandLine::new(self.protoc_command.clone(), args)
    }
}

impl DescriptorCollector for ProtocCollector {
    fn collect(
        &self,
        import_dirs: &[String],
        protos: &[String],
    ) -> Result<HashMap<String, FileDescription>, CollectError> {
        if import_dirs.is_empty() {
            return Err(CollectError::NoImportDirs);
        }
        if protos.is_empty() {
            return Err(CollectError::NoProtos);
        }

        let scratch = tempfile::Builder::new()
            .prefix("filedescriptors")
            .tempdir()?;
        let descriptor_path = scratch.path().join("all.pb");
        let command_line =
            self.command_line(import_dirs, protos, &descriptor_path.to_string_lossy());

        info!(files = protos.len(), "Collecting file descriptors");
        let output = command_line
            .to_command()
            .output()
            .map_err(|source| CollectError::Spawn {
                command: command_line.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(CollectError::ProcessFailed {
                command: command_line.to_string(),
                status: output.status.to_string(),
                output: combined_output(&output),
            });
        }

        let bytes = std::fs::read(&descriptor_path).map_err(|source| {
            CollectError::ReadDescriptors {
                path: descriptor_path.clone(),
                source,
            }
        })?;
        let descriptions = decode_descriptor_set(&bytes)?;
        debug!(described = descriptions.len(), "Decoded file descriptor set");
        Ok(descriptions)
    }
}

/// Decode a serialized `FileDescriptorSet` into descriptions keyed by file name.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<HashMap<String, FileDescription>, CollectError> {
    let set = FileDescriptorSet::decode(bytes)?;
    Ok(set
        .file
        .into_iter()
        .map(describe)
        .map(|description| (description.name.clone(), description))
        .collect())
}

fn describe(file: FileDescriptorProto) -> FileDescription {
    let go_package = file
        .options
        .as_ref()
        .and_then(|options| options.go_package.clone())
        .filter(|p| !p.is_empty());
    FileDescription {
        name: file.name().to_string(),
        declared_package: file.package.filter(|p| !p.is_empty()),
        go_package,
        dependencies: file.dependency,
    }
}
