//! Input validation and `.proto` discovery below import directories

use crate::error::WrapError;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

const PROTO_SUFFIX: &str = ".proto";

/// Check the import directories and requested files before any process runs.
pub fn validate_inputs(import_dirs: &[String], proto_files: &[String]) -> Result<(), WrapError> {
    if import_dirs.is_empty() {
        return config_error("at least one import directory required".to_string());
    }
    for dir in import_dirs {
        match std::fs::metadata(dir) {
            Err(_) => return config_error(format!("Nonexistent import directory: {:?}", dir)),
            Ok(meta) if !meta.is_dir() => {
                return config_error(format!("Non-directory import directory: {:?}", dir))
            }
            Ok(_) => {}
        }
    }

    if proto_files.is_empty() {
        return config_error("at least one input .proto file is required".to_string());
    }
    for file in proto_files {
        if !file.ends_with(PROTO_SUFFIX) {
            return config_error(format!("non-proto input file: {:?}", file));
        }
        if !in_import_dir(file, import_dirs) {
            return config_error(format!(
                "proto file {:?} must have a lexicographical prefix of one of the import directories",
                file
            ));
        }
        if !Path::new(file).exists() {
            return config_error(format!("input {:?} does not exist", file));
        }
    }
    Ok(())
}

fn config_error<T>(message: String) -> Result<T, WrapError> {
    Err(WrapError::Config(message))
}

/// Whether some import directory is a lexical prefix of `file`.
pub fn in_import_dir(file: &str, import_dirs: &[String]) -> bool {
    import_dirs.iter().any(|dir| file.starts_with(dir.as_str()))
}

/// Import directories that are a lexical prefix of at least one of `protos`,
/// in their original order.
pub fn import_dirs_used(import_dirs: &[String], protos: &[String]) -> Vec<String> {
    import_dirs
        .iter()
        .filter(|dir| protos.iter().any(|proto| proto.starts_with(dir.as_str())))
        .cloned()
        .collect()
}

/// Every `.proto` file in or below `dirs`, sorted within each directory.
///
/// Paths are the directory joined with the relative path, except that a
/// directory of `.` yields bare relative paths.
pub fn protos_below(dirs: &[String]) -> Result<Vec<String>, WrapError> {
    let mut protos = Vec::new();
    for dir in dirs {
        let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                WrapError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk import directory {:?}: {}", dir, e),
                ))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(PROTO_SUFFIX) {
                continue;
            }
            let path = entry.path().to_string_lossy().into_owned();
            let path = match path.strip_prefix("./") {
                Some(rest) if dir == "." => rest.to_string(),
                _ => path,
            };
            protos.push(path);
        }
    }
    Ok(protos)
}

/// The entries of `additional` not in `existing`, first occurrence only.
pub fn disjoint(existing: &[String], additional: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    additional
        .iter()
        .filter(|proto| seen.insert(proto.as_str()))
        .cloned()
        .collect()
}

/// Import-directory-relative name protoc gives `proto_file`.
pub fn descriptor_name(proto_file: &str, import_dirs: &[String]) -> Result<String, WrapError> {
    let absolute = Path::new(proto_file).is_absolute();
    for dir in import_dirs {
        if dir == "." && !absolute {
            let name = proto_file.strip_prefix("./").unwrap_or(proto_file);
            return Ok(name.to_string());
        }
        if let Some(rest) = proto_file.strip_prefix(dir.as_str()) {
            let name = match rest.strip_prefix('/') {
                Some(trimmed) if dir != "/" => trimmed,
                _ => rest,
            };
            return Ok(name.to_string());
        }
    }
    Err(WrapError::Config(format!(
        "unable to find import dir for {:?}",
        proto_file
    )))
}
