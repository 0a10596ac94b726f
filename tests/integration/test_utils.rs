//! Shared test utilities for integration tests
//!
//! Scratch import trees, canned descriptor collectors, recording generators
//! and (on unix) a fake protoc script.

use parking_lot::Mutex;
use protowrap::collect::DescriptorCollector;
use protowrap::error::{CollectError, GenerateError};
use protowrap::generation::{PackageGenerator, PackageJob};
use protowrap::unit::FileDescription;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Description of one file with a declared package and no go_package.
pub fn described(name: &str, package: &str, deps: &[&str]) -> FileDescription {
    FileDescription {
        name: name.to_string(),
        declared_package: Some(package.to_string()),
        go_package: None,
        dependencies: deps.iter().map(|d| d.to_string()).collect(),
    }
}

/// Create empty `.proto` files under a fresh temporary import directory.
pub fn proto_tree(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "syntax = \"proto3\";\n").unwrap();
    }
    dir
}

pub fn root_of(dir: &TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

pub fn path_in(dir: &TempDir, relative: &str) -> String {
    dir.path().join(relative).to_string_lossy().into_owned()
}

/// Collector returning canned descriptions, as protoc would for the tree.
pub struct CannedCollector {
    descriptions: Vec<FileDescription>,
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl CannedCollector {
    pub fn new(descriptions: Vec<FileDescription>) -> Self {
        Self {
            descriptions,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl DescriptorCollector for CannedCollector {
    fn collect(
        &self,
        _import_dirs: &[String],
        protos: &[String],
    ) -> Result<HashMap<String, FileDescription>, CollectError> {
        self.requests.lock().push(protos.to_vec());
        Ok(self
            .descriptions
            .iter()
            .map(|d| (d.name.clone(), d.clone()))
            .collect())
    }
}

/// Generator that records every job and fails the packages it is told to.
#[derive(Default)]
pub struct RecordingGenerator {
    failing: HashSet<String>,
    pub jobs: Mutex<Vec<PackageJob>>,
}

impl RecordingGenerator {
    pub fn failing(packages: &[&str]) -> Self {
        Self {
            failing: packages.iter().map(|p| p.to_string()).collect(),
            jobs: Mutex::new(Vec::new()),
        }
    }
}

impl PackageGenerator for RecordingGenerator {
    fn generate(&self, job: &PackageJob) -> Result<(), GenerateError> {
        self.jobs.lock().push(job.clone());
        if self.failing.contains(&job.package) {
            return Err(GenerateError::Failed {
                package: job.package.clone(),
                message: "generator failed".to_string(),
            });
        }
        Ok(())
    }
}

/// A shell script standing in for protoc.
///
/// It appends its arguments to `calls.log`. A collection run gets `fixture`
/// copied to its `--descriptor_set_out=` path; any other run fails when one
/// of its arguments contains `fail_marker`.
#[cfg(unix)]
pub fn fake_protoc(dir: &Path, fixture: &Path, fail_marker: &str) -> (String, std::path::PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("calls.log");
    let script = dir.join("fake-protoc");
    let body = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
for arg in "$@"; do
  case "$arg" in
    --descriptor_set_out=*) cp "{fixture}" "${{arg#--descriptor_set_out=}}"; exit 0 ;;
  esac
done
for arg in "$@"; do
  case "$arg" in
    *{marker}*) echo "cannot generate $arg" >&2; exit 1 ;;
  esac
done
exit 0
"#,
        log = log.display(),
        fixture = fixture.display(),
        marker = fail_marker,
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script.to_string_lossy().into_owned(), log)
}
