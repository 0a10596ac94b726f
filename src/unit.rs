//! Unit model: the `.proto` files of a run and the packages they generate into.
//!
//! Units are built once, single-threaded, by the resolver and never mutated
//! afterwards. Packages refer to files by name; the [`PackageGraph`] owns both.

use std::collections::BTreeMap;

/// What the collector reported for one `.proto` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescription {
    /// Import-path-relative name, e.g. `foo/bar/baz.proto`
    pub name: String,
    /// The `package` statement, if any
    pub declared_package: Option<String>,
    /// The `go_package` option, if any
    pub go_package: Option<String>,
    /// Import-path-relative names of the imported files
    pub dependencies: Vec<String>,
}

/// Which rule produced a file's computed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    /// `go_package` carried an import path
    GoPackagePath,
    /// `go_package` carried only a package name
    GoPackageName,
    /// The `package` statement
    DeclaredPackage,
    /// Neither was present; the file's base name was used
    FileName,
}

/// One `.proto` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUnit {
    pub(crate) name: String,
    pub(crate) full_path: Option<String>,
    pub(crate) declared_package: Option<String>,
    pub(crate) go_package: Option<String>,
    pub(crate) dependencies: Vec<String>,
    pub(crate) computed_package: String,
    pub(crate) package_source: PackageSource,
}

impl FileUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path as given on the command line or found by discovery. `None` for
    /// files only reached through imports.
    pub fn full_path(&self) -> Option<&str> {
        self.full_path.as_deref()
    }

    pub fn declared_package(&self) -> Option<&str> {
        self.declared_package.as_deref()
    }

    pub fn go_package(&self) -> Option<&str> {
        self.go_package.as_deref()
    }

    /// Imported file names, sorted and deduplicated.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The `path;name` key of the package this file generates into.
    pub fn computed_package(&self) -> &str {
        &self.computed_package
    }

    pub fn package_source(&self) -> PackageSource {
        self.package_source
    }

    /// The path handed to protoc for this file. Falls back to the
    /// import-relative name, which protoc resolves against its `-I` dirs.
    pub fn source_path(&self) -> &str {
        self.full_path.as_deref().unwrap_or(&self.name)
    }
}

/// One output package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUnit {
    pub(crate) computed_package: String,
    pub(crate) members: Vec<String>,
    pub(crate) external_deps: Vec<String>,
    pub(crate) imports: Vec<String>,
}

impl PackageUnit {
    /// The grouping key, `import/path;name`.
    pub fn computed_package(&self) -> &str {
        &self.computed_package
    }

    /// Names of the member files, sorted.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Names of non-member files imported by at least one member, sorted.
    pub fn external_deps(&self) -> &[String] {
        &self.external_deps
    }

    /// Keys of the packages this package imports, sorted. Never contains
    /// this package's own key.
    pub fn imported_packages(&self) -> &[String] {
        &self.imports
    }

    /// Import path half of the key.
    pub fn import_path(&self) -> &str {
        split_key(&self.computed_package).0
    }

    /// Package name half of the key.
    pub fn package_name(&self) -> &str {
        split_key(&self.computed_package).1
    }
}

fn split_key(key: &str) -> (&str, &str) {
    key.rsplit_once(';').unwrap_or((key, key))
}

/// Every file and package of a run.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    pub(crate) files: BTreeMap<String, FileUnit>,
    pub(crate) packages: BTreeMap<String, PackageUnit>,
}

impl PackageGraph {
    pub fn file(&self, name: &str) -> Option<&FileUnit> {
        self.files.get(name)
    }

    pub fn package(&self, key: &str) -> Option<&PackageUnit> {
        self.packages.get(key)
    }

    /// The package a file belongs to.
    pub fn package_of(&self, file_name: &str) -> Option<&PackageUnit> {
        self.file(file_name)
            .and_then(|file| self.package(&file.computed_package))
    }

    /// All files, in name order.
    pub fn files(&self) -> impl Iterator<Item = &FileUnit> {
        self.files.values()
    }

    /// All packages, in key order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageUnit> {
        self.packages.values()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Paths to hand to protoc for a package's members, sorted.
    pub fn source_paths(&self, package: &PackageUnit) -> Vec<String> {
        let mut paths: Vec<String> = package
            .members
            .iter()
            .filter_map(|name| self.file(name))
            .map(|file| file.source_path().to_string())
            .collect();
        paths.sort();
        paths
    }

    /// Member/dependency file pairs behind the edge `from -> to`.
    pub fn imports_between(&self, from: &str, to: &str) -> Vec<(&FileUnit, &FileUnit)> {
        let Some(package) = self.package(from) else {
            return Vec::new();
        };
        let mut pairs = Vec::new();
        for member in package.members.iter().filter_map(|name| self.file(name)) {
            for dependency in member.dependencies.iter().filter_map(|name| self.file(name)) {
                if dependency.computed_package == to {
                    pairs.push((member, dependency));
                }
            }
        }
        pairs
    }
}
