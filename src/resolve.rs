//! Package resolution
//!
//! Decides which Go package every `.proto` file generates into and groups the
//! files into [`PackageUnit`]s. The computed package of a file is always the
//! full `path;name` form, whether or not the name is redundant with the path.

use crate::error::WrapError;
use crate::unit::{FileDescription, FileUnit, PackageGraph, PackageSource, PackageUnit};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, warn};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Result of [`compute_package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedPackage {
    pub key: String,
    pub source: PackageSource,
}

/// A file that had to fall back to its base name for a package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveWarning {
    pub file: String,
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {:?} has no go_package and no package", self.file)
    }
}

/// Files grouped into packages, plus anything worth warning about.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub graph: PackageGraph,
    pub warnings: Vec<ResolveWarning>,
}

/// Compute the `path;name` package key of a file from its own fields.
pub fn compute_package(
    name: &str,
    declared_package: Option<&str>,
    go_package: Option<&str>,
) -> ComputedPackage {
    let go_package = go_package.unwrap_or_default();

    // A slash past the first character means go_package carries an import path.
    if matches!(go_package.rfind('/'), Some(slash) if slash > 0) {
        let key = if go_package.contains(';') {
            go_package.to_string()
        } else {
            let short = go_package.rsplit('/').next().unwrap_or(go_package);
            format!("{};{}", go_package, short)
        };
        return ComputedPackage {
            key,
            source: PackageSource::GoPackagePath,
        };
    }

    let (package_name, source) = if !go_package.is_empty() {
        (go_package, PackageSource::GoPackageName)
    } else if let Some(declared) = declared_package.filter(|p| !p.is_empty()) {
        (declared, PackageSource::DeclaredPackage)
    } else {
        (base_name(name), PackageSource::FileName)
    };

    ComputedPackage {
        key: format!("{};{}", dir_name(name), sanitize_identifier(package_name)),
        source,
    }
}

/// Replace every character that cannot appear in a Go identifier with `_`.
///
/// Letters are the Unicode `L*` categories and digits are `Nd` only, so marks
/// and other numerals such as `²` or `Ⅳ` are replaced.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect()
}

fn is_identifier_char(c: char) -> bool {
    c == '_'
        || matches!(
            get_general_category(c),
            GeneralCategory::UppercaseLetter
                | GeneralCategory::LowercaseLetter
                | GeneralCategory::TitlecaseLetter
                | GeneralCategory::ModifierLetter
                | GeneralCategory::OtherLetter
                | GeneralCategory::DecimalNumber
        )
}

/// Last path element with its last dotted suffix removed.
pub fn base_name(name: &str) -> &str {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    }
}

/// Directory part of a slash-separated name; `.` when there is none.
pub fn dir_name(name: &str) -> &str {
    match name.rfind('/') {
        Some(0) => "/",
        Some(slash) => &name[..slash],
        None => ".",
    }
}

/// Build the package graph from collected descriptions.
///
/// `full_paths` maps file names to the paths they were given as on the
/// command line or found at during discovery.
pub fn resolve<I>(descriptions: I, full_paths: &HashMap<String, String>) -> Result<Resolution, WrapError>
where
    I: IntoIterator<Item = FileDescription>,
{
    let mut files = BTreeMap::new();
    for description in descriptions {
        let unit = build_unit(description, full_paths);
        files.insert(unit.name.clone(), unit);
    }

    for file in files.values() {
        if let Some(missing) = file.dependencies.iter().find(|dep| !files.contains_key(*dep)) {
            return Err(WrapError::UnresolvedDependency {
                file: file.name.clone(),
                dependency: missing.clone(),
            });
        }
    }

    let mut warnings = Vec::new();
    let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files.values() {
        if file.package_source == PackageSource::FileName {
            warn!(file = %file.name, "file has no go_package and no package");
            warnings.push(ResolveWarning {
                file: file.name.clone(),
            });
        }
        buckets
            .entry(file.computed_package.clone())
            .or_default()
            .push(file.name.clone());
    }

    let mut packages = BTreeMap::new();
    for (key, members) in buckets {
        let mut external_deps = BTreeSet::new();
        let mut imports = BTreeSet::new();
        for dependency in members
            .iter()
            .flat_map(|member| files[member].dependencies.iter())
        {
            let target = &files[dependency].computed_package;
            if *target != key {
                external_deps.insert(dependency.clone());
                imports.insert(target.clone());
            }
        }
        debug!(
            package = %key,
            members = members.len(),
            imports = imports.len(),
            "Collected package"
        );
        packages.insert(
            key.clone(),
            PackageUnit {
                computed_package: key,
                members,
                external_deps: external_deps.into_iter().collect(),
                imports: imports.into_iter().collect(),
            },
        );
    }

    Ok(Resolution {
        graph: PackageGraph { files, packages },
        warnings,
    })
}

fn build_unit(description: FileDescription, full_paths: &HashMap<String, String>) -> FileUnit {
    let FileDescription {
        name,
        declared_package,
        go_package,
        mut dependencies,
    } = description;
    dependencies.sort();
    dependencies.dedup();

    let computed = compute_package(&name, declared_package.as_deref(), go_package.as_deref());
    FileUnit {
        full_path: full_paths.get(&name).cloned(),
        name,
        declared_package,
        go_package,
        dependencies,
        computed_package: computed.key,
        package_source: computed.source,
    }
}
