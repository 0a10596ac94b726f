//! One protowrap run: discovery, collection, resolution, then cycle checking
//! and generation over the packages the caller asked for.

use crate::collect::DescriptorCollector;
use crate::cycles::{self, CycleReport};
use crate::discovery;
use crate::error::WrapError;
use crate::generation::{self, GenerationPlan, PackageGenerator, ProtocGenerator};
use crate::resolve::{self, ResolveWarning};
use crate::unit::PackageGraph;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{self, Write};
use tracing::{debug, info};

/// Default command used to run protoc.
pub const DEFAULT_PROTOC_COMMAND: &str = "protoc";

/// Default number of simultaneous protoc runs.
pub const DEFAULT_PARALLELISM: usize = 5;

#[derive(Debug, Clone)]
pub struct WrapperOptions {
    /// Command used to run protoc
    pub protoc_command: String,
    /// Maximum simultaneous protoc runs during generation
    pub parallelism: usize,
    /// Flags passed through to every generation run
    pub protoc_flags: Vec<String>,
    /// Base directories the `.proto` files live in
    pub import_dirs: Vec<String>,
    /// Files to generate code for
    pub proto_files: Vec<String>,
    /// Skip looking for other `.proto` files alongside the requested ones
    pub only_specified_files: bool,
    /// Print protoc command lines instead of running them
    pub print_only: bool,
}

impl Default for WrapperOptions {
    fn default() -> Self {
        Self {
            protoc_command: DEFAULT_PROTOC_COMMAND.to_string(),
            parallelism: DEFAULT_PARALLELISM,
            protoc_flags: Vec::new(),
            import_dirs: Vec::new(),
            proto_files: Vec::new(),
            only_specified_files: false,
            print_only: false,
        }
    }
}

/// An initialised run. Everything is computed up front by [`Wrapper::init`];
/// the package graph is read-only afterwards.
#[derive(Debug)]
pub struct Wrapper {
    options: WrapperOptions,
    all_protos: Vec<String>,
    graph: PackageGraph,
    warnings: Vec<ResolveWarning>,
    needed: Vec<String>,
}

impl Wrapper {
    pub fn init<C>(mut options: WrapperOptions, collector: &C) -> Result<Self, WrapError>
    where
        C: DescriptorCollector + ?Sized,
    {
        discovery::validate_inputs(&options.import_dirs, &options.proto_files)?;
        if options.protoc_command.is_empty() {
            options.protoc_command = DEFAULT_PROTOC_COMMAND.to_string();
        }

        let all_protos = expand_protos(&options)?;
        let descriptions = collector.collect(&options.import_dirs, &all_protos)?;

        let mut full_paths = HashMap::with_capacity(all_protos.len());
        for proto in &all_protos {
            let name = discovery::descriptor_name(proto, &options.import_dirs)?;
            if !descriptions.contains_key(&name) {
                return Err(WrapError::MissingFileInfo(proto.clone()));
            }
            full_paths.entry(name).or_insert_with(|| proto.clone());
        }

        let resolution = resolve::resolve(descriptions.into_values(), &full_paths)?;

        let mut needed = BTreeSet::new();
        for proto in &options.proto_files {
            let name = discovery::descriptor_name(proto, &options.import_dirs)?;
            let package = resolution
                .graph
                .package_of(&name)
                .ok_or_else(|| WrapError::MissingFileInfo(proto.clone()))?;
            needed.insert(package.computed_package().to_string());
        }

        info!(
            files = resolution.graph.files().count(),
            packages = resolution.graph.package_count(),
            needed = needed.len(),
            "Resolved packages"
        );

        Ok(Self {
            options,
            all_protos,
            graph: resolution.graph,
            warnings: resolution.warnings,
            needed: needed.into_iter().collect(),
        })
    }

    pub fn options(&self) -> &WrapperOptions {
        &self.options
    }

    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    /// Requested files plus those discovered alongside them.
    pub fn all_protos(&self) -> &[String] {
        &self.all_protos
    }

    /// Keys of the packages holding at least one requested file, sorted.
    pub fn needed_packages(&self) -> &[String] {
        &self.needed
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    /// Dump the needed packages with their files and external dependencies.
    pub fn print_structure<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "> Structure:")?;
        for key in &self.needed {
            let Some(package) = self.graph.package(key) else {
                continue;
            };
            writeln!(writer, "> {}", key)?;
            writeln!(writer, ">   files:")?;
            for file in package.members().iter().filter_map(|m| self.graph.file(m)) {
                writeln!(
                    writer,
                    ">     {} ({})",
                    file.name(),
                    file.full_path().unwrap_or_default()
                )?;
            }
            writeln!(writer, ">   deps:")?;
            for file in package.external_deps().iter().filter_map(|d| self.graph.file(d)) {
                match file.full_path() {
                    Some(full_path) => writeln!(writer, ">     {} ({})", file.name(), full_path)?,
                    None => writeln!(writer, ">     {}", file.name())?,
                }
            }
        }
        Ok(())
    }

    pub fn find_cycles(&self) -> Result<CycleReport, WrapError> {
        cycles::find_cycles(&self.graph, &self.needed)
    }

    /// Fail with the full explanation if the needed packages reach a cycle.
    pub fn check_cycles(&self) -> Result<(), WrapError> {
        cycles::check_cycles(&self.graph, &self.needed)
    }

    pub fn plan(&self) -> Result<GenerationPlan, WrapError> {
        let plan = GenerationPlan::for_packages(&self.graph, &self.needed, self.options.parallelism)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Generate every needed package with `generator`.
    pub fn generate<G>(&self, generator: &G) -> Result<(), WrapError>
    where
        G: PackageGenerator + ?Sized,
    {
        let plan = self.plan()?;
        debug!(
            jobs = plan.jobs.len(),
            workers = plan.worker_count(),
            "Starting generation"
        );
        generation::execute(&plan, generator)
    }

    /// The protoc-backed generator configured from this run's options.
    pub fn protoc_generator(&self) -> ProtocGenerator {
        ProtocGenerator::new(
            self.options.protoc_command.clone(),
            self.options.protoc_flags.clone(),
        )
        .print_only(self.options.print_only)
    }
}

/// Requested files followed by any other `.proto` files below the import
/// directories they came from.
fn expand_protos(options: &WrapperOptions) -> Result<Vec<String>, WrapError> {
    let mut all = options.proto_files.clone();
    if options.only_specified_files {
        return Ok(all);
    }

    let used = discovery::import_dirs_used(&options.import_dirs, &options.proto_files);
    let neighbours = discovery::protos_below(&used)?;

    let mut known = HashSet::new();
    for proto in &options.proto_files {
        known.insert(discovery::descriptor_name(proto, &options.import_dirs)?);
    }
    for proto in discovery::disjoint(&options.proto_files, &neighbours) {
        // The same file may be spelled differently, e.g. with a leading "./".
        if known.insert(discovery::descriptor_name(&proto, &options.import_dirs)?) {
            all.push(proto);
        }
    }
    debug!(
        requested = options.proto_files.len(),
        discovered = all.len() - options.proto_files.len(),
        "Expanded input files"
    );
    Ok(all)
}
