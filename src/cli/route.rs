//! CLI route: run context built from a parsed invocation plus configuration,
//! dispatching to the wrapper pipeline.

use crate::cli::args::{utf8_args, Invocation, Tool};
use crate::cli::{map_error, usage};
use crate::collect::{DescriptorCollector, ProtocCollector};
use crate::config::{ConfigLoader, ProtowrapConfig};
use crate::error::{WrapError, EXIT_CONFIG};
use crate::logging::{init_logging, LoggingConfig};
use crate::wrapper::{Wrapper, WrapperOptions};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error, info};

/// Run `tool` with raw process arguments (program name excluded).
pub fn run_os<I>(tool: Tool, args: I) -> i32
where
    I: IntoIterator<Item = OsString>,
{
    match utf8_args(args) {
        Ok(args) => run(tool, args),
        Err(e) => {
            eprintln!("{}", map_error(&e));
            eprint!("{}", usage(tool));
            EXIT_CONFIG
        }
    }
}

/// Run `tool` with `args` (program name excluded) and return the exit code.
pub fn run<I, S>(tool: Tool, args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let invocation = match Invocation::parse(tool, args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            eprint!("{}", usage(tool));
            return EXIT_CONFIG;
        }
    };
    if invocation.wants_version() {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return 0;
    }

    let context = match RunContext::new(invocation) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            return e.exit_code();
        }
    };
    if let Err(e) = init_logging(Some(context.logging_config())) {
        eprintln!("Failed to initialize logging: {}", e);
        return EXIT_CONFIG;
    }

    // Unlocked: print-only command lines are written from worker threads.
    match context.execute(io::stdout()) {
        Ok(()) => {
            info!(tool = tool.name(), "Run completed");
            0
        }
        Err(e) => {
            error!(tool = tool.name(), exit_code = e.exit_code(), "Run failed");
            eprintln!("{}", map_error(&e));
            e.exit_code()
        }
    }
}

/// Everything a run needs: the parsed command line and the merged configuration.
pub struct RunContext {
    invocation: Invocation,
    config: ProtowrapConfig,
}

impl RunContext {
    /// Load configuration (`--config` or `./protowrap.toml`) and apply the
    /// command-line flags on top.
    pub fn new(invocation: Invocation) -> Result<Self, WrapError> {
        let config = match &invocation.flags.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(Path::new("."))?,
        };
        Self::with_config(invocation, config)
    }

    /// Apply the command-line flags to an already loaded configuration.
    pub fn with_config(invocation: Invocation, mut config: ProtowrapConfig) -> Result<Self, WrapError> {
        let flags = &invocation.flags;
        if let Some(command) = &flags.protoc_command {
            config.protoc_command = command.clone();
        }
        if let Some(parallelism) = flags.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(only) = flags.only_specified_files {
            config.only_specified_files = only;
        }
        if flags.verbose.unwrap_or(false) {
            config.logging.level = "debug".to_string();
        }
        if let Some(level) = &flags.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &flags.log_format {
            config.logging.format = format.clone();
        }
        config.validate()?;
        Ok(Self { invocation, config })
    }

    pub fn tool(&self) -> Tool {
        self.invocation.tool
    }

    pub fn config(&self) -> &ProtowrapConfig {
        &self.config
    }

    pub fn logging_config(&self) -> &LoggingConfig {
        &self.config.logging
    }

    pub fn wrapper_options(&self) -> WrapperOptions {
        WrapperOptions {
            protoc_command: self.config.protoc_command.clone(),
            parallelism: self.config.parallelism,
            protoc_flags: self.invocation.protoc_flags.clone(),
            import_dirs: self.invocation.import_dirs.clone(),
            proto_files: self.invocation.protos.clone(),
            only_specified_files: self.config.only_specified_files,
            print_only: self.tool().generates() && self.invocation.flags.print_only.unwrap_or(false),
        }
    }

    /// Run the tool against protoc, writing any structure dump to `out`.
    pub fn execute<W: Write>(&self, out: W) -> Result<(), WrapError> {
        let collector = ProtocCollector::new(self.config.protoc_command.clone());
        let wrapper = self.analyze(&collector, out)?;
        if self.tool().generates() {
            wrapper.generate(&wrapper.protoc_generator())?;
        }
        Ok(())
    }

    /// Initialise the wrapper, dump the structure if asked, then check for
    /// cycles. Everything up to, but not including, generation.
    pub fn analyze<C, W>(&self, collector: &C, mut out: W) -> Result<Wrapper, WrapError>
    where
        C: DescriptorCollector + ?Sized,
        W: Write,
    {
        info!(tool = self.tool().name(), "Starting run");
        let wrapper = Wrapper::init(self.wrapper_options(), collector)?;
        if self.invocation.flags.print_structure.unwrap_or(false) {
            wrapper.print_structure(&mut out)?;
            out.flush()?;
        }
        wrapper.check_cycles()?;
        debug!(packages = wrapper.needed_packages().len(), "No package cycles");
        Ok(wrapper)
    }
}
