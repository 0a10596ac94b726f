//! protoc-style argument splitting.
//!
//! protoc takes `-Ivalue`, `-I value`, `--name=value` and `--name value`
//! interchangeably, and most flags need a value, so the command line cannot
//! be handed to clap directly. The splitter separates the wrapper's own
//! flags from those passed through to protoc and from the input files, and
//! records every `-I` directory on the way.

use crate::cli::parse::WrapperFlags;
use crate::error::WrapError;
use clap::Parser;
use std::ffi::OsString;

/// protoc flags that never take a value.
const NO_VALUE_FLAGS: &[&str] = &[
    "-h",
    "--help",
    "--disallow_services",
    "--include_imports",
    "--include_source_info",
    "--version",
    "--decode_raw",
    "--print_free_field_numbers",
];

/// Which binary is parsing; each has its own set of custom flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Protowrap,
    Cyclecheck,
}

/// (name, takes a value) for every custom flag of `protowrap`.
const PROTOWRAP_FLAGS: &[(&str, bool)] = &[
    ("parallelism", true),
    ("print_structure", false),
    ("protoc_command", true),
    ("only_specified_files", false),
    ("print_only", false),
    ("version", false),
    ("config", true),
    ("verbose", false),
    ("log_level", true),
    ("log_format", true),
];

const CYCLECHECK_FLAGS: &[(&str, bool)] = &[
    ("print_structure", false),
    ("protoc_command", true),
    ("only_specified_files", false),
    ("config", true),
    ("verbose", false),
    ("log_level", true),
    ("log_format", true),
];

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Protowrap => "protowrap",
            Tool::Cyclecheck => "cyclecheck",
        }
    }

    pub fn custom_flags(self) -> &'static [(&'static str, bool)] {
        match self {
            Tool::Protowrap => PROTOWRAP_FLAGS,
            Tool::Cyclecheck => CYCLECHECK_FLAGS,
        }
    }

    /// Whether this tool runs generation after the cycle check.
    pub fn generates(self) -> bool {
        matches!(self, Tool::Protowrap)
    }

    fn custom_flag(self, name: &str) -> Option<bool> {
        self.custom_flags()
            .iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, takes_value)| *takes_value)
    }
}

/// A command line split into its parts, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Custom flags; `None` for a switch given without `=value`
    pub custom: Vec<(String, Option<String>)>,
    pub protoc_flags: Vec<String>,
    pub protos: Vec<String>,
    pub import_dirs: Vec<String>,
}

enum Pending {
    Nothing,
    Custom(String),
    Protoc { import_dir: bool },
}

/// Convert raw process arguments, rejecting any that are not valid UTF-8.
pub fn utf8_args<I>(args: I) -> Result<Vec<String>, WrapError>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            arg.into_string().map_err(|raw| {
                WrapError::Config(format!(
                    "argument is not valid UTF-8: {}",
                    raw.to_string_lossy()
                ))
            })
        })
        .collect()
}

/// Split `args` (without the program name) for `tool`.
pub fn split_args<I, S>(args: I, tool: Tool) -> Result<SplitArgs, WrapError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut split = SplitArgs::default();
    let mut pending = Pending::Nothing;
    let mut last = String::new();

    for arg in args {
        let arg = arg.as_ref();
        if arg.is_empty() || arg == "-" || arg == "--" {
            return Err(WrapError::Config(format!("flag {:?} not allowed", arg)));
        }
        last = arg.to_string();

        match std::mem::replace(&mut pending, Pending::Nothing) {
            Pending::Custom(name) => {
                split.custom.push((name, Some(arg.to_string())));
                continue;
            }
            Pending::Protoc { import_dir } => {
                split.protoc_flags.push(arg.to_string());
                if import_dir {
                    split.import_dirs.push(arg.to_string());
                }
                continue;
            }
            Pending::Nothing => {}
        }

        if !arg.starts_with('-') {
            split.protos.push(arg.to_string());
            continue;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            match (tool.custom_flag(name), value) {
                (Some(_), Some(value)) => split.custom.push((name.to_string(), Some(value.to_string()))),
                (Some(true), None) => pending = Pending::Custom(name.to_string()),
                (Some(false), None) => split.custom.push((name.to_string(), None)),
                (None, value) => {
                    split.protoc_flags.push(arg.to_string());
                    if value.is_none() && !NO_VALUE_FLAGS.contains(&arg) {
                        pending = Pending::Protoc { import_dir: false };
                    }
                }
            }
            continue;
        }

        // Single dash: a one-letter flag with its value attached or following.
        split.protoc_flags.push(arg.to_string());
        if NO_VALUE_FLAGS.contains(&arg) {
            continue;
        }
        let mut chars = arg[1..].chars();
        let letter = chars.next();
        let attached = chars.as_str();
        if attached.is_empty() {
            pending = Pending::Protoc {
                import_dir: letter == Some('I'),
            };
        } else if letter == Some('I') {
            split.import_dirs.push(attached.to_string());
        }
    }

    if !matches!(pending, Pending::Nothing) {
        return Err(WrapError::Config(format!("{:?} flag with no value", last)));
    }
    Ok(split)
}

/// A fully parsed command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: Tool,
    pub flags: WrapperFlags,
    pub protoc_flags: Vec<String>,
    pub protos: Vec<String>,
    pub import_dirs: Vec<String>,
}

impl Invocation {
    pub fn parse<I, S>(tool: Tool, args: I) -> Result<Self, WrapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let split = split_args(args, tool)?;

        let custom = split.custom.iter().map(|(name, value)| match value {
            Some(value) => format!("--{}={}", name, value),
            None => format!("--{}", name),
        });
        let flags = WrapperFlags::try_parse_from(custom)
            .map_err(|e| WrapError::Config(e.to_string().trim().to_string()))?;

        let invocation = Self {
            tool,
            flags,
            protoc_flags: split.protoc_flags,
            protos: split.protos,
            import_dirs: split.import_dirs,
        };
        if !invocation.wants_version() && invocation.import_dirs.is_empty() {
            return Err(WrapError::Config(
                "at least one import directory (-I) needed".to_string(),
            ));
        }
        Ok(invocation)
    }

    pub fn wants_version(&self) -> bool {
        self.flags.version.unwrap_or(false)
    }
}
