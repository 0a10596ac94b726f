//! CLI parse: clap types for the wrapper's own flags. No behavior; definitions only.
//!
//! These are parsed from the custom flags captured by the argument splitter,
//! never from the raw command line.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

/// Custom flags shared by `protowrap` and `cyclecheck`. Every field is
/// optional so that unset flags fall through to the configuration layers.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct WrapperFlags {
    /// Parallelism when generating (default 5)
    #[arg(long = "parallelism")]
    pub parallelism: Option<usize>,

    /// Print out the computed package structure
    #[arg(
        long = "print_structure",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub print_structure: Option<bool>,

    /// Command used to call protoc (default "protoc")
    #[arg(long = "protoc_command")]
    pub protoc_command: Option<String>,

    /// Don't search the import directories for other .proto files
    #[arg(
        long = "only_specified_files",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub only_specified_files: Option<bool>,

    /// Print protoc command lines instead of generating
    #[arg(
        long = "print_only",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub print_only: Option<bool>,

    /// Print version and exit
    #[arg(
        long = "version",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub version: Option<bool>,

    /// Configuration file (overrides ./protowrap.toml)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(
        long = "verbose",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: Option<bool>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long = "log_level")]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long = "log_format")]
    pub log_format: Option<String>,
}
