//! Usage text per tool.

use crate::cli::args::Tool;

fn describe(flag: &str) -> &'static str {
    match flag {
        "parallelism" => "int\n      parallelism when generating (default 5)",
        "print_structure" => "\n      if true, print out computed package structure",
        "protoc_command" => "string\n      command to use to call protoc (default \"protoc\")",
        "only_specified_files" => {
            "true|false\n      if true, don't search the nearest import path ancestor for other .proto files"
        }
        "print_only" => "\n      if true, print protoc commandlines instead of generating protos",
        "version" => "\n      print version and exit",
        "config" => "path\n      configuration file (default ./protowrap.toml)",
        "verbose" => "\n      log at debug level",
        "log_level" => "string\n      trace, debug, info, warn, error or off",
        "log_format" => "string\n      text or json",
        _ => "",
    }
}

/// Usage message listing the custom flags of `tool`.
pub fn usage(tool: Tool) -> String {
    let mut text = format!("Usage: {} [flags] [protofiles]\n", tool.name());
    let mut flags: Vec<&str> = tool.custom_flags().iter().map(|(name, _)| *name).collect();
    flags.sort_unstable();
    for flag in flags {
        let description = describe(flag);
        let separator = if description.starts_with('\n') { "" } else { " " };
        text.push_str(&format!("  --{}{}{}\n", flag, separator, description));
    }
    text.push_str("All other flags are passed through to protoc.\n");
    text
}
