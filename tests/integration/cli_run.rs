//! Exit codes of the CLI entry point for runs that stop before analysis.

use protowrap::cli::{run, run_os, Tool};
use protowrap::error::EXIT_CONFIG;

#[test]
fn version_exits_cleanly_without_import_dirs() {
    assert_eq!(run(Tool::Protowrap, ["--version"]), 0);
}

#[test]
fn missing_import_dir_is_a_usage_error() {
    assert_eq!(run(Tool::Protowrap, ["a.proto"]), EXIT_CONFIG);
    assert_eq!(run(Tool::Cyclecheck, ["a.proto"]), EXIT_CONFIG);
}

#[test]
fn malformed_arguments_are_usage_errors() {
    assert_eq!(run(Tool::Protowrap, ["-I.", "--"]), EXIT_CONFIG);
    assert_eq!(run(Tool::Protowrap, ["-I.", "a.proto", "--go_out"]), EXIT_CONFIG);
    assert_eq!(
        run(Tool::Protowrap, ["-I.", "a.proto", "--parallelism=lots"]),
        EXIT_CONFIG
    );
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_a_usage_error() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let args = vec![
        OsString::from("-I."),
        OsString::from_vec(b"\xfe\xff.proto".to_vec()),
    ];
    assert_eq!(run_os(Tool::Protowrap, args.clone()), EXIT_CONFIG);
    assert_eq!(run_os(Tool::Cyclecheck, args), EXIT_CONFIG);
}
