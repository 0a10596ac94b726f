//! Full runs through the CLI route against a scripted protoc.

#![cfg(unix)]

use crate::integration::test_utils::{fake_protoc, path_in, proto_tree, root_of};
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use protowrap::cli::{Invocation, RunContext, Tool};
use protowrap::config::ProtowrapConfig;
use protowrap::error::{EXIT_CYCLES, EXIT_GENERATION};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn file(name: &str, package: &str, deps: &[&str]) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        dependency: deps.iter().map(|d| d.to_string()).collect(),
        ..Default::default()
    }
}

fn write_fixture(dir: &Path, files: Vec<FileDescriptorProto>) -> std::path::PathBuf {
    let path = dir.join("fixture.pb");
    fs::write(&path, FileDescriptorSet { file: files }.encode_to_vec()).unwrap();
    path
}

fn context(tool: Tool, args: Vec<String>, protoc: &str) -> RunContext {
    let invocation = Invocation::parse(tool, args).unwrap();
    let config = ProtowrapConfig {
        protoc_command: protoc.to_string(),
        ..Default::default()
    };
    RunContext::with_config(invocation, config).unwrap()
}

fn calls(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn collects_once_and_generates_once_per_package() {
    let tree = proto_tree(&["a/a1.proto", "a/a2.proto", "b/b.proto"]);
    let scratch = TempDir::new().unwrap();
    let fixture = write_fixture(
        scratch.path(),
        vec![
            file("a/a1.proto", "a", &["b/b.proto"]),
            file("a/a2.proto", "a", &[]),
            file("b/b.proto", "b", &[]),
        ],
    );
    let (protoc, log) = fake_protoc(scratch.path(), &fixture, "NEVER_MATCHES");

    let root = root_of(&tree);
    let args = vec![
        format!("-I{}", root),
        "--go_out=out".to_string(),
        path_in(&tree, "a/a1.proto"),
        path_in(&tree, "b/b.proto"),
    ];
    let run = context(Tool::Protowrap, args, &protoc);
    let mut structure = Vec::new();
    let wrapper = run.analyze(&protoc_collector(&protoc), &mut structure).unwrap();
    assert!(structure.is_empty());
    wrapper.generate(&wrapper.protoc_generator()).unwrap();

    let calls = calls(&log);
    assert_eq!(calls.len(), 3, "calls: {calls:?}");
    assert!(calls[0].contains("--descriptor_set_out="));
    assert!(calls[0].contains("--include_imports"));

    let mut generation: Vec<_> = calls[1..].to_vec();
    generation.sort();
    assert_eq!(
        generation,
        vec![
            format!(
                "-I{} --go_out=out {} {}",
                root,
                path_in(&tree, "a/a1.proto"),
                path_in(&tree, "a/a2.proto")
            ),
            format!("-I{} --go_out=out {}", root, path_in(&tree, "b/b.proto")),
        ]
    );
}

fn protoc_collector(protoc: &str) -> protowrap::collect::ProtocCollector {
    protowrap::collect::ProtocCollector::new(protoc)
}

#[test]
fn print_structure_is_written_before_cycle_check() {
    let tree = proto_tree(&["x.proto", "y.proto"]);
    let scratch = TempDir::new().unwrap();
    let fixture = write_fixture(
        scratch.path(),
        vec![file("x.proto", "x", &["y.proto"]), file("y.proto", "y", &["x.proto"])],
    );
    let (protoc, log) = fake_protoc(scratch.path(), &fixture, "NEVER_MATCHES");

    let args = vec![
        format!("-I{}", root_of(&tree)),
        "--print_structure".to_string(),
        path_in(&tree, "x.proto"),
    ];
    let run = context(Tool::Cyclecheck, args, &protoc);
    let mut structure = Vec::new();
    let err = run.execute(&mut structure).unwrap_err();

    assert_eq!(err.exit_code(), EXIT_CYCLES);
    let structure = String::from_utf8(structure).unwrap();
    assert!(structure.starts_with("> Structure:\n> .;x\n>   files:\n"));
    assert!(structure.contains(&format!(">     y.proto ({})", path_in(&tree, "y.proto"))));
    // Only the collection run happened.
    assert_eq!(calls(&log).len(), 1);
}

#[test]
fn failing_protoc_run_exits_with_generation_code() {
    let tree = proto_tree(&["good/g.proto", "bad/b.proto"]);
    let scratch = TempDir::new().unwrap();
    let fixture = write_fixture(
        scratch.path(),
        vec![file("good/g.proto", "good", &[]), file("bad/b.proto", "bad", &[])],
    );
    let (protoc, _log) = fake_protoc(scratch.path(), &fixture, "bad/b.proto");

    let args = vec![
        format!("-I{}", root_of(&tree)),
        "--parallelism=1".to_string(),
        path_in(&tree, "good/g.proto"),
        path_in(&tree, "bad/b.proto"),
    ];
    let run = context(Tool::Protowrap, args, &protoc);
    let err = run.execute(Vec::new()).unwrap_err();

    assert_eq!(err.exit_code(), EXIT_GENERATION);
    let message = err.to_string();
    assert!(message.starts_with("error generating package bad;bad"));
    assert!(message.contains("cannot generate"));
}

#[test]
fn failing_collection_carries_protoc_output() {
    let tree = proto_tree(&["a.proto"]);
    let scratch = TempDir::new().unwrap();
    let protoc = scratch.path().join("broken-protoc");
    fs::write(&protoc, "#!/bin/sh\necho 'a.proto:1:1: syntax error' >&2\nexit 1\n").unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&protoc, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let args = vec![format!("-I{}", root_of(&tree)), path_in(&tree, "a.proto")];
    let run = context(Tool::Cyclecheck, args, &protoc.to_string_lossy());
    let err = run.execute(Vec::new()).unwrap_err();

    assert_eq!(err.exit_code(), 1);
    let message = err.to_string();
    assert!(message.starts_with("cannot get .proto file information: error running"));
    assert!(message.contains("syntax error"));
}
