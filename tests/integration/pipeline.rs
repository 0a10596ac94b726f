//! End-to-end runs of the wrapper with canned descriptors and a recording generator.

use crate::integration::test_utils::{
    described, path_in, proto_tree, root_of, CannedCollector, RecordingGenerator,
};
use protowrap::error::{WrapError, EXIT_CYCLES, EXIT_GENERATION};
use protowrap::unit::FileDescription;
use protowrap::wrapper::{Wrapper, WrapperOptions};

fn options(root: &str, files: Vec<String>) -> WrapperOptions {
    WrapperOptions {
        import_dirs: vec![root.to_string()],
        proto_files: files,
        parallelism: 2,
        ..Default::default()
    }
}

#[test]
fn files_sharing_a_package_generate_together() {
    let tree = proto_tree(&["a.proto", "b.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![
        described("a.proto", "p", &["b.proto"]),
        described("b.proto", "p", &[]),
    ]);

    let wrapper =
        Wrapper::init(options(&root, vec![path_in(&tree, "a.proto")]), &collector).unwrap();
    assert_eq!(wrapper.needed_packages(), [".;p".to_string()]);

    let package = wrapper.graph().package(".;p").unwrap();
    assert_eq!(package.members(), ["a.proto".to_string(), "b.proto".to_string()]);
    assert!(package.external_deps().is_empty());
    assert!(package.imported_packages().is_empty());

    wrapper.check_cycles().unwrap();

    let generator = RecordingGenerator::default();
    wrapper.generate(&generator).unwrap();
    let jobs = generator.jobs.lock();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].package, ".;p");
    assert_eq!(
        jobs[0].files,
        vec![path_in(&tree, "a.proto"), path_in(&tree, "b.proto")]
    );
}

#[test]
fn mutual_imports_are_reported_as_a_cycle() {
    let tree = proto_tree(&["x.proto", "y.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![
        described("x.proto", "x", &["y.proto"]),
        described("y.proto", "y", &["x.proto"]),
    ]);

    let wrapper =
        Wrapper::init(options(&root, vec![path_in(&tree, "x.proto")]), &collector).unwrap();
    let err = wrapper.check_cycles().unwrap_err();
    assert_eq!(err.exit_code(), EXIT_CYCLES);

    let message = err.to_string();
    assert!(message.starts_with("cycles found:"));
    assert!(message.contains(" .;x --> .;y"));
    assert!(message.contains(" .;y --> .;x"));
    assert!(message.contains("  x.proto imports y.proto"));
    assert!(message.contains("  y.proto imports x.proto"));

    match err {
        WrapError::Cycles(report) => {
            assert_eq!(report.cycles.len(), 1);
            assert_eq!(
                report.cycles[0].packages,
                vec![".;x".to_string(), ".;y".to_string()]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cycle_among_dependency_packages_is_found_from_needed_root() {
    let tree = proto_tree(&["app/app.proto", "lib/a.proto", "lib2/b.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![
        described("app/app.proto", "app", &["lib/a.proto"]),
        described("lib/a.proto", "lib", &["lib2/b.proto"]),
        described("lib2/b.proto", "lib2", &["lib/a.proto"]),
    ]);

    let mut opts = options(&root, vec![path_in(&tree, "app/app.proto")]);
    opts.only_specified_files = true;
    let wrapper = Wrapper::init(opts, &collector).unwrap();

    assert_eq!(wrapper.needed_packages(), ["app;app".to_string()]);
    let report = wrapper.find_cycles().unwrap();
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(
        report.cycles[0].packages,
        vec!["lib2;lib2".to_string(), "lib;lib".to_string()]
    );
}

#[test]
fn go_package_annotations_choose_the_package() {
    let tree = proto_tree(&["one/a.proto", "two/b.proto", "three/c.proto", "four/d.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![
        FileDescription {
            name: "one/a.proto".to_string(),
            declared_package: Some("acme.one".to_string()),
            go_package: Some("github.com/acme/api;apiv1".to_string()),
            dependencies: Vec::new(),
        },
        FileDescription {
            name: "two/b.proto".to_string(),
            declared_package: Some("acme.two".to_string()),
            go_package: Some("github.com/acme/api".to_string()),
            dependencies: Vec::new(),
        },
        FileDescription {
            name: "three/c.proto".to_string(),
            declared_package: Some("foo-bar.baz".to_string()),
            go_package: None,
            dependencies: Vec::new(),
        },
        FileDescription {
            name: "four/d.proto".to_string(),
            declared_package: None,
            go_package: None,
            dependencies: Vec::new(),
        },
    ]);

    let wrapper = Wrapper::init(
        options(&root, vec![path_in(&tree, "one/a.proto")]),
        &collector,
    )
    .unwrap();
    let package_of = |name: &str| {
        wrapper
            .graph()
            .file(name)
            .unwrap()
            .computed_package()
            .to_string()
    };

    assert_eq!(package_of("one/a.proto"), "github.com/acme/api;apiv1");
    assert_eq!(package_of("two/b.proto"), "github.com/acme/api;api");
    assert_eq!(package_of("three/c.proto"), "three;foo_bar_baz");
    assert_eq!(package_of("four/d.proto"), "four;d");

    let warned: Vec<_> = wrapper.warnings().iter().map(|w| w.file.as_str()).collect();
    assert_eq!(warned, vec!["four/d.proto"]);
}

#[test]
fn unresolved_import_fails_before_generation() {
    let tree = proto_tree(&["a.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![described("a.proto", "a", &["missing.proto"])]);

    let err = Wrapper::init(options(&root, vec![path_in(&tree, "a.proto")]), &collector)
        .unwrap_err();
    assert!(matches!(err, WrapError::UnresolvedDependency { .. }));
}

#[test]
fn only_requested_packages_are_generated() {
    let tree = proto_tree(&["a/a.proto", "b/b.proto", "c/c.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(vec![
        described("a/a.proto", "a", &["b/b.proto"]),
        described("b/b.proto", "b", &[]),
        described("c/c.proto", "c", &[]),
    ]);

    let wrapper = Wrapper::init(
        options(
            &root,
            vec![path_in(&tree, "c/c.proto"), path_in(&tree, "a/a.proto")],
        ),
        &collector,
    )
    .unwrap();
    assert_eq!(wrapper.graph().package_count(), 3);

    let generator = RecordingGenerator::default();
    wrapper.generate(&generator).unwrap();
    let mut generated: Vec<_> = generator
        .jobs
        .lock()
        .iter()
        .map(|job| job.package.clone())
        .collect();
    generated.sort();
    assert_eq!(generated, vec!["a;a".to_string(), "c;c".to_string()]);
}

#[test]
fn generation_failure_maps_to_generation_exit_code() {
    let tree = proto_tree(&["a/a.proto", "b/b.proto", "c/c.proto", "d/d.proto", "e/e.proto"]);
    let root = root_of(&tree);
    let collector = CannedCollector::new(
        ["a", "b", "c", "d", "e"]
            .iter()
            .map(|p| described(&format!("{p}/{p}.proto"), p, &[]))
            .collect(),
    );
    let files = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|p| path_in(&tree, &format!("{p}/{p}.proto")))
        .collect();

    let wrapper = Wrapper::init(options(&root, files), &collector).unwrap();
    let generator = RecordingGenerator::failing(&["c;c"]);
    let err = wrapper.generate(&generator).unwrap_err();

    assert_eq!(err.exit_code(), EXIT_GENERATION);
    assert!(err.to_string().contains("c;c"));
    assert!(generator.jobs.lock().len() <= 5);
}
