//! # Path Derivation Tests

use std::path::Path;

use pretty_assertions::assert_eq;
use rvtest_core::TestPaths;
use rvtest_core::common::paths::{assembly_dir, category_resources};

#[test]
fn test_paths_follow_layout() {
    let paths = TestPaths::new(Path::new("/corpus"), "integer", "addi");
    let base = Path::new("/corpus/integer/testResources");

    assert_eq!(paths.source, base.join("assembly/addi.s"));
    assert_eq!(paths.object, base.join("assembly/addi.out"));
    assert_eq!(paths.disassembly, base.join("assembly/addi.dis"));
    assert_eq!(paths.image, base.join("memImages/addi.mem"));
    assert_eq!(paths.expected, base.join("expected/addi.txt"));
    assert_eq!(paths.result, base.join("results/addi.txt"));
}

#[test]
fn test_paths_are_deterministic() {
    let a = TestPaths::new(Path::new("root"), "mem", "lw_sw");
    let b = TestPaths::new(Path::new("root"), "mem", "lw_sw");
    assert_eq!(a, b);
}

#[test]
fn test_generated_excludes_inputs() {
    let paths = TestPaths::new(Path::new("/corpus"), "integer", "addi");
    let generated = paths.generated();

    assert_eq!(generated.len(), 4);
    assert!(!generated.contains(&paths.source.as_path()));
    assert!(!generated.contains(&paths.expected.as_path()));
    assert_eq!(generated[0], paths.object.as_path());
    assert_eq!(generated[3], paths.result.as_path());
}

#[test]
fn test_category_directories() {
    let root = Path::new("/corpus");
    assert_eq!(
        category_resources(root, "branch"),
        Path::new("/corpus/branch/testResources")
    );
    assert_eq!(
        assembly_dir(root, "branch"),
        Path::new("/corpus/branch/testResources/assembly")
    );
}
