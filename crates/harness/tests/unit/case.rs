//! # Test Case Tests
//!
//! Identifier validation, derived paths and the verdict after failed runs. Successful runs are
//! covered by the integration tests.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvtest_core::common::FileRole;
use rvtest_core::toolchain::ToolchainPaths;
use rvtest_core::{Harness, HarnessConfig, HarnessError, TestPaths, Verdict};

use crate::common::write_file;

fn offline_harness(root: PathBuf) -> Harness {
    let config = HarnessConfig {
        root,
        ..HarnessConfig::default()
    };
    let toolchain = ToolchainPaths {
        assembler: PathBuf::from("/nonexistent/riscv64-unknown-elf-as"),
        disassembler: PathBuf::from("/nonexistent/riscv64-unknown-elf-objdump"),
    };
    Harness::new(config, toolchain)
}

#[rstest]
#[case::empty_name("integer", "")]
#[case::empty_category("", "addi")]
#[case::dot("integer", ".")]
#[case::dot_dot("..", "addi")]
#[case::slash("integer", "../addi")]
#[case::backslash("integer", "a\\b")]
fn test_invalid_identifiers_are_rejected(#[case] category: &str, #[case] name: &str) {
    let harness = offline_harness(PathBuf::from("/corpus"));
    let err = harness.case(category, name).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidTestName { .. }), "{err:?}");
    assert!(!err.is_fatal());
}

#[test]
fn test_new_case_derives_paths() {
    let harness = offline_harness(PathBuf::from("/corpus"));
    let case = harness.case("integer", "addi").unwrap();

    assert_eq!(case.category(), "integer");
    assert_eq!(case.name(), "addi");
    assert_eq!(case.id(), "integer/addi");
    assert_eq!(case.verdict(), Verdict::Unset);
    assert!(!case.passed());
    assert_eq!(
        case.paths(),
        &TestPaths::new(&PathBuf::from("/corpus"), "integer", "addi")
    );
}

#[test]
fn test_missing_source_fails_the_case() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path().to_path_buf());
    let mut case = harness.case("integer", "absent").unwrap();

    let err = case.run().unwrap_err();
    assert!(
        matches!(
            err,
            HarnessError::FileOpen {
                role: FileRole::Source,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(case.verdict(), Verdict::Fail);
}

#[test]
fn test_unlaunchable_toolchain_fails_the_case() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path().to_path_buf());
    let paths = TestPaths::new(dir.path(), "integer", "addi");
    write_file(&paths.source, "    addi a0, a0, 10\n");
    write_file(&paths.expected, "a0 = 0x0000000a\n");

    let mut case = harness.case("integer", "addi").unwrap();
    let err = case.run_detailed().unwrap_err();
    assert!(matches!(err, HarnessError::Spawn { .. }), "{err:?}");
    assert_eq!(case.verdict(), Verdict::Fail);
    drop(case);

    // Inputs are never touched.
    assert!(paths.source.exists());
    assert!(paths.expected.exists());
}

#[test]
fn test_verdict_display() {
    assert_eq!(Verdict::Unset.to_string(), "UNSET");
    assert_eq!(Verdict::Pass.to_string(), "PASS");
    assert_eq!(Verdict::Fail.to_string(), "FAIL");
}
