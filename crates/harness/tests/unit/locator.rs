//! # Toolchain Locator Tests
//!
//! Pattern matching, search order and the not-found diagnostic.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvtest_core::config::{PatternSpec, ToolchainConfig};
use rvtest_core::toolchain::{ToolPattern, ToolchainLocator};
use rvtest_core::{HarnessError, Tool};

fn default_assembler() -> ToolPattern {
    ToolPattern::from_spec(&ToolchainConfig::default().assembler).unwrap()
}

fn default_disassembler() -> ToolPattern {
    ToolPattern::from_spec(&ToolchainConfig::default().disassembler).unwrap()
}

#[rstest]
#[case("riscv64-unknown-elf-as", true)]
#[case("riscv32-unknown-elf-as", true)]
#[case("riscv64-linux-gnu-as", true)]
#[case("riscv64-unknown-elf-as.exe", true)]
#[case("riscv64-unknown-elf-objdump", false)]
#[case("riscv64-unknown-elf-gcc", false)]
#[case("riscv64-unknown-elf-as.txt", false)]
#[case("x86_64-linux-gnu-as", false)]
#[case("as", false)]
fn test_default_assembler_pattern(#[case] file_name: &str, #[case] expected: bool) {
    assert_eq!(default_assembler().is_match(file_name), expected);
}

#[rstest]
#[case("riscv64-unknown-elf-objdump", true)]
#[case("riscv32-unknown-linux-gnu-objdump", true)]
#[case("riscv64-unknown-elf-as", false)]
#[case("objdump", false)]
fn test_default_disassembler_pattern(#[case] file_name: &str, #[case] expected: bool) {
    assert_eq!(default_disassembler().is_match(file_name), expected);
}

#[test]
fn test_substring_pattern_is_literal() {
    let pattern = ToolPattern::substring("elf-as.").unwrap();
    assert_eq!(pattern.as_str(), "elf-as.");
    assert!(pattern.is_match("riscv64-unknown-elf-as.exe"));
    assert!(!pattern.is_match("riscv64-unknown-elf-asx"));
}

#[test]
fn test_invalid_regex_is_run_scoped() {
    let err = ToolPattern::from_spec(&PatternSpec::Regex("riscv(".to_string())).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidPattern { .. }), "{err:?}");
    assert!(err.is_fatal());
}

#[test]
fn test_root_takes_precedence_over_search_path() {
    let config = ToolchainConfig::default();
    let locator = ToolchainLocator::new(
        &config,
        Some(OsString::from("/usr/bin")),
        Some(PathBuf::from("/opt/riscv")),
    );
    assert_eq!(
        locator.search_dirs(),
        vec![PathBuf::from("/opt/riscv"), PathBuf::from("/opt/riscv/bin")]
    );
}

#[test]
fn test_empty_root_falls_back_to_search_path() {
    let config = ToolchainConfig::default();
    let search = std::env::join_paths(["/first", "/second"]).unwrap();
    let locator = ToolchainLocator::new(&config, Some(search), Some(PathBuf::new()));
    assert_eq!(
        locator.search_dirs(),
        vec![PathBuf::from("/first"), PathBuf::from("/second")]
    );
}

#[test]
fn test_nothing_to_search() {
    let config = ToolchainConfig::default();
    let locator = ToolchainLocator::new(&config, None, None);
    assert!(locator.search_dirs().is_empty());

    let err = locator
        .locate(Tool::Assembler, &default_assembler())
        .unwrap_err();
    assert!(matches!(err, HarnessError::ToolNotFound { .. }), "{err:?}");
}

#[test]
fn test_not_found_names_both_remedies() {
    let dir = tempfile::tempdir().unwrap();
    let config = ToolchainConfig::default();
    let locator = ToolchainLocator::new(&config, Some(dir.path().as_os_str().to_owned()), None);

    let err = locator
        .locate(Tool::Disassembler, &default_disassembler())
        .unwrap_err();
    assert!(err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("disassembler"), "{message}");
    assert!(message.contains("PATH"), "{message}");
    assert!(message.contains("RISCV"), "{message}");
}

#[cfg(unix)]
mod on_disk {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::tools::{ASSEMBLER_NAME, OBJDUMP_NAME};
    use crate::common::write_file;

    fn executable(path: &Path) {
        write_file(path, "#!/bin/sh\n");
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_locates_under_toolchain_root_bin() {
        let root = tempfile::tempdir().unwrap();
        let assembler = root.path().join("bin").join(ASSEMBLER_NAME);
        let objdump = root.path().join("bin").join(OBJDUMP_NAME);
        executable(&assembler);
        executable(&objdump);
        let config = ToolchainConfig::default();

        let paths = ToolchainLocator::new(&config, None, Some(root.path().to_path_buf()))
            .locate_toolchain(&config)
            .unwrap();
        assert_eq!(paths.assembler, assembler);
        assert_eq!(paths.disassembler, objdump);
    }

    #[test]
    fn test_root_shadows_search_path() {
        let root = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();
        executable(&root.path().join("bin").join(ASSEMBLER_NAME));
        executable(&path_dir.path().join(ASSEMBLER_NAME));
        let config = ToolchainConfig::default();

        let found = ToolchainLocator::new(
            &config,
            Some(path_dir.path().as_os_str().to_owned()),
            Some(root.path().to_path_buf()),
        )
        .locate(Tool::Assembler, &default_assembler())
        .unwrap();
        assert!(found.starts_with(root.path()), "{}", found.display());
    }

    #[test]
    fn test_first_search_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        executable(&first.path().join("riscv64-unknown-elf-as"));
        executable(&second.path().join("riscv32-unknown-elf-as"));
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();
        let config = ToolchainConfig::default();

        let found = ToolchainLocator::new(&config, Some(search), None)
            .locate(Tool::Assembler, &default_assembler())
            .unwrap();
        assert_eq!(found, first.path().join("riscv64-unknown-elf-as"));
    }

    #[test]
    fn test_smallest_name_wins_within_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        executable(&dir.path().join("riscv64-unknown-elf-as"));
        executable(&dir.path().join("riscv32-unknown-elf-as"));
        let config = ToolchainConfig::default();

        let found = ToolchainLocator::new(&config, Some(dir.path().as_os_str().to_owned()), None)
            .locate(Tool::Assembler, &default_assembler())
            .unwrap();
        assert_eq!(found, dir.path().join("riscv32-unknown-elf-as"));
    }

    #[test]
    fn test_non_executable_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join(ASSEMBLER_NAME), "not a program\n");
        let config = ToolchainConfig::default();

        let err = ToolchainLocator::new(&config, Some(dir.path().as_os_str().to_owned()), None)
            .locate(Tool::Assembler, &default_assembler())
            .unwrap_err();
        assert!(matches!(err, HarnessError::ToolNotFound { .. }), "{err:?}");
    }

    #[test]
    fn test_substring_configuration() {
        let dir = tempfile::tempdir().unwrap();
        executable(&dir.path().join("my-custom-as"));
        executable(&dir.path().join("my-custom-objdump"));
        let config = ToolchainConfig {
            assembler: PatternSpec::Substring("custom-as".to_string()),
            disassembler: PatternSpec::Substring("custom-objdump".to_string()),
            ..ToolchainConfig::default()
        };

        let paths = ToolchainLocator::new(&config, Some(dir.path().as_os_str().to_owned()), None)
            .locate_toolchain(&config)
            .unwrap();
        assert_eq!(paths.assembler, dir.path().join("my-custom-as"));
        assert_eq!(paths.disassembler, dir.path().join("my-custom-objdump"));
    }
}
