//! Regression-test harness for a RISC-V ISA simulator.
//!
//! Each test is an assembly program plus the register/memory dump the simulator must produce
//! for it. This crate runs that pipeline with the following:
//! 1. **Toolchain:** Locates a RISC-V cross assembler and objdump by file-name pattern.
//! 2. **Image:** Assembles and disassembles a program into the simulator's memory-image format.
//! 3. **Simulator:** Runs the simulator on the image and collects its state dump.
//! 4. **Comparison:** Checks the dump line by line against a golden result.
//! 5. **Generation:** Emits a Rust test listing with one test per assembly file.

/// A single test and its pass/fail lifecycle.
pub mod case;
/// Error types, file-layout constants and derived test paths.
pub mod common;
/// Dump-versus-golden comparison.
pub mod compare;
/// Harness configuration (defaults, JSON file, environment overrides).
pub mod config;
/// Test discovery and suite generation.
pub mod generate;
/// Shared run context.
pub mod harness;
/// Memory-image construction.
pub mod image;
mod process;
/// Simulator invocation.
pub mod sim;
/// Toolchain discovery.
pub mod toolchain;

pub use crate::case::{TestCase, Verdict};
pub use crate::common::{ErrorScope, HarnessError, Result, TestPaths, Tool};
pub use crate::compare::{ComparisonResult, LengthPolicy, ResultComparator};
/// Root configuration; use `HarnessConfig::from_env()` or load it from JSON.
pub use crate::config::HarnessConfig;
/// Run context; construct once with `Harness::from_env` and share across tests.
pub use crate::harness::Harness;
