//! External toolchain discovery.
//!
//! The assembler and disassembler are found by file name, either under a toolchain root or along
//! a search path. See [`locator`] for the precedence rules.

/// Pattern matching and directory search for toolchain executables.
pub mod locator;

pub use locator::{ToolPattern, ToolchainLocator, ToolchainPaths};
