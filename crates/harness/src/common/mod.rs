//! Common types and constants used throughout the harness.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Constants:** Directory layout, file extensions and external-tool flags.
//! 2. **Error Handling:** The harness error type and its run/test scoping.
//! 3. **Paths:** Deterministic derivation of a test's artifact paths.

/// Directory layout, extensions and tool flags.
pub mod constants;

/// Error types.
pub mod error;

/// Per-test path derivation.
pub mod paths;

pub use error::{ErrorScope, FileRole, HarnessError, Result, Tool};
pub use paths::TestPaths;
