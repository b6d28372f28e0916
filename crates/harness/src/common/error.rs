//! Harness error definitions.
//!
//! This module defines the single error type returned by every fallible harness operation. It provides:
//! 1. **Error Representation:** One variant per failure category (missing tools, file access, external processes).
//! 2. **Scoping:** Whether a failure invalidates the whole run or only the test that hit it.
//! 3. **Error Handling:** Integration with `std::error::Error` through `thiserror`, with sources chained.
//!
//! Comparison mismatches and skipped disassembly lines are deliberately absent: a mismatch is an
//! ordinary [`ComparisonResult`](crate::compare::ComparisonResult) and a skipped line is a filter.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// External programs the harness launches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    /// The architecture's assembler (e.g. `riscv64-unknown-elf-as`).
    Assembler,
    /// The architecture's disassembler (e.g. `riscv64-unknown-elf-objdump`).
    Disassembler,
    /// The instruction-set simulator under test.
    Simulator,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assembler => write!(f, "assembler"),
            Self::Disassembler => write!(f, "disassembler"),
            Self::Simulator => write!(f, "simulator"),
        }
    }
}

/// Files the harness reads or writes for a single test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Assembly source (`.s`).
    Source,
    /// Object file produced by the assembler (`.out`).
    Object,
    /// Textual disassembly produced by the disassembler (`.dis`).
    Disassembly,
    /// Memory image consumed by the simulator (`.mem`).
    MemoryImage,
    /// Golden result the simulator dump is checked against.
    Expected,
    /// Dump written by the simulator.
    Actual,
    /// Harness configuration file.
    Config,
    /// Generated test-suite listing.
    Suite,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "assembly source",
            Self::Object => "object",
            Self::Disassembly => "disassembly",
            Self::MemoryImage => "memory image",
            Self::Expected => "expected result",
            Self::Actual => "simulator result",
            Self::Config => "config",
            Self::Suite => "generated suite",
        };
        f.write_str(name)
    }
}

/// How far a failure reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorScope {
    /// Nothing else in the run can succeed; stop and report the remedy.
    Run,
    /// Only the test that produced the error is affected.
    Test,
}

/// Errors produced by the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// No executable matching the pattern exists in the searched directories.
    #[error(
        "could not find the {tool} (pattern `{pattern}`) in {searched}.\n\
         Install a RISC-V GNU toolchain and either export {search_var}=<toolchain>/bin:${search_var} \
         or export {root_var}=<toolchain install dir>"
    )]
    ToolNotFound {
        /// Which tool was being located.
        tool: Tool,
        /// The pattern file names were matched against.
        pattern: String,
        /// Human-readable description of what was searched.
        searched: String,
        /// Name of the search-path variable.
        search_var: String,
        /// Name of the toolchain-root variable.
        root_var: String,
    },

    /// A configured tool pattern is not a valid regular expression.
    #[error("invalid tool pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The harness configuration file could not be parsed.
    #[error("invalid harness config {}", .path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A file could not be opened.
    #[error("could not open {role} file {}", .path.display())]
    FileOpen {
        /// What the file is for.
        role: FileRole,
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file was opened but reading it failed part-way.
    #[error("could not read {role} file {}", .path.display())]
    FileRead {
        /// What the file is for.
        role: FileRole,
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file or its parent directory could not be written.
    #[error("could not write {role} file {}", .path.display())]
    FileWrite {
        /// What the file is for.
        role: FileRole,
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An external program could not be started.
    #[error("failed to launch the {tool} ({})", .program.display())]
    Spawn {
        /// Which tool was being launched.
        tool: Tool,
        /// The executable path.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An external program finished unsuccessfully.
    #[error("the {tool} exited with {status}{}", format_stderr(.stderr))]
    ProcessFailed {
        /// Which tool failed.
        tool: Tool,
        /// The exit status reported by the OS.
        status: ExitStatus,
        /// Whatever the tool wrote to stderr.
        stderr: String,
    },

    /// An external program ran past its deadline and was killed.
    ///
    /// Whatever the program wrote to stderr is discarded.
    #[error("the {tool} did not finish within {}s and was killed", .timeout.as_secs_f64())]
    Timeout {
        /// Which tool hung.
        tool: Tool,
        /// The configured deadline.
        timeout: Duration,
    },

    /// The disassembly contained no recognizable instruction lines.
    #[error("disassembly {} contains no instructions; did the assembler run?", .path.display())]
    EmptyDisassembly {
        /// Path of the disassembly file.
        path: PathBuf,
    },

    /// A test name or category cannot be turned into file paths.
    #[error("invalid test identifier `{category}/{name}`: {reason}")]
    InvalidTestName {
        /// Category of the rejected test.
        category: String,
        /// Name of the rejected test.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Two assembly files map to the same generated test function.
    #[error("assembly files `{first}.s` and `{second}.s` both generate the test function `{ident}`")]
    DuplicateTestName {
        /// First stem.
        first: String,
        /// Second stem.
        second: String,
        /// The shared identifier.
        ident: String,
    },
}

impl HarnessError {
    /// Returns whether this error ends the whole run or just the current test.
    ///
    /// An unreadable configuration file is run-scoped like an unparsable one.
    pub const fn scope(&self) -> ErrorScope {
        match self {
            Self::ToolNotFound { .. }
            | Self::InvalidPattern { .. }
            | Self::Config { .. }
            | Self::DuplicateTestName { .. }
            | Self::FileOpen {
                role: FileRole::Config,
                ..
            }
            | Self::FileRead {
                role: FileRole::Config,
                ..
            } => ErrorScope::Run,
            Self::FileOpen { .. }
            | Self::FileRead { .. }
            | Self::FileWrite { .. }
            | Self::Spawn { .. }
            | Self::ProcessFailed { .. }
            | Self::Timeout { .. }
            | Self::EmptyDisassembly { .. }
            | Self::InvalidTestName { .. } => ErrorScope::Test,
        }
    }

    /// Shorthand for `scope() == ErrorScope::Run`.
    pub fn is_fatal(&self) -> bool {
        self.scope() == ErrorScope::Run
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

/// Result alias used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;
