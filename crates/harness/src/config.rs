//! Configuration system for the harness.
//!
//! This module defines the one configuration value every component is built from. It provides:
//! 1. **Defaults:** Baseline tool patterns, target flags and directory locations.
//! 2. **Structures:** Hierarchical config for the simulator and the toolchain.
//! 3. **Loading:** JSON deserialization plus environment overrides applied at load time.
//!
//! Nothing below this module reads the environment; components receive their settings from a
//! [`HarnessConfig`] and never fall back to hardcoded paths of their own.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::{FileRole, HarnessError, Result};
use crate::compare::LengthPolicy;

/// Environment variable naming a JSON config file to start from.
pub const CONFIG_VAR: &str = "RVTEST_CONFIG";

/// Environment variable overriding [`HarnessConfig::root`].
pub const ROOT_VAR: &str = "RVTEST_ROOT";

/// Environment variable overriding [`SimulatorConfig::path`].
pub const SIMULATOR_VAR: &str = "RVTEST_SIMULATOR";

/// Default configuration constants for the harness.
///
/// These values apply whenever neither the config file nor the environment provides one.
mod defaults {
    /// Corpus root: the current directory.
    pub const ROOT: &str = ".";

    /// Simulator location relative to the corpus root (a release build of the simulator crate).
    pub const SIMULATOR_RELATIVE: &str = "target/release/riscv-sim";

    /// Variable holding the executable search path.
    pub const SEARCH_VAR: &str = "PATH";

    /// Variable holding a toolchain install directory; takes precedence over the search path.
    pub const ROOT_VAR: &str = "RISCV";

    /// Matches `riscv64-unknown-elf-as`, `riscv32-linux-gnu-as`, ...
    pub const ASSEMBLER_PATTERN: &str = r"^riscv(32|64)-[A-Za-z0-9_]+(-[A-Za-z0-9_]+)*-as(\.exe)?$";

    /// Matches `riscv64-unknown-elf-objdump`, `riscv32-linux-gnu-objdump`, ...
    pub const DISASSEMBLER_PATTERN: &str =
        r"^riscv(32|64)-[A-Za-z0-9_]+(-[A-Za-z0-9_]+)*-objdump(\.exe)?$";

    /// 32-bit base integer ISA only.
    pub const MARCH: &str = "rv32i";

    /// Integer-only 32-bit ABI.
    pub const MABI: &str = "ilp32";
}

/// Root configuration; use `HarnessConfig::default()`, [`HarnessConfig::load`] or
/// [`HarnessConfig::from_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Directory holding one sub-directory per test category.
    #[serde(default = "HarnessConfig::default_root")]
    pub root: PathBuf,

    /// Simulator location and invocation options.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Toolchain discovery and assembler options.
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Whether results of different lengths can pass.
    #[serde(default)]
    pub length_policy: LengthPolicy,

    /// Keep generated artifacts even for passing tests.
    #[serde(default)]
    pub keep_artifacts: bool,
}

impl HarnessConfig {
    /// Returns the default corpus root.
    fn default_root() -> PathBuf {
        PathBuf::from(defaults::ROOT)
    }

    /// Reads a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON file.
    ///
    /// # Returns
    ///
    /// The parsed configuration, or a `FileOpen`/`Config` error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::FileOpen {
            role: FileRole::Config,
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the configuration from the process environment.
    ///
    /// Starts from the file named by `RVTEST_CONFIG` (or the defaults), then applies
    /// `RVTEST_ROOT` and `RVTEST_SIMULATOR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Same as [`HarnessConfig::from_env`] with a caller-supplied variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let mut config = match non_empty(lookup(CONFIG_VAR)) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    /// Applies the root and simulator overrides; unset or empty variables leave values untouched.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<OsString>) {
        if let Some(root) = non_empty(lookup(ROOT_VAR)) {
            self.root = PathBuf::from(root);
        }
        if let Some(simulator) = non_empty(lookup(SIMULATOR_VAR)) {
            self.simulator.path = Some(PathBuf::from(simulator));
        }
    }

    /// Simulator executable: the configured path, or the release build below the root.
    pub fn simulator_path(&self) -> PathBuf {
        self.simulator
            .path
            .clone()
            .unwrap_or_else(|| self.root.join(defaults::SIMULATOR_RELATIVE))
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            simulator: SimulatorConfig::default(),
            toolchain: ToolchainConfig::default(),
            length_policy: LengthPolicy::default(),
            keep_artifacts: false,
        }
    }
}

/// How the simulator is launched.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Simulator executable; `None` means `<root>/target/release/riscv-sim`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pass `--quiet` so the simulator skips its live register display.
    #[serde(default = "SimulatorConfig::default_quiet")]
    pub quiet: bool,

    /// Working-memory size passed with `-s`; omitted when `None`.
    #[serde(default)]
    pub memory_size: Option<u32>,

    /// Kill the simulator after this many seconds; `None` waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl SimulatorConfig {
    /// Quiet output is the default: the harness only reads the dump file.
    fn default_quiet() -> bool {
        true
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            path: None,
            quiet: Self::default_quiet(),
            memory_size: None,
            timeout_secs: None,
        }
    }
}

/// A file-name pattern as written in the configuration.
///
/// In JSON this is `{"regex": "..."}` or `{"substring": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSpec {
    /// File name must contain this text.
    Substring(String),
    /// File name must match this regular expression.
    Regex(String),
}

/// Where the toolchain is searched for and how sources are assembled.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainConfig {
    /// Name of the search-path variable.
    #[serde(default = "ToolchainConfig::default_search_var")]
    pub search_var: String,

    /// Name of the toolchain-root variable.
    #[serde(default = "ToolchainConfig::default_root_var")]
    pub root_var: String,

    /// Pattern selecting the assembler.
    #[serde(default = "ToolchainConfig::default_assembler")]
    pub assembler: PatternSpec,

    /// Pattern selecting the disassembler.
    #[serde(default = "ToolchainConfig::default_disassembler")]
    pub disassembler: PatternSpec,

    /// Value of the assembler's `-march=` flag.
    #[serde(default = "ToolchainConfig::default_march")]
    pub march: String,

    /// Value of the assembler's `-mabi=` flag.
    #[serde(default = "ToolchainConfig::default_mabi")]
    pub mabi: String,

    /// Kill the assembler or disassembler after this many seconds; `None` waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ToolchainConfig {
    /// Returns the default search-path variable name.
    fn default_search_var() -> String {
        defaults::SEARCH_VAR.to_string()
    }

    /// Returns the default toolchain-root variable name.
    fn default_root_var() -> String {
        defaults::ROOT_VAR.to_string()
    }

    /// Returns the default assembler pattern.
    fn default_assembler() -> PatternSpec {
        PatternSpec::Regex(defaults::ASSEMBLER_PATTERN.to_string())
    }

    /// Returns the default disassembler pattern.
    fn default_disassembler() -> PatternSpec {
        PatternSpec::Regex(defaults::DISASSEMBLER_PATTERN.to_string())
    }

    /// Returns the default `-march` value.
    fn default_march() -> String {
        defaults::MARCH.to_string()
    }

    /// Returns the default `-mabi` value.
    fn default_mabi() -> String {
        defaults::MABI.to_string()
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            search_var: Self::default_search_var(),
            root_var: Self::default_root_var(),
            assembler: Self::default_assembler(),
            disassembler: Self::default_disassembler(),
            march: Self::default_march(),
            mabi: Self::default_mabi(),
            timeout_secs: None,
        }
    }
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}
