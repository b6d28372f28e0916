//! Toolchain discovery.
//!
//! Resolves the assembler and disassembler executables with one algorithm:
//! 1. **Directories:** `$RISCV` and `$RISCV/bin` when the toolchain-root variable is set, otherwise
//!    every entry of the search-path variable, in order.
//! 2. **Matching:** Executable files in each directory whose *file name* matches the pattern; the
//!    lexicographically smallest match in the first directory with any match wins.
//! 3. **Failure:** No match anywhere is [`HarnessError::ToolNotFound`] with a remediation message.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::common::{HarnessError, Result, Tool};
use crate::config::{PatternSpec, ToolchainConfig};

/// A compiled file-name pattern.
#[derive(Clone, Debug)]
pub struct ToolPattern {
    source: String,
    regex: Regex,
}

impl ToolPattern {
    /// Matches any file name containing `text` verbatim.
    ///
    /// # Returns
    ///
    /// The compiled pattern, or `InvalidPattern` if `text` is too large to compile.
    pub fn substring(text: &str) -> Result<Self> {
        let regex = Self::regex(&regex::escape(text))?.regex;
        Ok(Self {
            source: text.to_string(),
            regex,
        })
    }

    /// Matches file names against a regular expression.
    ///
    /// # Returns
    ///
    /// The compiled pattern, or `InvalidPattern` if the expression does not compile.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| HarnessError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Compiles a pattern from its configuration form.
    pub fn from_spec(spec: &PatternSpec) -> Result<Self> {
        match spec {
            PatternSpec::Substring(text) => Self::substring(text),
            PatternSpec::Regex(pattern) => Self::regex(pattern),
        }
    }

    /// Returns whether `file_name` matches.
    pub fn is_match(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ToolPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Resolved locations of the external toolchain, shared read-only by a whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainPaths {
    /// Assembler executable.
    pub assembler: PathBuf,
    /// Disassembler executable.
    pub disassembler: PathBuf,
}

/// Searches directories for toolchain executables.
#[derive(Clone, Debug)]
pub struct ToolchainLocator {
    search_var: String,
    root_var: String,
    search_path: Option<OsString>,
    toolchain_root: Option<PathBuf>,
}

impl ToolchainLocator {
    /// Builds a locator from explicit values.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the variable names used in error messages.
    /// * `search_path` - Value of the search-path variable (delimited list of directories).
    /// * `toolchain_root` - Value of the toolchain-root variable; takes precedence when present.
    pub fn new(
        config: &ToolchainConfig,
        search_path: Option<OsString>,
        toolchain_root: Option<PathBuf>,
    ) -> Self {
        Self {
            search_var: config.search_var.clone(),
            root_var: config.root_var.clone(),
            search_path: search_path.filter(|p| !p.is_empty()),
            toolchain_root: toolchain_root.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Builds a locator from the variables named in `config`.
    pub fn from_env(config: &ToolchainConfig) -> Self {
        Self::new(
            config,
            env::var_os(&config.search_var),
            env::var_os(&config.root_var).map(PathBuf::from),
        )
    }

    /// Directories searched, in order.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        if let Some(root) = &self.toolchain_root {
            return vec![root.clone(), root.join("bin")];
        }
        self.search_path
            .as_ref()
            .map(|paths| env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()).collect())
            .unwrap_or_default()
    }

    /// Finds the first executable whose file name matches `pattern`.
    ///
    /// # Arguments
    ///
    /// * `tool` - Which tool is being looked up (for the error message).
    /// * `pattern` - File-name pattern.
    ///
    /// # Returns
    ///
    /// The executable path, or `ToolNotFound`.
    pub fn locate(&self, tool: Tool, pattern: &ToolPattern) -> Result<PathBuf> {
        for dir in self.search_dirs() {
            if let Some(found) = first_match(&dir, pattern) {
                tracing::debug!(%tool, path = %found.display(), "located tool");
                return Ok(found);
            }
        }
        Err(HarnessError::ToolNotFound {
            tool,
            pattern: pattern.to_string(),
            searched: self.describe_search(),
            search_var: self.search_var.clone(),
            root_var: self.root_var.clone(),
        })
    }

    /// Resolves both the assembler and the disassembler.
    pub fn locate_toolchain(&self, config: &ToolchainConfig) -> Result<ToolchainPaths> {
        let assembler = ToolPattern::from_spec(&config.assembler)?;
        let disassembler = ToolPattern::from_spec(&config.disassembler)?;
        Ok(ToolchainPaths {
            assembler: self.locate(Tool::Assembler, &assembler)?,
            disassembler: self.locate(Tool::Disassembler, &disassembler)?,
        })
    }

    fn describe_search(&self) -> String {
        match (&self.toolchain_root, &self.search_path) {
            (Some(root), _) => format!("${} ({})", self.root_var, root.display()),
            (None, Some(_)) => format!("the directories listed in ${}", self.search_var),
            (None, None) => format!("nothing (${} and ${} are both unset)", self.root_var, self.search_var),
        }
    }
}

fn first_match(dir: &Path, pattern: &ToolPattern) -> Option<PathBuf> {
    let mut hits: Vec<PathBuf> = which::which_re_in(&pattern.regex, Some(dir.as_os_str()))
        .ok()?
        .collect();
    hits.sort();
    hits.into_iter().next()
}
