//! Simulator invocation.
//!
//! Runs `<simulator> <image> --dump-to <result> [--quiet] [-s <memory-size>]` and waits for it.
//! The exit status is logged and otherwise ignored: the simulator returns the emulated program's
//! own exit code, and correctness is judged only by the dump it writes.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::common::constants::{DUMP_TO_FLAG, MEMORY_SIZE_FLAG, QUIET_FLAG};
use crate::common::{FileRole, HarnessError, Result, Tool};
use crate::config::HarnessConfig;
use crate::process;

/// Launches the simulator under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatorInvoker {
    program: PathBuf,
    quiet: bool,
    memory_size: Option<u32>,
    timeout: Option<Duration>,
}

impl SimulatorInvoker {
    /// Creates an invoker for the simulator at `program` with default options.
    pub const fn new(program: PathBuf) -> Self {
        Self {
            program,
            quiet: true,
            memory_size: None,
            timeout: None,
        }
    }

    /// Creates an invoker from the simulator section of `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            program: config.simulator_path(),
            quiet: config.simulator.quiet,
            memory_size: config.simulator.memory_size,
            timeout: config.simulator.timeout(),
        }
    }

    /// Sets whether `--quiet` is passed.
    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sets the `-s` working-memory size.
    #[must_use]
    pub const fn memory_size(mut self, size: Option<u32>) -> Self {
        self.memory_size = size;
        self
    }

    /// Sets the deadline after which the simulator is killed.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The simulator executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed after the program name.
    pub fn args(&self, image: &Path, result: &Path) -> Vec<OsString> {
        let mut args = vec![
            image.as_os_str().to_owned(),
            OsString::from(DUMP_TO_FLAG),
            result.as_os_str().to_owned(),
        ];
        if self.quiet {
            args.push(OsString::from(QUIET_FLAG));
        }
        if let Some(size) = self.memory_size {
            args.push(OsString::from(MEMORY_SIZE_FLAG));
            args.push(OsString::from(size.to_string()));
        }
        args
    }

    /// Runs the simulator on `image`, asking it to dump its final state to `result`.
    ///
    /// Any stale `result` from an earlier run is removed first so that a simulator which dies
    /// before dumping cannot be judged against old output.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the simulator has exited, whatever its status; `Spawn` or `Timeout` otherwise.
    pub fn invoke(&self, image: &Path, result: &Path) -> Result<()> {
        prepare_result(result)?;
        let finished = process::run(
            Command::new(&self.program)
                .args(self.args(image, result))
                .stdout(Stdio::null()),
            Tool::Simulator,
            self.timeout,
        )?;
        if !finished.status.success() {
            tracing::debug!(
                status = %finished.status,
                stderr = %finished.stderr.trim_end(),
                "simulator exit status ignored"
            );
        }
        Ok(())
    }
}

fn prepare_result(result: &Path) -> Result<()> {
    let write_error = |path: &Path, source| HarnessError::FileWrite {
        role: FileRole::Actual,
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = result.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;
    }
    match fs::remove_file(result) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(write_error(result, e)),
        _ => Ok(()),
    }
}
