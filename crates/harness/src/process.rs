//! External process execution.
//!
//! Every external tool (assembler, disassembler, simulator) is launched through [`run`]: stdin is
//! closed, stderr is captured for error reports, and an optional deadline bounds the wait. The
//! caller decides where stdout goes before handing the command over.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::common::{HarnessError, Result, Tool};

/// How often a child with a deadline is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of a process that ran to completion.
#[derive(Debug)]
pub(crate) struct Finished {
    /// Exit status reported by the OS.
    pub status: ExitStatus,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

/// Runs `cmd` to completion.
///
/// # Arguments
///
/// * `cmd` - The fully configured command; stdout must already be set by the caller.
/// * `tool` - Which tool this is, for logging and errors.
/// * `timeout` - Kill the child if it is still running after this long.
///
/// # Returns
///
/// The exit status and stderr, `Spawn` if the program could not be started or waited on, or
/// `Timeout` if the deadline passed.
pub(crate) fn run(cmd: &mut Command, tool: Tool, timeout: Option<Duration>) -> Result<Finished> {
    let program = PathBuf::from(cmd.get_program());
    tracing::debug!(%tool, command = ?cmd, "spawning");

    let spawn_error = |source| HarnessError::Spawn {
        tool,
        program: program.clone(),
        source,
    };

    let mut child = cmd
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    let stderr = child.stderr.take();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });

    let status = match timeout {
        None => child.wait().map_err(spawn_error)?,
        Some(limit) => match wait_until(&mut child, limit).map_err(spawn_error)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                // The reader is left detached and its stderr dropped: a grandchild may still
                // hold the pipe open.
                tracing::warn!(%tool, ?limit, "killed after timeout");
                return Err(HarnessError::Timeout {
                    tool,
                    timeout: limit,
                });
            }
        },
    };

    let stderr = reader.join().unwrap_or_default();
    tracing::debug!(%tool, %status, "finished");
    Ok(Finished {
        status,
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

/// Runs `cmd` and treats a non-zero exit as [`HarnessError::ProcessFailed`].
pub(crate) fn run_checked(cmd: &mut Command, tool: Tool, timeout: Option<Duration>) -> Result<()> {
    let finished = run(cmd, tool, timeout)?;
    if finished.status.success() {
        Ok(())
    } else {
        Err(HarnessError::ProcessFailed {
            tool,
            status: finished.status,
            stderr: finished.stderr,
        })
    }
}

/// Polls `child` until it exits or `limit` elapses; `Ok(None)` means the deadline passed.
///
/// A limit too large to represent as an [`Instant`] waits without a deadline.
fn wait_until(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = Instant::now().checked_add(limit) else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
