//! Memory-image construction.
//!
//! Turns an assembly source into the text image the simulator loads. It performs:
//! 1. **Assembly:** `<as> -march=<isa> -mabi=<abi> <name>.s -o <name>.out`.
//! 2. **Disassembly:** `<objdump> -d <name>.out > <name>.dis`.
//! 3. **Extraction:** One `<address>:   <encoding>` line per instruction of the listing, in order.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::common::constants::DISASSEMBLE_FLAG;
use crate::common::{FileRole, HarnessError, Result, TestPaths, Tool};
use crate::config::ToolchainConfig;
use crate::image::disasm::DisassemblyLines;
use crate::process;
use crate::toolchain::ToolchainPaths;

/// A freshly written memory image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltImage {
    /// Where the image was written.
    pub path: PathBuf,
    /// Number of instruction lines it holds.
    pub instructions: usize,
}

/// Drives the external toolchain for one run.
#[derive(Debug)]
pub struct ImageBuilder<'a> {
    toolchain: &'a ToolchainPaths,
    march: &'a str,
    mabi: &'a str,
    timeout: Option<Duration>,
}

impl<'a> ImageBuilder<'a> {
    /// Creates a builder over resolved tool paths and the assembler options in `config`.
    pub fn new(toolchain: &'a ToolchainPaths, config: &'a ToolchainConfig) -> Self {
        Self {
            toolchain,
            march: &config.march,
            mabi: &config.mabi,
            timeout: config.timeout(),
        }
    }

    /// Assembles, disassembles and extracts the memory image for one test.
    ///
    /// # Arguments
    ///
    /// * `paths` - The test's derived paths; `source` is read, the other artifacts are written.
    ///
    /// # Returns
    ///
    /// The image path and instruction count, or the first failing step's error.
    pub fn build(&self, paths: &TestPaths) -> Result<BuiltImage> {
        self.assemble(&paths.source, &paths.object)?;
        self.disassemble(&paths.object, &paths.disassembly)?;
        let instructions = write_memory_image(&paths.disassembly, &paths.image)?;
        tracing::debug!(image = %paths.image.display(), instructions, "memory image written");
        Ok(BuiltImage {
            path: paths.image.clone(),
            instructions,
        })
    }

    /// Runs the assembler on `source`, writing `object`.
    pub fn assemble(&self, source: &Path, object: &Path) -> Result<()> {
        if !source.is_file() {
            return Err(HarnessError::FileOpen {
                role: FileRole::Source,
                path: source.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        ensure_parent(object, FileRole::Object)?;
        process::run_checked(
            Command::new(&self.toolchain.assembler)
                .arg(format!("-march={}", self.march))
                .arg(format!("-mabi={}", self.mabi))
                .arg(source)
                .arg("-o")
                .arg(object)
                .stdout(Stdio::null()),
            Tool::Assembler,
            self.timeout,
        )
    }

    /// Runs the disassembler on `object`, redirecting its listing to `disassembly`.
    pub fn disassemble(&self, object: &Path, disassembly: &Path) -> Result<()> {
        ensure_parent(disassembly, FileRole::Disassembly)?;
        let listing = File::create(disassembly).map_err(|source| HarnessError::FileWrite {
            role: FileRole::Disassembly,
            path: disassembly.to_path_buf(),
            source,
        })?;
        process::run_checked(
            Command::new(&self.toolchain.disassembler)
                .arg(DISASSEMBLE_FLAG)
                .arg(object)
                .stdout(listing),
            Tool::Disassembler,
            self.timeout,
        )
    }
}

/// Extracts the instructions of a disassembly listing into a memory-image file.
///
/// # Arguments
///
/// * `disassembly` - Listing produced by `objdump -d`.
/// * `image` - Destination; created or truncated.
///
/// # Returns
///
/// The number of instruction lines written. A listing without a single instruction is
/// `EmptyDisassembly`: that is what a silently failed assembler leaves behind.
pub fn write_memory_image(disassembly: &Path, image: &Path) -> Result<usize> {
    let listing = File::open(disassembly).map_err(|source| HarnessError::FileOpen {
        role: FileRole::Disassembly,
        path: disassembly.to_path_buf(),
        source,
    })?;
    ensure_parent(image, FileRole::MemoryImage)?;
    let write_error = |source| HarnessError::FileWrite {
        role: FileRole::MemoryImage,
        path: image.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(image).map_err(write_error)?);

    let mut lines = DisassemblyLines::new(BufReader::new(listing));
    let mut count = 0;
    for instruction in lines.by_ref() {
        let instruction = instruction.map_err(|source| HarnessError::FileRead {
            role: FileRole::Disassembly,
            path: disassembly.to_path_buf(),
            source,
        })?;
        writeln!(out, "{instruction}").map_err(write_error)?;
        count += 1;
    }
    out.flush().map_err(write_error)?;
    tracing::trace!(skipped = lines.skipped(), "non-instruction lines dropped");

    if count == 0 {
        return Err(HarnessError::EmptyDisassembly {
            path: disassembly.to_path_buf(),
        });
    }
    Ok(count)
}

fn ensure_parent(path: &Path, role: FileRole) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| HarnessError::FileWrite {
                role,
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
