//! Disassembly listing parser.
//!
//! Extracts `(address, encoding)` pairs from the textual output of `objdump -d`. The external
//! disassembly is treated as the ground truth for instruction encodings; nothing here decodes or
//! encodes instructions.
//!
//! A line is kept when it has the shape
//!
//! ```text
//! [whitespace] <hex address>[:] <whitespace> <8 hex digits> [<whitespace> <ignored text>]
//! ```
//!
//! Everything else (blank lines, the file header, section headers, `<label>:` lines, 16-bit
//! compressed encodings) is skipped without an error.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::OnceLock;

use regex::Regex;

use crate::common::constants::IMAGE_SEPARATOR;

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([0-9A-Fa-f]+):?\s+([0-9A-Fa-f]{8})(?:\s.*)?$")
            .unwrap_or_else(|e| unreachable!("static disassembly pattern: {e}"))
    })
}

/// One instruction taken from a disassembly listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The address field exactly as the disassembler printed it, without the colon.
    pub address: String,
    /// The 32-bit instruction word.
    pub encoding: u32,
}

impl fmt::Display for Instruction {
    /// Formats the instruction as a memory-image line (without the newline),
    /// e.g. `1004:   00a50513`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{IMAGE_SEPARATOR}{:08x}", self.address, self.encoding)
    }
}

/// Parses one disassembly line, returning `None` for lines that are not instructions.
pub fn parse_line(line: &str) -> Option<Instruction> {
    let caps = line_pattern().captures(line)?;
    let address = caps.get(1)?.as_str().to_string();
    let encoding = u32::from_str_radix(caps.get(2)?.as_str(), 16).ok()?;
    Some(Instruction { address, encoding })
}

/// Lazy, single-pass sequence of the instructions in a disassembly listing.
///
/// Reading restarts only by opening the source again. I/O errors are yielded as items; lines that
/// are not instructions are never yielded.
#[derive(Debug)]
pub struct DisassemblyLines<R> {
    reader: R,
    buf: String,
    skipped: usize,
}

impl<R: BufRead> DisassemblyLines<R> {
    /// Wraps a reader positioned at the start of a listing.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            skipped: 0,
        }
    }

    /// Number of non-instruction lines skipped so far.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for DisassemblyLines<R> {
    type Item = io::Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    if let Some(instruction) = parse_line(line) {
                        return Some(Ok(instruction));
                    }
                    self.skipped += 1;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
