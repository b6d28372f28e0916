//! Memory images.
//!
//! This module turns assembly sources into the plain-text images the simulator loads:
//! 1. **Builder:** Drives the assembler and disassembler and writes the image.
//! 2. **Disassembly:** Extracts address/encoding pairs from an objdump listing.

/// Assembling, disassembling and writing images.
pub mod builder;

/// Disassembly listing parser.
pub mod disasm;

pub use builder::{BuiltImage, ImageBuilder, write_memory_image};
pub use disasm::{DisassemblyLines, Instruction, parse_line};
