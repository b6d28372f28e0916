//! Harness-wide constants.
//!
//! This module defines the fixed names shared by the path derivation, the generator and the
//! toolchain invocation. It includes:
//! 1. **Layout Constants:** Directory names below a category root.
//! 2. **Extension Constants:** File extensions of inputs and generated artifacts.
//! 3. **Invocation Constants:** Command-line flags of the external tools.

/// Directory below a category that holds every test resource.
pub const RESOURCES_DIR: &str = "testResources";

/// Assembly sources, object files and disassembly listings.
pub const ASSEMBLY_DIR: &str = "assembly";

/// Generated memory images.
pub const IMAGE_DIR: &str = "memImages";

/// Golden results.
pub const EXPECTED_DIR: &str = "expected";

/// Simulator dumps.
pub const RESULTS_DIR: &str = "results";

/// Extension identifying an assembly source; the generator discovers tests by it.
pub const ASSEMBLY_EXTENSION: &str = "s";

/// Extension of the assembler's object output.
pub const OBJECT_EXTENSION: &str = "out";

/// Extension of the disassembly listing.
pub const DISASSEMBLY_EXTENSION: &str = "dis";

/// Extension of the memory image.
pub const IMAGE_EXTENSION: &str = "mem";

/// Extension of both expected and actual results.
pub const RESULT_EXTENSION: &str = "txt";

/// Disassembler flag selecting a full disassembly of executable sections.
pub const DISASSEMBLE_FLAG: &str = "-d";

/// Simulator flag naming the file the final machine state is written to.
pub const DUMP_TO_FLAG: &str = "--dump-to";

/// Simulator flag suppressing the interactive register display.
pub const QUIET_FLAG: &str = "--quiet";

/// Simulator flag carrying the working-memory size.
pub const MEMORY_SIZE_FLAG: &str = "-s";

/// Separator written between address and encoding in a memory-image line.
pub const IMAGE_SEPARATOR: &str = ":   ";
