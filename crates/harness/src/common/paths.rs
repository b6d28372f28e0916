//! Derived artifact paths for a single test.
//!
//! Every file a test touches is a pure function of `(root, category, name)`:
//!
//! ```text
//! <root>/<category>/testResources/assembly/<name>.s
//! <root>/<category>/testResources/assembly/<name>.out
//! <root>/<category>/testResources/assembly/<name>.dis
//! <root>/<category>/testResources/memImages/<name>.mem
//! <root>/<category>/testResources/expected/<name>.txt
//! <root>/<category>/testResources/results/<name>.txt
//! ```

use std::path::{Path, PathBuf};

use super::constants::{
    ASSEMBLY_DIR, ASSEMBLY_EXTENSION, DISASSEMBLY_EXTENSION, EXPECTED_DIR, IMAGE_DIR,
    IMAGE_EXTENSION, OBJECT_EXTENSION, RESOURCES_DIR, RESULT_EXTENSION, RESULTS_DIR,
};

/// The six files belonging to one test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestPaths {
    /// Assembly source, hand-written.
    pub source: PathBuf,
    /// Object file written by the assembler.
    pub object: PathBuf,
    /// Disassembly text written by the disassembler.
    pub disassembly: PathBuf,
    /// Memory image handed to the simulator.
    pub image: PathBuf,
    /// Golden result, hand-written.
    pub expected: PathBuf,
    /// Dump written by the simulator.
    pub result: PathBuf,
}

impl TestPaths {
    /// Computes the paths for `name` in `category` under `root`.
    pub fn new(root: &Path, category: &str, name: &str) -> Self {
        let resources = category_resources(root, category);
        let assembly = resources.join(ASSEMBLY_DIR);
        Self {
            source: assembly.join(format!("{name}.{ASSEMBLY_EXTENSION}")),
            object: assembly.join(format!("{name}.{OBJECT_EXTENSION}")),
            disassembly: assembly.join(format!("{name}.{DISASSEMBLY_EXTENSION}")),
            image: resources
                .join(IMAGE_DIR)
                .join(format!("{name}.{IMAGE_EXTENSION}")),
            expected: resources
                .join(EXPECTED_DIR)
                .join(format!("{name}.{RESULT_EXTENSION}")),
            result: resources
                .join(RESULTS_DIR)
                .join(format!("{name}.{RESULT_EXTENSION}")),
        }
    }

    /// Files the harness generates, in the order they are produced.
    ///
    /// The source and the expected result are never included: they are inputs.
    pub fn generated(&self) -> [&Path; 4] {
        [&self.object, &self.disassembly, &self.image, &self.result]
    }
}

/// `<root>/<category>/testResources`.
pub fn category_resources(root: &Path, category: &str) -> PathBuf {
    root.join(category).join(RESOURCES_DIR)
}

/// Directory scanned for a category's assembly sources.
pub fn assembly_dir(root: &Path, category: &str) -> PathBuf {
    category_resources(root, category).join(ASSEMBLY_DIR)
}
