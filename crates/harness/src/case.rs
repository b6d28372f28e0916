//! A single regression test.
//!
//! A [`TestCase`] ties one assembly program to its golden result and runs the pipeline:
//! 1. **Build:** Assemble, disassemble and extract the memory image (once, on the first run).
//! 2. **Invoke:** Run the simulator on the image, dumping its final state.
//! 3. **Compare:** Check the dump against the golden result and record the verdict.
//!
//! Generated artifacts are removed when a passing test case is dropped. A failing, erroring or
//! never-run test case leaves them in place for inspection.

use std::fmt;
use std::fs;
use std::io;

use crate::common::{HarnessError, Result, TestPaths};
use crate::compare::ComparisonResult;
use crate::harness::Harness;
use crate::image::BuiltImage;

/// Tri-state outcome of a test case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verdict {
    /// Not run yet.
    #[default]
    Unset,
    /// The dump matched the golden result.
    Pass,
    /// The dump did not match, or the pipeline failed.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "UNSET"),
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// One named test of one category.
#[derive(Debug)]
pub struct TestCase<'h> {
    harness: &'h Harness,
    category: String,
    name: String,
    paths: TestPaths,
    image: Option<BuiltImage>,
    verdict: Verdict,
}

impl<'h> TestCase<'h> {
    /// Creates the test and derives its paths. Nothing is built or run yet.
    ///
    /// # Arguments
    ///
    /// * `harness` - The run this test belongs to.
    /// * `category` - Category directory below the harness root.
    /// * `name` - Stem of the assembly source, expected result and generated files.
    ///
    /// # Returns
    ///
    /// The test case, or `InvalidTestName` when either identifier cannot name a file.
    pub fn new(harness: &'h Harness, category: &str, name: &str) -> Result<Self> {
        validate(category, name)?;
        Ok(Self {
            harness,
            category: category.to_string(),
            name: name.to_string(),
            paths: TestPaths::new(&harness.config().root, category, name),
            image: None,
            verdict: Verdict::Unset,
        })
    }

    /// Category of the test.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Name of the test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `category/name`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// The test's derived paths.
    pub const fn paths(&self) -> &TestPaths {
        &self.paths
    }

    /// The recorded outcome.
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Whether the last run passed.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Builds (or rebuilds) the memory image.
    pub fn build_image(&mut self) -> Result<&BuiltImage> {
        let built = self.harness.image_builder().build(&self.paths)?;
        Ok(&*self.image.insert(built))
    }

    /// Runs the pipeline and returns the full comparison.
    ///
    /// The image is built on the first call and reused afterwards. Any error marks the test as
    /// failed before it is returned.
    pub fn run_detailed(&mut self) -> Result<ComparisonResult> {
        match self.execute() {
            Ok(result) => {
                self.verdict = if result.passed {
                    Verdict::Pass
                } else {
                    Verdict::Fail
                };
                if !result.passed {
                    tracing::error!(test = %self.id(), "{result}");
                }
                Ok(result)
            }
            Err(e) => {
                self.verdict = Verdict::Fail;
                tracing::error!(test = %self.id(), error = %e, "test did not complete");
                Err(e)
            }
        }
    }

    /// Runs the pipeline and returns whether the test passed.
    pub fn run(&mut self) -> Result<bool> {
        self.run_detailed().map(|result| result.passed)
    }

    fn execute(&mut self) -> Result<ComparisonResult> {
        if self.image.is_none() {
            let _ = self.build_image()?;
        }
        self.harness
            .simulator()
            .invoke(&self.paths.image, &self.paths.result)?;
        self.harness
            .comparator()
            .compare(&self.paths.result, &self.paths.expected)
    }

    fn cleanup(&self) {
        for path in self.paths.generated() {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not remove artifact");
                }
            }
        }
    }
}

impl Drop for TestCase<'_> {
    fn drop(&mut self) {
        if self.verdict == Verdict::Pass && !self.harness.config().keep_artifacts {
            self.cleanup();
        }
    }
}

pub(crate) fn validate(category: &str, name: &str) -> Result<()> {
    let reject = |reason: &'static str| {
        Err(HarnessError::InvalidTestName {
            category: category.to_string(),
            name: name.to_string(),
            reason,
        })
    };
    for part in [category, name] {
        if part.is_empty() {
            return reject("identifiers must not be empty");
        }
        if part == "." || part == ".." {
            return reject("`.` and `..` are not test identifiers");
        }
        if part.contains(['/', '\\']) {
            return reject("identifiers must not contain path separators");
        }
    }
    Ok(())
}
