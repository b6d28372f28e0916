//! Run context.
//!
//! A [`Harness`] is one resolved configuration plus one resolved toolchain. It is built once per
//! run and shared read-only by every [`TestCase`] it hands out.

use crate::case::TestCase;
use crate::common::Result;
use crate::compare::ResultComparator;
use crate::config::HarnessConfig;
use crate::image::ImageBuilder;
use crate::sim::SimulatorInvoker;
use crate::toolchain::{ToolchainLocator, ToolchainPaths};

/// Shared state of one harness run.
#[derive(Clone, Debug)]
pub struct Harness {
    config: HarnessConfig,
    toolchain: ToolchainPaths,
}

impl Harness {
    /// Combines an already resolved configuration and toolchain.
    pub const fn new(config: HarnessConfig, toolchain: ToolchainPaths) -> Self {
        Self { config, toolchain }
    }

    /// Locates the toolchain from the environment variables named in `config`.
    ///
    /// # Returns
    ///
    /// The harness, or `ToolNotFound`/`InvalidPattern` when the toolchain cannot be resolved.
    pub fn from_config(config: HarnessConfig) -> Result<Self> {
        let toolchain =
            ToolchainLocator::from_env(&config.toolchain).locate_toolchain(&config.toolchain)?;
        Ok(Self::new(config, toolchain))
    }

    /// Loads [`HarnessConfig::from_env`] and locates the toolchain.
    pub fn from_env() -> Result<Self> {
        Self::from_config(HarnessConfig::from_env()?)
    }

    /// The configuration in force.
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The resolved toolchain.
    pub const fn toolchain(&self) -> &ToolchainPaths {
        &self.toolchain
    }

    /// Creates the test `name` of `category`.
    pub fn case(&self, category: &str, name: &str) -> Result<TestCase<'_>> {
        TestCase::new(self, category, name)
    }

    /// An image builder over this run's toolchain.
    pub fn image_builder(&self) -> ImageBuilder<'_> {
        ImageBuilder::new(&self.toolchain, &self.config.toolchain)
    }

    /// A simulator invoker configured for this run.
    pub fn simulator(&self) -> SimulatorInvoker {
        SimulatorInvoker::from_config(&self.config)
    }

    /// A comparator with this run's length policy.
    pub const fn comparator(&self) -> ResultComparator {
        ResultComparator::new(self.config.length_policy)
    }
}
