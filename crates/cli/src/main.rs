//! RISC-V simulator regression harness CLI.
//!
//! This binary exposes the harness library as a command-line tool. It performs:
//! 1. **Run:** Build, simulate and compare the named tests (or a whole category) and summarize.
//! 2. **Build:** Produce one memory image without running the simulator.
//! 3. **Generate:** Write a Rust test listing with one test per assembly source.
//! 4. **Locate:** Show which assembler and disassembler the harness would use.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::{env, process};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rvtest_core::common::paths::assembly_dir;
use rvtest_core::generate;
use rvtest_core::{Harness, HarnessConfig, HarnessError, LengthPolicy};

/// Environment variable holding the log filter.
const LOG_VAR: &str = "RVTEST_LOG";

/// Filter used when `RVTEST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(
    name = "rvtest",
    author,
    version,
    about = "Regression harness for the RISC-V instruction-set simulator",
    long_about = "Assemble test programs, run them on the simulator and compare its dumps with golden results.\n\nTests live under <root>/<category>/testResources. The root comes from RVTEST_ROOT (default: the current directory) and the simulator from RVTEST_SIMULATOR.\n\nExamples:\n  rvtest run -c integer\n  rvtest run -c integer addi_basic --keep-artifacts\n  rvtest generate -c integer -o tests/generated_integer.rs\n  rvtest locate"
)]
struct Cli {
    /// JSON configuration file; overrides RVTEST_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run tests and compare the simulator's dumps with the golden results.
    Run {
        /// Category directory below the root.
        #[arg(short, long)]
        category: String,

        /// Tests to run; every assembly source in the category when omitted.
        names: Vec<String>,

        /// Keep generated artifacts of passing tests.
        #[arg(long)]
        keep_artifacts: bool,

        /// Fail tests whose dump and golden result differ in length.
        #[arg(long)]
        exact_length: bool,
    },

    /// Assemble one test and write its memory image.
    Build {
        /// Category directory below the root.
        #[arg(short, long)]
        category: String,

        /// Test name (assembly file stem).
        name: String,
    },

    /// Write a Rust test listing for a category.
    Generate {
        /// Category the generated tests belong to.
        #[arg(short, long)]
        category: String,

        /// Directory scanned for assembly sources; defaults to the category's assembly directory.
        #[arg(short, long)]
        assembly_dir: Option<PathBuf>,

        /// Listing to write.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the resolved assembler and disassembler.
    Locate,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).unwrap_or_else(|e| fail(&e));
    tracing::debug!(
        root = %config.root.display(),
        simulator = %config.simulator_path().display(),
        "configuration loaded"
    );
    let code = match cli.command {
        Commands::Run {
            category,
            names,
            keep_artifacts,
            exact_length,
        } => cmd_run(config, &category, &names, keep_artifacts, exact_length),
        Commands::Build { category, name } => cmd_build(config, &category, &name),
        Commands::Generate {
            category,
            assembly_dir,
            output,
        } => cmd_generate(&config, &category, assembly_dir, &output),
        Commands::Locate => cmd_locate(config),
    };
    process::exit(code);
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `--config` when given, otherwise whatever `RVTEST_CONFIG` names, then applies the
/// environment overrides.
fn load_config(path: Option<&Path>) -> Result<HarnessConfig, HarnessError> {
    match path {
        Some(path) => {
            let mut config = HarnessConfig::load(path)?;
            config.apply_overrides(|name| env::var_os(name));
            Ok(config)
        }
        None => HarnessConfig::from_env(),
    }
}

/// Runs the tests and prints one line per test plus a summary.
///
/// Returns the process exit code: 0 if every test passed, 1 otherwise.
fn cmd_run(
    mut config: HarnessConfig,
    category: &str,
    names: &[String],
    keep_artifacts: bool,
    exact_length: bool,
) -> i32 {
    config.keep_artifacts |= keep_artifacts;
    if exact_length {
        config.length_policy = LengthPolicy::Exact;
    }
    let harness = Harness::from_config(config).unwrap_or_else(|e| fail(&e));

    let names = if names.is_empty() {
        let dir = assembly_dir(&harness.config().root, category);
        generate::discover(&dir).unwrap_or_else(|e| fail(&e))
    } else {
        names.to_vec()
    };
    if names.is_empty() {
        eprintln!("no tests found in category `{category}`");
        return 1;
    }

    let (mut passed, mut failed, mut errored) = (0_usize, 0_usize, 0_usize);
    for name in &names {
        let outcome = harness
            .case(category, name)
            .and_then(|mut case| case.run_detailed());
        match outcome {
            Ok(result) if result.passed => {
                passed += 1;
                println!("PASS  {category}/{name}");
            }
            Ok(result) => {
                failed += 1;
                println!("FAIL  {category}/{name}: {result}");
            }
            Err(e) if e.is_fatal() => fail(&e),
            Err(e) => {
                errored += 1;
                println!("ERROR {category}/{name}: {}", report(&e));
            }
        }
    }

    println!();
    println!(
        "{} tests: {passed} passed, {failed} failed, {errored} errored",
        names.len()
    );
    i32::from(failed + errored > 0)
}

fn cmd_build(config: HarnessConfig, category: &str, name: &str) -> i32 {
    let harness = Harness::from_config(config).unwrap_or_else(|e| fail(&e));
    let built = harness
        .case(category, name)
        .and_then(|mut case| {
            let image = case.build_image()?.clone();
            Ok(image)
        });
    match built {
        Ok(image) => {
            println!(
                "{} ({} instructions)",
                image.path.display(),
                image.instructions
            );
            0
        }
        Err(e) => {
            eprintln!("error: {}", report(&e));
            1
        }
    }
}

fn cmd_generate(
    config: &HarnessConfig,
    category: &str,
    dir: Option<PathBuf>,
    output: &Path,
) -> i32 {
    let dir = dir.unwrap_or_else(|| assembly_dir(&config.root, category));
    match generate::generate(&dir, output, category) {
        Ok(count) => {
            println!("{count} tests -> {}", output.display());
            0
        }
        Err(e) => {
            eprintln!("error: {}", report(&e));
            1
        }
    }
}

fn cmd_locate(config: HarnessConfig) -> i32 {
    let harness = Harness::from_config(config).unwrap_or_else(|e| fail(&e));
    let toolchain = harness.toolchain();
    println!("assembler:    {}", toolchain.assembler.display());
    println!("disassembler: {}", toolchain.disassembler.display());
    println!("simulator:    {}", harness.config().simulator_path().display());
    0
}

/// Prints a run-ending error and exits with status 1.
fn fail(e: &HarnessError) -> ! {
    eprintln!("error: {}", report(e));
    process::exit(1);
}

/// The error followed by its chain of sources.
fn report(e: &HarnessError) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
