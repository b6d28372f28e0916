//! Test-suite generation.
//!
//! Keeps a Rust test listing in sync with the assembly corpus on disk. It performs:
//! 1. **Discovery:** Every regular `*.s` file of a category's assembly directory becomes a test,
//!    identified by its file stem.
//! 2. **Rendering:** One `#[test]` stanza per stem inside a module named after the category, all
//!    sharing a lazily created [`Harness`](crate::Harness) configured from the environment.
//! 3. **Writing:** The listing is written only when its contents change, so re-running on an
//!    unchanged corpus is a no-op.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::case;
use crate::common::constants::ASSEMBLY_EXTENSION;
use crate::common::{FileRole, HarnessError, Result};

/// First line of every generated listing.
pub const GENERATED_HEADER: &str = "// This is a generated file. Do not add to git.";

const PRELUDE: &str = "\
// Regenerate with `rvtest generate` whenever the assembly corpus changes.

use std::sync::OnceLock;

use rvtest_core::Harness;

static HARNESS: OnceLock<Harness> = OnceLock::new();

fn harness() -> &'static Harness {
    HARNESS.get_or_init(|| Harness::from_env().unwrap_or_else(|e| panic!(\"{e}\")))
}
";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Names the prelude brings into scope for every generated module.
const PRELUDE_NAMES: &[&str] = &["harness", "rvtest_core", "std"];

/// Lists the test names (file stems of `*.s` files) in `dir`, sorted.
///
/// A missing directory is an empty corpus, not an error.
pub fn discover(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "assembly directory not found; no tests discovered");
        return Ok(Vec::new());
    }
    let read_error = |source| HarnessError::FileRead {
        role: FileRole::Source,
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != ASSEMBLY_EXTENSION) {
            continue;
        }
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => names.push(stem.to_string()),
            None => tracing::warn!(path = %path.display(), "skipping non-UTF-8 file name"),
        }
    }
    names.sort();
    Ok(names)
}

/// Turns a file stem or category into a snake-case Rust identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`. A `t_` prefix is added to identifiers that
/// would start with a digit, consist only of underscores, or collide with a keyword or a name the
/// generated prelude uses.
pub fn test_ident(text: &str) -> String {
    let mut ident = String::with_capacity(text.len() + 2);
    let mut prev_lower = false;
    for c in text.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            ident.push(c);
            prev_lower = true;
        } else {
            ident.push('_');
            prev_lower = false;
        }
    }
    let needs_prefix = ident.is_empty()
        || ident.starts_with(|c: char| c.is_ascii_digit())
        || ident.chars().all(|c| c == '_')
        || KEYWORDS.contains(&ident.as_str())
        || PRELUDE_NAMES.contains(&ident.as_str());
    if needs_prefix {
        ident.insert_str(0, "t_");
    }
    ident
}

/// Renders the listing for `category` with one stanza per name.
///
/// # Returns
///
/// The source text, or `DuplicateTestName` when two names map to one identifier.
pub fn render(category: &str, names: &[String]) -> Result<String> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut stanzas = String::new();
    for name in names {
        case::validate(category, name)?;
        let ident = test_ident(name);
        if let Some(first) = seen.insert(ident.clone(), name) {
            return Err(HarnessError::DuplicateTestName {
                first: first.to_string(),
                second: name.clone(),
                ident,
            });
        }
        let _ = write!(
            stanzas,
            "
    #[test]
    fn {ident}() {{
        let mut case = harness()
            .case({category:?}, {name:?})
            .unwrap_or_else(|e| panic!(\"{{e}}\"));
        let result = case.run_detailed().unwrap_or_else(|e| panic!(\"{{e}}\"));
        assert!(result.passed, \"{{}}: {{result}}\", case.id());
    }}
"
        );
    }

    let module = test_ident(category);
    Ok(format!(
        "{GENERATED_HEADER}\n{PRELUDE}\nmod {module} {{\n    use super::harness;\n{stanzas}}}\n"
    ))
}

/// Regenerates `output` from the assembly files in `assembly_dir`.
///
/// # Arguments
///
/// * `assembly_dir` - Directory scanned for `*.s` files.
/// * `output` - Listing to write; parent directories are created.
/// * `category` - Category every discovered test belongs to.
///
/// # Returns
///
/// The number of stanzas in the listing.
pub fn generate(assembly_dir: &Path, output: &Path, category: &str) -> Result<usize> {
    let names = discover(assembly_dir)?;
    let text = render(category, &names)?;

    if fs::read_to_string(output).is_ok_and(|current| current == text) {
        tracing::debug!(output = %output.display(), "suite unchanged");
        return Ok(names.len());
    }

    let write_error = |path: &Path, source| HarnessError::FileWrite {
        role: FileRole::Suite,
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;
    }
    fs::write(output, text).map_err(|e| write_error(output, e))?;
    tracing::info!(output = %output.display(), tests = names.len(), "suite written");
    Ok(names.len())
}
