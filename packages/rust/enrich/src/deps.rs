//! Dependency resolution for generated setup cells.
//!
//! Packages and required files resolve through different fallback chains,
//! and the asymmetry is intentional: packages have no sensible filesystem
//! convention, while a notebook's data files usually sit right next to it.
//!
//! - packages: notebook `pypi_dependencies` metadata, else the configured
//!   build-wide default.
//! - files: notebook `required_files` metadata, else the configured
//!   build-wide default, else — only when that default is *unset*, as
//!   opposed to set to the empty list — every non-notebook sibling file of
//!   the document.

use std::path::Path;

use nbcookbook_notebook::Notebook;
use nbcookbook_shared::{NbcookbookError, Result, SetupConfig};

/// Notebook metadata key naming the packages its setup cell installs.
pub const PYPI_DEPS_KEY: &str = "pypi_dependencies";

/// Notebook metadata key naming the files its setup cell fetches.
pub const REQUIRED_FILES_KEY: &str = "required_files";

/// The packages and files a notebook's setup cell must provide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedDeps {
    /// Packages installed in one package-manager invocation.
    pub packages: Vec<String>,
    /// Files fetched from the configured base URI, relative paths.
    pub files: Vec<String>,
}

/// Resolve a notebook's setup-cell dependencies.
///
/// `doc_dir` is the directory containing the notebook's source file; it is
/// only touched when the required-files fallback reaches the sibling scan.
pub fn resolve_deps(
    notebook: &Notebook,
    doc_dir: &Path,
    config: &SetupConfig,
) -> Result<ResolvedDeps> {
    let packages = match notebook.metadata_str_list(PYPI_DEPS_KEY)? {
        Some(explicit) => explicit,
        None => config.default_pypi_deps.clone(),
    };

    let files = match notebook.metadata_str_list(REQUIRED_FILES_KEY)? {
        Some(explicit) => explicit,
        None => match &config.default_required_files {
            Some(default) => default.clone(),
            None => sibling_files(doc_dir)?,
        },
    };

    tracing::debug!(
        packages = packages.len(),
        files = files.len(),
        "resolved setup-cell dependencies"
    );

    Ok(ResolvedDeps { packages, files })
}

/// Every regular file next to the notebook with a non-`.ipynb` extension,
/// sorted by name for deterministic setup cells.
fn sibling_files(doc_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(doc_dir).map_err(|e| NbcookbookError::io(doc_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| NbcookbookError::io(doc_dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let has_data_extension = path
            .extension()
            .is_some_and(|ext| !ext.eq_ignore_ascii_case("ipynb"));
        if !has_data_extension {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }

    files.sort();
    Ok(files)
}
