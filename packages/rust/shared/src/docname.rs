//! Document names.
//!
//! A [`Docname`] is the build engine's name for a source document: its
//! path relative to the source root, forward-slash separated, with the
//! file extension removed (`sims/protein_in_water`). Hooks receive
//! docnames and map them back to source or artifact paths themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source file extensions the build recognizes as documents, in the order
/// they are tried when mapping a docname back to a file.
pub const SOURCE_SUFFIXES: &[&str] = &["ipynb", "rst", "md"];

/// A slash-separated, extensionless document name relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Docname(String);

impl Docname {
    /// Wrap an already-normalized docname string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build a docname from a path relative to the source root, dropping
    /// the file extension. Returns `None` for empty paths.
    pub fn from_rel_path(path: &Path) -> Option<Self> {
        let stem = path.with_extension("");
        let parts: Vec<&str> = stem
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(os) => os.to_str(),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    /// Convert back to a relative path with the given extension.
    pub fn to_rel_path(&self, ext: &str) -> PathBuf {
        let mut path: PathBuf = self.0.split('/').collect();
        path.set_extension(ext);
        path
    }

    /// The final path segment, used as a fallback display title.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The docname as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the docname to its source file under `source_dir`, trying
    /// each recognized suffix in order. Returns `None` when no source file
    /// exists for this docname.
    pub fn resolve_source(&self, source_dir: &Path) -> Option<PathBuf> {
        SOURCE_SUFFIXES.iter().find_map(|suffix| {
            let candidate = source_dir.join(self.to_rel_path(suffix));
            candidate.is_file().then_some(candidate)
        })
    }
}

impl std::fmt::Display for Docname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Docname {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rel_path_strips_extension() {
        let name = Docname::from_rel_path(Path::new("sims/protein_in_water.ipynb"))
            .expect("docname");
        assert_eq!(name.as_str(), "sims/protein_in_water");
        assert_eq!(name.last_segment(), "protein_in_water");
    }

    #[test]
    fn to_rel_path_restores_extension() {
        let name = Docname::new("sims/protein_in_water");
        assert_eq!(
            name.to_rel_path("ipynb"),
            PathBuf::from("sims/protein_in_water.ipynb")
        );
    }

    #[test]
    fn single_segment_docname() {
        let name = Docname::from_rel_path(Path::new("index.rst")).expect("docname");
        assert_eq!(name.as_str(), "index");
        assert_eq!(name.last_segment(), "index");
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(Docname::from_rel_path(Path::new("")).is_none());
    }
}
