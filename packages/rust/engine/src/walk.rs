//! Source-tree document discovery.

use std::path::{Path, PathBuf};

use nbcookbook_shared::{Docname, NbcookbookError, Result, SOURCE_SUFFIXES};

/// Find every document under `source_dir`, sorted by docname.
///
/// A document is a regular file with a recognized source suffix. Dot
/// directories and dot files (including `.ipynb_checkpoints`) are skipped.
pub fn find_documents(source_dir: &Path) -> Result<Vec<(Docname, PathBuf)>> {
    let mut documents = Vec::new();
    walk_into(source_dir, source_dir, &mut documents)?;
    documents.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(documents)
}

fn walk_into(
    root: &Path,
    dir: &Path,
    documents: &mut Vec<(Docname, PathBuf)>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| NbcookbookError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| NbcookbookError::io(dir, e))?;
        let path = entry.path();

        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }

        if path.is_dir() {
            walk_into(root, &path, documents)?;
            continue;
        }

        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_SUFFIXES.contains(&ext));
        if !recognized {
            continue;
        }

        let rel = path
            .strip_prefix(root)
            .map_err(|_| NbcookbookError::validation(format!("path escapes source root: {path:?}")))?;
        if let Some(docname) = Docname::from_rel_path(rel) {
            documents.push((docname, path));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbc-walk-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_documents_sorted_and_skips_non_sources() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("sims/.ipynb_checkpoints")).unwrap();
        std::fs::write(root.join("index.rst"), "").unwrap();
        std::fs::write(root.join("sims/intro.ipynb"), "{}").unwrap();
        std::fs::write(root.join("sims/data.pdb"), "").unwrap();
        std::fs::write(root.join("sims/notes.md"), "").unwrap();
        std::fs::write(
            root.join("sims/.ipynb_checkpoints/intro-checkpoint.ipynb"),
            "{}",
        )
        .unwrap();

        let docs = find_documents(&root).expect("walk");
        let names: Vec<_> = docs.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(names, vec!["index", "sims/intro", "sims/notes"]);
        std::fs::remove_dir_all(&root).unwrap();
    }
}
