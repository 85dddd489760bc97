//! Cloud-variant notebook generation.

use std::path::Path;

use nbcookbook_notebook::{CellType, NewCell, Notebook};
use nbcookbook_shared::{NbcookbookError, Result, SetupConfig};

use crate::deps::resolve_deps;
use crate::setup_cell::build_setup_source;

/// Write a copy of `notebook` with a dependency setup cell prepended,
/// suitable for execution in a hosted cloud environment.
///
/// `doc_dir` is the source directory of the notebook (used by the
/// sibling-file fallback); `out_path` is the artifact destination, whose
/// parent directories are created as needed. The caller's notebook is not
/// modified.
pub fn create_cloud_variant(
    notebook: &Notebook,
    doc_dir: &Path,
    out_path: &Path,
    config: &SetupConfig,
) -> Result<()> {
    let deps = resolve_deps(notebook, doc_dir, config)?;
    let source = build_setup_source(&deps, &config.base_uri);

    let variant = notebook.with_cell(NewCell::new(CellType::Code).source_lines(source));

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| NbcookbookError::io(parent, e))?;
    }
    std::fs::write(out_path, variant.to_json_string()?)
        .map_err(|e| NbcookbookError::io(out_path, e))?;

    tracing::debug!(
        path = %out_path.display(),
        packages = deps.packages.len(),
        files = deps.files.len(),
        "wrote cloud notebook variant"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbc-cloud-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_variant_without_touching_input() {
        let dir = temp_dir();
        let nb = Notebook::from_json_str(
            r#"{"cells": [{"cell_type": "code", "execution_count": null, "id": "c1",
                "metadata": {}, "outputs": [], "source": ["print(1)"]}],
                "metadata": {}}"#,
        )
        .expect("parse");

        let out_path = dir.join("out").join("colab").join("intro.ipynb");
        let config = SetupConfig {
            default_pypi_deps: vec!["openmm".into()],
            default_required_files: Some(vec![]),
            base_uri: "https://example.com/cookbook".into(),
        };

        create_cloud_variant(&nb, &dir, &out_path, &config).expect("create variant");

        let written = std::fs::read_to_string(&out_path).expect("artifact exists");
        let variant = Notebook::from_json_str(&written).expect("artifact parses");
        assert_eq!(variant.cells.len(), 2);
        assert!(variant.cells[0].source.iter().any(|l| l.contains("openmm")));
        assert_eq!(variant.cells[1].id, "c1");

        // Input untouched.
        assert_eq!(nb.cells.len(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
