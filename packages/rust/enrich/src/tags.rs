//! Tag-directive injection for the rendered pipeline.

use serde_json::{Map, Value};

use nbcookbook_notebook::{CellType, NewCell, Notebook};
use nbcookbook_shared::Result;

/// Notebook metadata key carrying the document's tags.
pub const TAGS_KEY: &str = "tags";

/// Tag assigned to documents that declare none.
pub const UNTAGGED: &str = "untagged";

/// Raw-cell metadata marking the directive as restructuredtext.
const RAW_MIMETYPE: &str = "text/restructuredtext";

/// Return a copy of the notebook with an `index` directive cell prepended,
/// listing the notebook's metadata tags (or [`UNTAGGED`] when absent) so
/// the build's index machinery picks them up.
pub fn inject_tags_index(notebook: &Notebook) -> Result<Notebook> {
    let tags = notebook
        .metadata_str_list(TAGS_KEY)?
        .unwrap_or_else(|| vec![UNTAGGED.to_string()]);

    let mut metadata = Map::new();
    metadata.insert("raw_mimetype".to_string(), Value::from(RAW_MIMETYPE));

    Ok(notebook.with_cell(
        NewCell::new(CellType::Raw)
            .metadata(metadata)
            .source_lines([format!(".. index:: {}", tags.join(", "))]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_comma_joined() {
        let nb = Notebook::from_json_str(
            r#"{"cells": [], "metadata": {"tags": ["protein", "md"]}}"#,
        )
        .expect("parse");

        let injected = inject_tags_index(&nb).expect("inject");
        assert_eq!(injected.cells.len(), 1);
        assert_eq!(injected.cells[0].cell_type, CellType::Raw);
        assert_eq!(injected.cells[0].source, vec![".. index:: protein, md"]);
        assert_eq!(
            injected.cells[0].metadata.get("raw_mimetype"),
            Some(&Value::from(RAW_MIMETYPE))
        );
    }

    #[test]
    fn missing_tags_default_to_untagged() {
        let nb = Notebook::from_json_str(r#"{"cells": [], "metadata": {}}"#).expect("parse");
        let injected = inject_tags_index(&nb).expect("inject");
        assert_eq!(injected.cells[0].source, vec![".. index:: untagged"]);
    }

    #[test]
    fn malformed_tags_fail_the_document() {
        let nb = Notebook::from_json_str(r#"{"cells": [], "metadata": {"tags": 7}}"#)
            .expect("parse");
        assert!(inject_tags_index(&nb).is_err());
    }
}
