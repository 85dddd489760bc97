//! Notebook parsing, serialization, and cell-level editing for nbcookbook.
//!
//! The enrichment hooks treat a notebook as a value: every edit returns a
//! new document and leaves the input untouched. The only generated data is
//! the fresh cell id of an inserted cell.

pub mod types;

use serde_json::{Map, Value};
use uuid::Uuid;

use nbcookbook_shared::{NbcookbookError, Result};

pub use types::{Cell, CellType, Notebook};

// ---------------------------------------------------------------------------
// Source-line assembly
// ---------------------------------------------------------------------------

/// Split text into lines that keep their trailing newline, the notebook
/// format's source representation. `"a\nb"` becomes `["a\n", "b"]`.
pub fn split_keepends(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Assemble cell source from logical lines: join with newlines, then
/// re-split keeping terminators so embedded newlines in any line are
/// normalized away.
fn assemble_source(lines: &[String]) -> Vec<String> {
    split_keepends(&lines.join("\n"))
}

// ---------------------------------------------------------------------------
// Cell insertion
// ---------------------------------------------------------------------------

/// Specification for a cell to insert into a notebook.
///
/// Built with the constructor plus chained setters, then passed to
/// [`Notebook::with_cell`].
#[derive(Debug, Clone)]
pub struct NewCell {
    cell_type: CellType,
    position: usize,
    source: Vec<String>,
    metadata: Map<String, Value>,
    outputs: Vec<Value>,
}

impl NewCell {
    /// A new empty cell of the given type, inserted at the front.
    pub fn new(cell_type: CellType) -> Self {
        Self {
            cell_type,
            position: 0,
            source: Vec::new(),
            metadata: Map::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the insertion position (default 0, the front).
    pub fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Set the cell's source as logical lines (no trailing newlines needed).
    pub fn source_lines<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.source = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cell's metadata mapping.
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the cell's outputs.
    pub fn outputs(mut self, outputs: Vec<Value>) -> Self {
        self.outputs = outputs;
        self
    }
}

impl Notebook {
    /// Parse a notebook from its JSON text. Malformed JSON or a missing
    /// `cells` key is fatal for the document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| NbcookbookError::notebook(format!("invalid notebook JSON: {e}")))
    }

    /// Serialize the notebook back to JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NbcookbookError::notebook(format!("notebook serialization failed: {e}")))
    }

    /// Return a copy of this notebook with a new cell inserted.
    ///
    /// The cell gets a freshly generated id and an execution count of zero;
    /// its source is assembled from the spec's logical lines. Positions past
    /// the end clamp to appending, so existing cells are never disturbed
    /// beyond the single insertion.
    pub fn with_cell(&self, spec: NewCell) -> Notebook {
        let cell = Cell {
            cell_type: spec.cell_type,
            execution_count: Some(Some(0)),
            id: Uuid::new_v4().to_string(),
            metadata: spec.metadata,
            outputs: spec.outputs,
            source: assemble_source(&spec.source),
            extra: Map::new(),
        };

        let mut copy = self.clone();
        let position = spec.position.min(copy.cells.len());
        copy.cells.insert(position, cell);
        copy
    }

    /// Look up a metadata value that must be a list of strings, like
    /// `tags`, `pypi_dependencies`, or `required_files`.
    ///
    /// Returns `Ok(None)` when the key is absent; a present value of the
    /// wrong shape fails the document rather than silently degrading.
    pub fn metadata_str_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.metadata.get(key) else {
            return Ok(None);
        };

        let items = value.as_array().ok_or_else(|| {
            NbcookbookError::notebook(format!("metadata key {key} is not a list"))
        })?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    NbcookbookError::notebook(format!(
                        "metadata key {key} contains a non-string entry: {item}"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// The document title from metadata, if one is set.
    pub fn title(&self) -> Option<String> {
        self.metadata
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notebook() -> Notebook {
        Notebook::from_json_str(
            r##"{
                "cells": [
                    {"cell_type": "markdown", "id": "m1", "metadata": {}, "source": ["# Hi"]},
                    {"cell_type": "code", "execution_count": 3, "id": "c1",
                     "metadata": {}, "outputs": [], "source": ["print(1)"]}
                ],
                "metadata": {"tags": ["protein", "md"]},
                "nbformat": 4,
                "nbformat_minor": 5
            }"##,
        )
        .expect("sample notebook parses")
    }

    #[test]
    fn split_keepends_matches_format_convention() {
        assert_eq!(split_keepends("a\nb"), vec!["a\n", "b"]);
        assert_eq!(split_keepends("a\n"), vec!["a\n"]);
        assert!(split_keepends("").is_empty());
    }

    #[test]
    fn with_cell_prepends_and_preserves_order() {
        let nb = sample_notebook();
        let enriched = nb.with_cell(
            NewCell::new(CellType::Code).source_lines(["!pip install -q openmm"]),
        );

        assert_eq!(enriched.cells.len(), nb.cells.len() + 1);
        assert_eq!(enriched.cells[0].cell_type, CellType::Code);
        assert_eq!(enriched.cells[0].execution_count, Some(Some(0)));
        assert_eq!(enriched.cells[0].source, vec!["!pip install -q openmm"]);
        // Original cells keep their relative order.
        assert_eq!(enriched.cells[1].id, "m1");
        assert_eq!(enriched.cells[2].id, "c1");
        // Input notebook is untouched.
        assert_eq!(nb.cells.len(), 2);
    }

    #[test]
    fn with_cell_generates_unique_ids() {
        let nb = sample_notebook();
        let a = nb.with_cell(NewCell::new(CellType::Raw));
        let b = nb.with_cell(NewCell::new(CellType::Raw));
        assert!(!a.cells[0].id.is_empty());
        assert_ne!(a.cells[0].id, b.cells[0].id);
    }

    #[test]
    fn with_cell_clamps_out_of_range_position() {
        let nb = sample_notebook();
        let appended = nb.with_cell(NewCell::new(CellType::Raw).at(99));
        assert_eq!(appended.cells.len(), 3);
        assert_eq!(appended.cells[0].id, "m1");
        assert_eq!(appended.cells[1].id, "c1");
        assert_eq!(appended.cells[2].cell_type, CellType::Raw);
    }

    #[test]
    fn multi_line_source_keeps_newlines() {
        let nb = sample_notebook();
        let enriched = nb.with_cell(
            NewCell::new(CellType::Code).source_lines(["# comment", "!pip install -q a b"]),
        );
        assert_eq!(
            enriched.cells[0].source,
            vec!["# comment\n", "!pip install -q a b"]
        );
    }

    #[test]
    fn metadata_str_list_shapes() {
        let nb = sample_notebook();
        assert_eq!(
            nb.metadata_str_list("tags").expect("tags"),
            Some(vec!["protein".to_string(), "md".to_string()])
        );
        assert_eq!(nb.metadata_str_list("required_files").expect("absent"), None);

        let bad = Notebook::from_json_str(
            r#"{"cells": [], "metadata": {"tags": "protein"}}"#,
        )
        .expect("parses");
        assert!(bad.metadata_str_list("tags").is_err());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = Notebook::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid notebook JSON"));

        // A document without a `cells` key is not a notebook.
        assert!(Notebook::from_json_str(r#"{"metadata": {}}"#).is_err());
    }

    #[test]
    fn insert_then_parse_roundtrip() {
        let nb = sample_notebook();
        let edited = nb
            .with_cell(NewCell::new(CellType::Code).source_lines(["!pip install -q openmm"]))
            .with_cell(NewCell::new(CellType::Raw).source_lines([".. index:: protein, md"]));

        let text = edited.to_json_string().expect("serialize");
        let back = Notebook::from_json_str(&text).expect("parse back");

        assert_eq!(back.cells.len(), nb.cells.len() + 2);
        assert_eq!(back.cells[2].id, "m1");
        assert_eq!(back.cells[2].source, nb.cells[0].source);
        assert_eq!(back.cells[3].id, "c1");
        assert_eq!(back.cells[3].source, nb.cells[1].source);
    }
}
