//! Generic index-entry collection.
//!
//! The engine scans every document after its `source-read` hooks have run
//! and records `.. index:: tag, tag` directives into the build's tag
//! index. For notebooks the directives live in raw restructuredtext
//! cells; plain text documents carry them as directive lines.

use std::sync::LazyLock;

use regex::Regex;

use nbcookbook_notebook::{CellType, Notebook};

static INDEX_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\.\s+index::\s*(.*)$").expect("valid regex"));

/// Index entries from a notebook's raw cells.
pub fn notebook_index_entries(notebook: &Notebook) -> Vec<String> {
    notebook
        .cells
        .iter()
        .filter(|cell| cell.cell_type == CellType::Raw)
        .flat_map(|cell| cell.source.iter())
        .flat_map(|line| directive_tags(line.trim_end()))
        .collect()
}

/// Index entries from a plain text document's directive lines.
pub fn text_index_entries(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| directive_tags(line.trim()))
        .collect()
}

fn directive_tags(line: &str) -> Vec<String> {
    let Some(caps) = INDEX_DIRECTIVE_RE.captures(line) else {
        return Vec::new();
    };

    caps[1]
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_cells_yield_their_tags() {
        let nb = Notebook::from_json_str(
            r#"{
                "cells": [
                    {"cell_type": "raw", "id": "r1",
                     "metadata": {"raw_mimetype": "text/restructuredtext"},
                     "source": [".. index:: protein, md"]},
                    {"cell_type": "code", "id": "c1", "metadata": {},
                     "outputs": [], "source": [".. index:: not-a-raw-cell"]}
                ],
                "metadata": {}
            }"#,
        )
        .expect("parse");

        assert_eq!(notebook_index_entries(&nb), vec!["protein", "md"]);
    }

    #[test]
    fn text_documents_yield_directive_lines() {
        let text = "Intro\n=====\n\n.. index:: water, solvent\n\nBody text.\n";
        assert_eq!(text_index_entries(text), vec!["water", "solvent"]);
        assert!(text_index_entries("no directives here").is_empty());
    }

    #[test]
    fn empty_directive_yields_nothing() {
        assert!(text_index_entries(".. index::").is_empty());
        assert_eq!(text_index_entries(".. index:: solo"), vec!["solo"]);
    }
}
