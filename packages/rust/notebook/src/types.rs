//! The notebook and cell data model.
//!
//! Mirrors the on-disk `.ipynb` JSON structure. Fields this build does
//! not interpret (`nbformat`, cell attachments, ...) are carried through
//! flattened maps so re-serialization preserves them byte-for-byte in
//! content, if not in key order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kind of a notebook cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    /// Any other cell type a host format defines; passed through verbatim.
    #[serde(untagged)]
    Other(String),
}

/// A single notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,

    /// Execution counter. Code cells carry the key even when `null`;
    /// other cell kinds omit it entirely. The double `Option` keeps
    /// null-vs-absent intact across a round trip.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_count: Option<Option<i64>>,

    /// Unique cell identifier within the document.
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default)]
    pub outputs: Vec<Value>,

    /// Source lines. Each line except the last keeps its trailing newline,
    /// matching the notebook format convention.
    #[serde(default, deserialize_with = "string_or_lines")]
    pub source: Vec<String>,

    /// Unrecognized cell fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A notebook document: an ordered cell sequence plus document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Unrecognized top-level fields (`nbformat`, `nbformat_minor`, ...),
    /// passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserialize a present-but-possibly-null field into `Some(Option<_>)`,
/// so an absent field (the serde default, `None`) stays distinguishable.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Accept cell source as either a single string or a list of lines.
/// Single strings are split into lines that keep their terminators.
fn string_or_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SourceRepr {
        Lines(Vec<String>),
        Joined(String),
    }

    match SourceRepr::deserialize(deserializer)? {
        SourceRepr::Lines(lines) => Ok(lines),
        SourceRepr::Joined(text) => Ok(crate::split_keepends(&text)),
    }
}
