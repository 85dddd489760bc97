//! The build record.
//!
//! Each build writes a small JSON file into the output root with the
//! content hash of every document it processed. The next build reads it
//! back to report how many documents actually changed.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use nbcookbook_shared::{NbcookbookError, Result};

/// Build record file name within the output root.
pub const BUILD_RECORD_FILE: &str = ".nbcookbook-build.json";

/// Persisted summary of one build invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Unique identifier for this build.
    pub build_id: Uuid,
    /// Tool version that produced the record.
    pub tool_version: String,
    /// When the build started.
    pub started_at: DateTime<Utc>,
    /// When the build finished.
    pub completed_at: DateTime<Utc>,
    /// SHA-256 hash of each processed document's source, keyed by docname.
    pub documents: BTreeMap<String, String>,
}

impl BuildRecord {
    /// Load the previous build's record from the output root, if any.
    pub fn load(output_dir: &Path) -> Result<Option<Self>> {
        let path = output_dir.join(BUILD_RECORD_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| NbcookbookError::io(&path, e))?;
        let record = serde_json::from_str(&content).map_err(|e| {
            NbcookbookError::validation(format!("invalid build record {}: {e}", path.display()))
        })?;
        Ok(Some(record))
    }

    /// Write this record into the output root.
    pub fn write(&self, output_dir: &Path) -> Result<()> {
        let path = output_dir.join(BUILD_RECORD_FILE);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| NbcookbookError::validation(format!("build record serialization: {e}")))?;
        std::fs::write(&path, content).map_err(|e| NbcookbookError::io(&path, e))
    }
}

/// SHA-256 hash of a document's source text, hex-encoded.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
