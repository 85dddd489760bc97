//! The enrichment hooks wired into the build engine.

use std::path::{Path, PathBuf};

use nbcookbook_engine::events::{DocPurgedHook, SourceReadHook};
use nbcookbook_notebook::Notebook;
use nbcookbook_shared::{Docname, NbcookbookError, Result, SetupConfig};

use crate::cloud::create_cloud_variant;
use crate::tags::inject_tags_index;

/// Output subdirectory holding generated cloud notebook variants.
pub const COLAB_SUBDIR: &str = "colab";

/// Holds the paths and setup configuration the enrichment hooks need.
///
/// The enricher keeps no per-document state, so its hooks may run
/// concurrently for different documents.
#[derive(Debug, Clone)]
pub struct Enricher {
    source_dir: PathBuf,
    output_dir: PathBuf,
    setup: SetupConfig,
}

impl Enricher {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        setup: SetupConfig,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            setup,
        }
    }

    /// Root of the cloud-variant output subtree.
    pub fn colab_root(&self) -> PathBuf {
        self.output_dir.join(COLAB_SUBDIR)
    }

    /// The cloud artifact path for a docname, mirroring the source's
    /// relative path beneath the colab subtree.
    ///
    /// Docnames with empty, `.`, or `..` segments would resolve outside
    /// the subtree and are rejected before any filesystem access.
    fn colab_artifact_path(&self, docname: &Docname) -> Result<PathBuf> {
        let suspicious = docname
            .as_str()
            .split('/')
            .any(|segment| matches!(segment, "" | "." | ".."));
        if suspicious {
            return Err(NbcookbookError::path_safety(docname.as_str()));
        }

        let colab_root = self.colab_root();
        let path = colab_root.join(docname.to_rel_path("ipynb"));
        if !path.starts_with(&colab_root) {
            return Err(NbcookbookError::path_safety(path));
        }
        Ok(path)
    }
}

impl SourceReadHook for Enricher {
    /// Enrich notebook documents as the engine reads them: write the cloud
    /// variant artifact, then swap the in-memory source for the
    /// tag-injected serialization. Non-notebook documents pass through.
    fn on_source_read(&self, docname: &Docname, source: &mut Vec<String>) -> Result<()> {
        let Some(src_path) = docname.resolve_source(&self.source_dir) else {
            return Ok(());
        };
        if src_path.extension().is_none_or(|ext| ext != "ipynb") {
            return Ok(());
        }

        let raw = source.first().ok_or_else(|| {
            NbcookbookError::validation(format!("empty source buffer for {docname}"))
        })?;
        let notebook = Notebook::from_json_str(raw)
            .map_err(|e| NbcookbookError::notebook(format!("{docname}: {e}")))?;

        let doc_dir = src_path
            .parent()
            .unwrap_or(Path::new("."));
        let out_path = self.colab_artifact_path(docname)?;
        create_cloud_variant(&notebook, doc_dir, &out_path, &self.setup)?;

        source[0] = inject_tags_index(&notebook)?.to_json_string()?;
        tracing::debug!(%docname, "enriched notebook source");
        Ok(())
    }
}

impl DocPurgedHook for Enricher {
    /// Delete the cloud artifact of a purged document. A missing artifact
    /// is a no-op; a path escaping the colab subtree is refused.
    fn on_doc_purged(&self, docname: &Docname) -> Result<()> {
        let artifact = self.colab_artifact_path(docname)?;

        match std::fs::remove_file(&artifact) {
            Ok(()) => {
                tracing::debug!(%docname, path = %artifact.display(), "removed stale cloud variant");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NbcookbookError::io(artifact, e)),
        }
    }
}
