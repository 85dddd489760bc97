//! The build driver.
//!
//! [`Builder::run`] walks the source tree and drives the registered hooks
//! through one build: read each document and emit `source-read`, collect
//! index entries and titles, purge documents that disappeared since the
//! previous build, assemble the index page's template context, and write
//! the build record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use serde_json::Map;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use nbcookbook_index::{DocTitles, INDEX_PAGE, TagIndex};
use nbcookbook_notebook::Notebook;
use nbcookbook_shared::{Docname, NbcookbookError, Result};

use crate::events::HookRegistry;
use crate::indexing::{notebook_index_entries, text_index_entries};
use crate::record::{BuildRecord, content_hash};
use crate::walk::find_documents;

/// Shared build environment: state accumulated across document reads and
/// queried at render time.
#[derive(Debug, Default)]
pub struct BuildEnv {
    /// The build-wide tag index.
    pub tag_index: TagIndex,
    titles: Mutex<DocTitles>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document's display title.
    pub fn record_title(&self, docname: &Docname, title: String) {
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(docname.clone(), title);
    }

    /// A point-in-time copy of the known titles.
    pub fn titles(&self) -> DocTitles {
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Progress callback for reporting build status.
pub trait BuildProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document is read and processed.
    fn doc_read(&self, docname: &Docname, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, summary: &BuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn doc_read(&self, _docname: &Docname, _current: usize, _total: usize) {}
    fn done(&self, _summary: &BuildSummary) {}
}

/// Result of one build invocation.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Documents processed.
    pub documents: usize,
    /// How many of them were notebooks.
    pub notebooks: usize,
    /// Documents whose content changed since the previous build.
    pub changed: usize,
    /// Documents purged because their source disappeared.
    pub purged: usize,
    /// Distinct tags in the final index.
    pub tags: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Drives one build over a source tree.
pub struct Builder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    tool_version: String,
    env: Arc<BuildEnv>,
}

impl Builder {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        tool_version: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            tool_version: tool_version.into(),
            env: Arc::new(BuildEnv::new()),
        }
    }

    /// The shared build environment, for wiring page-context hooks.
    pub fn env(&self) -> Arc<BuildEnv> {
        self.env.clone()
    }

    /// Run one build.
    #[instrument(skip_all, fields(source = %self.source_dir.display()))]
    pub fn run(
        &self,
        registry: &HookRegistry,
        progress: &dyn BuildProgress,
    ) -> Result<BuildSummary> {
        let start = Instant::now();
        let started_at = Utc::now();

        info!(
            source = %self.source_dir.display(),
            output = %self.output_dir.display(),
            "starting build"
        );

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| NbcookbookError::io(&self.output_dir, e))?;

        let previous = BuildRecord::load(&self.output_dir)?;

        // --- Phase 1: read documents and run source hooks ---
        progress.phase("Reading sources");
        let documents = find_documents(&self.source_dir)?;
        let total = documents.len();

        let mut hashes = std::collections::BTreeMap::new();
        let mut notebooks = 0usize;
        let mut changed = 0usize;

        for (i, (docname, path)) in documents.iter().enumerate() {
            let raw = std::fs::read_to_string(path).map_err(|e| NbcookbookError::io(path, e))?;

            let hash = content_hash(&raw);
            let is_changed = previous
                .as_ref()
                .and_then(|record| record.documents.get(docname.as_str()))
                .is_none_or(|previous_hash| *previous_hash != hash);
            if is_changed {
                changed += 1;
            }
            hashes.insert(docname.to_string(), hash);

            let mut source = vec![raw];
            registry.emit_source_read(docname, &mut source)?;
            let rendered = source.concat();

            self.write_rendered(docname, path, &rendered)?;
            self.index_document(docname, path, &rendered)?;

            if path.extension().is_some_and(|ext| ext == "ipynb") {
                notebooks += 1;
            }
            progress.doc_read(docname, i + 1, total);
        }

        // --- Phase 2: purge documents removed since the last build ---
        progress.phase("Purging removed documents");
        let purged = self.purge_removed(registry, previous.as_ref(), &documents)?;

        // --- Phase 3: index page context ---
        progress.phase("Rendering index context");
        let mut context = Map::new();
        registry.emit_page_context(INDEX_PAGE, &mut context)?;

        let context_path = self.output_dir.join(format!("{INDEX_PAGE}.json"));
        let content = serde_json::to_string_pretty(&context).map_err(|e| {
            NbcookbookError::validation(format!("index context serialization: {e}"))
        })?;
        std::fs::write(&context_path, content)
            .map_err(|e| NbcookbookError::io(&context_path, e))?;

        // --- Phase 4: build record ---
        let record = BuildRecord {
            build_id: Uuid::new_v4(),
            tool_version: self.tool_version.clone(),
            started_at,
            completed_at: Utc::now(),
            documents: hashes,
        };
        record.write(&self.output_dir)?;

        let summary = BuildSummary {
            documents: total,
            notebooks,
            changed,
            purged,
            tags: self.env.tag_index.snapshot().len(),
            elapsed: start.elapsed(),
        };
        progress.done(&summary);

        info!(
            build_id = %record.build_id,
            documents = summary.documents,
            notebooks = summary.notebooks,
            changed = summary.changed,
            purged = summary.purged,
            tags = summary.tags,
            elapsed_ms = summary.elapsed.as_millis(),
            "build complete"
        );

        Ok(summary)
    }

    /// Write the post-hook source through to the output tree, mirroring
    /// the document's relative path.
    fn write_rendered(&self, docname: &Docname, path: &Path, rendered: &str) -> Result<()> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("txt");
        let out_path = self.output_dir.join(docname.to_rel_path(ext));

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NbcookbookError::io(parent, e))?;
        }
        std::fs::write(&out_path, rendered).map_err(|e| NbcookbookError::io(&out_path, e))
    }

    /// Record the document's index entries and title into the build env.
    ///
    /// This is the engine's generic indexing mechanism: tag hooks only
    /// have to leave `.. index::` directives in the source.
    fn index_document(&self, docname: &Docname, path: &Path, rendered: &str) -> Result<()> {
        let entries = if path.extension().is_some_and(|ext| ext == "ipynb") {
            let notebook = Notebook::from_json_str(rendered)
                .map_err(|e| NbcookbookError::notebook(format!("{docname}: {e}")))?;
            if let Some(title) = notebook.title() {
                self.env.record_title(docname, title);
            }
            notebook_index_entries(&notebook)
        } else {
            text_index_entries(rendered)
        };

        if !entries.is_empty() {
            self.env.tag_index.record(docname, &entries);
        }
        Ok(())
    }

    /// Emit `env-purge-doc` for every document the previous build knew
    /// that no longer exists in the source tree.
    fn purge_removed(
        &self,
        registry: &HookRegistry,
        previous: Option<&BuildRecord>,
        documents: &[(Docname, PathBuf)],
    ) -> Result<usize> {
        let Some(previous) = previous else {
            return Ok(0);
        };

        let current: BTreeSet<&str> = documents
            .iter()
            .map(|(docname, _)| docname.as_str())
            .collect();

        let mut purged = 0;
        for docname in previous.documents.keys() {
            if current.contains(docname.as_str()) {
                continue;
            }
            warn!(docname = %docname, "document removed since previous build, purging");
            registry.emit_doc_purged(&Docname::new(docname.clone()))?;
            purged += 1;
        }
        Ok(purged)
    }
}
