//! Lifecycle hook dispatch.
//!
//! Extensions register handlers against three named build events; the
//! engine invokes them synchronously, in registration order:
//!
//! - `source-read`: a document's raw source buffer, mutable in place
//! - `env-purge-doc`: a document was removed or invalidated
//! - `page-context`: a page's template context is being assembled
//!
//! Handlers are shared trait objects so one extension value can register
//! for several events, and must be `Send + Sync` because the engine may
//! read independent documents in parallel. Plain closures register
//! through the `connect_*_fn` variants.

use std::sync::Arc;

use serde_json::{Map, Value};

use nbcookbook_shared::{Docname, Result};

/// Handler for the `source-read` event. May rewrite the source buffer.
pub trait SourceReadHook: Send + Sync {
    fn on_source_read(&self, docname: &Docname, source: &mut Vec<String>) -> Result<()>;
}

/// Handler for the `env-purge-doc` event.
pub trait DocPurgedHook: Send + Sync {
    fn on_doc_purged(&self, docname: &Docname) -> Result<()>;
}

/// Handler for the `page-context` event. May add template context entries.
pub trait PageContextHook: Send + Sync {
    fn on_page_context(&self, page_name: &str, context: &mut Map<String, Value>) -> Result<()>;
}

// Closure adapters. Wrapper types rather than blanket impls so concrete
// extension types can implement the hook traits directly.

struct FnSourceRead<F>(F);

impl<F> SourceReadHook for FnSourceRead<F>
where
    F: Fn(&Docname, &mut Vec<String>) -> Result<()> + Send + Sync,
{
    fn on_source_read(&self, docname: &Docname, source: &mut Vec<String>) -> Result<()> {
        (self.0)(docname, source)
    }
}

struct FnDocPurged<F>(F);

impl<F> DocPurgedHook for FnDocPurged<F>
where
    F: Fn(&Docname) -> Result<()> + Send + Sync,
{
    fn on_doc_purged(&self, docname: &Docname) -> Result<()> {
        (self.0)(docname)
    }
}

struct FnPageContext<F>(F);

impl<F> PageContextHook for FnPageContext<F>
where
    F: Fn(&str, &mut Map<String, Value>) -> Result<()> + Send + Sync,
{
    fn on_page_context(&self, page_name: &str, context: &mut Map<String, Value>) -> Result<()> {
        (self.0)(page_name, context)
    }
}

/// Ordered handler lists for each build event.
#[derive(Default)]
pub struct HookRegistry {
    source_read: Vec<Arc<dyn SourceReadHook>>,
    doc_purged: Vec<Arc<dyn DocPurgedHook>>,
    page_context: Vec<Arc<dyn PageContextHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_source_read(&mut self, hook: Arc<dyn SourceReadHook>) {
        self.source_read.push(hook);
    }

    pub fn connect_source_read_fn<F>(&mut self, hook: F)
    where
        F: Fn(&Docname, &mut Vec<String>) -> Result<()> + Send + Sync + 'static,
    {
        self.source_read.push(Arc::new(FnSourceRead(hook)));
    }

    pub fn connect_doc_purged(&mut self, hook: Arc<dyn DocPurgedHook>) {
        self.doc_purged.push(hook);
    }

    pub fn connect_doc_purged_fn<F>(&mut self, hook: F)
    where
        F: Fn(&Docname) -> Result<()> + Send + Sync + 'static,
    {
        self.doc_purged.push(Arc::new(FnDocPurged(hook)));
    }

    pub fn connect_page_context(&mut self, hook: Arc<dyn PageContextHook>) {
        self.page_context.push(hook);
    }

    pub fn connect_page_context_fn<F>(&mut self, hook: F)
    where
        F: Fn(&str, &mut Map<String, Value>) -> Result<()> + Send + Sync + 'static,
    {
        self.page_context.push(Arc::new(FnPageContext(hook)));
    }

    /// Invoke all `source-read` handlers in registration order. The first
    /// error aborts and fails the document.
    pub fn emit_source_read(&self, docname: &Docname, source: &mut Vec<String>) -> Result<()> {
        for hook in &self.source_read {
            hook.on_source_read(docname, source)?;
        }
        Ok(())
    }

    /// Invoke all `env-purge-doc` handlers in registration order.
    pub fn emit_doc_purged(&self, docname: &Docname) -> Result<()> {
        for hook in &self.doc_purged {
            hook.on_doc_purged(docname)?;
        }
        Ok(())
    }

    /// Invoke all `page-context` handlers in registration order.
    pub fn emit_page_context(
        &self,
        page_name: &str,
        context: &mut Map<String, Value>,
    ) -> Result<()> {
        for hook in &self.page_context {
            hook.on_page_context(page_name, context)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("source_read", &self.source_read.len())
            .field("doc_purged", &self.doc_purged.len())
            .field("page_context", &self.page_context.len())
            .finish()
    }
}
