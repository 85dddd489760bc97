//! The nbcookbook build engine.
//!
//! A deliberately small host: it discovers documents, invokes registered
//! lifecycle hooks ([`events::HookRegistry`]), maintains the shared build
//! environment (titles and the tag index), and emits the index page's
//! template context plus a build record. Everything notebook-specific
//! lives in the extension crates that register hooks against it.

pub mod build;
pub mod events;
pub mod indexing;
pub mod record;
pub mod walk;

pub use build::{BuildEnv, BuildProgress, BuildSummary, Builder, SilentProgress};
pub use events::{DocPurgedHook, HookRegistry, PageContextHook, SourceReadHook};
pub use record::{BUILD_RECORD_FILE, BuildRecord, content_hash};
pub use walk::find_documents;
