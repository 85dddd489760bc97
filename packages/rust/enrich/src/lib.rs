//! Notebook enrichment for nbcookbook builds.
//!
//! Two transformations run against every notebook the engine reads:
//! - a *cloud variant* is written beneath the output tree's `colab/`
//!   subdirectory, with a generated dependency setup cell prepended;
//! - the in-memory source gains a raw `.. index::` directive cell carrying
//!   the notebook's tags, feeding the build-wide tag index.
//!
//! [`Enricher`] implements the engine's source-read and doc-purged hooks;
//! the individual operations are exposed for direct use and testing.

pub mod cloud;
pub mod deps;
pub mod enricher;
pub mod setup_cell;
pub mod tags;

pub use cloud::create_cloud_variant;
pub use deps::{PYPI_DEPS_KEY, REQUIRED_FILES_KEY, ResolvedDeps, resolve_deps};
pub use enricher::{COLAB_SUBDIR, Enricher};
pub use setup_cell::build_setup_source;
pub use tags::{TAGS_KEY, UNTAGGED, inject_tags_index};
