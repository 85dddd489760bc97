//! Shared types, error model, and configuration for nbcookbook.
//!
//! This crate is the foundation depended on by all other nbcookbook crates.
//! It provides:
//! - [`NbcookbookError`] — the unified error type
//! - [`Docname`] — the engine's document naming scheme
//! - Configuration ([`AppConfig`], [`SetupConfig`], config loading)

pub mod config;
pub mod docname;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildSection, CONFIG_FILE_NAME, SetupConfig, SetupSection, init_config_at,
    load_config, load_config_from, validate_base_uri,
};
pub use docname::{Docname, SOURCE_SUFFIXES};
pub use error::{NbcookbookError, Result};
