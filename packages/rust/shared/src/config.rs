//! Build configuration for nbcookbook.
//!
//! Config lives in `nbcookbook.toml` next to the source tree.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{NbcookbookError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "nbcookbook.toml";

// ---------------------------------------------------------------------------
// Config structs (matching nbcookbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Build tree locations.
    #[serde(default)]
    pub build: BuildSection,

    /// Notebook setup-cell settings.
    #[serde(default)]
    pub setup: SetupSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Directory containing the source documents.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Directory the build writes into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_source_dir() -> String {
    "tutorials".into()
}
fn default_output_dir() -> String {
    "build".into()
}

/// `[setup]` section.
///
/// `default_required_files` is deliberately three-state: absent means
/// "fall back to scanning the notebook's directory for sibling files",
/// while an explicit empty list means "no required files".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupSection {
    /// Packages installed by every generated setup cell unless a notebook
    /// overrides them in its `pypi_dependencies` metadata.
    #[serde(default)]
    pub default_pypi_deps: Vec<String>,

    /// Required files fetched by the setup cell unless a notebook
    /// overrides them in its `required_files` metadata. `None` enables the
    /// sibling-file scan fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_required_files: Option<Vec<String>>,

    /// Base URI that required-file fetch commands download from.
    #[serde(default)]
    pub required_files_base_uri: String,
}

impl Default for SetupSection {
    fn default() -> Self {
        Self {
            default_pypi_deps: Vec::new(),
            default_required_files: None,
            required_files_base_uri: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime setup config (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime settings consumed by the enricher when building setup cells.
#[derive(Debug, Clone, Default)]
pub struct SetupConfig {
    /// Build-wide default package list.
    pub default_pypi_deps: Vec<String>,
    /// Build-wide default required-files list; `None` means unset
    /// (sibling scan), `Some(vec![])` means explicitly none.
    pub default_required_files: Option<Vec<String>>,
    /// Base URI joined with each required file's relative path.
    pub base_uri: String,
}

impl From<&AppConfig> for SetupConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_pypi_deps: config.setup.default_pypi_deps.clone(),
            default_required_files: config.setup.default_required_files.clone(),
            base_uri: config.setup.required_files_base_uri.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config from `<dir>/nbcookbook.toml`. Returns defaults if the
/// file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NbcookbookError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        NbcookbookError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_base_uri(&config)?;
    Ok(config)
}

/// Write a default config file at `<dir>/nbcookbook.toml`.
/// Returns the path to the created file.
pub fn init_config_at(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| NbcookbookError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NbcookbookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NbcookbookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the required-files base URI, when set, is a parseable URL.
pub fn validate_base_uri(config: &AppConfig) -> Result<()> {
    let uri = &config.setup.required_files_base_uri;
    if uri.is_empty() {
        return Ok(());
    }

    Url::parse(uri)
        .map(|_| ())
        .map_err(|e| NbcookbookError::config(format!("invalid required_files_base_uri {uri}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("source_dir"));
        assert!(toml_str.contains("default_pypi_deps"));
        // Unset required files must not serialize as an empty list.
        assert!(!toml_str.contains("default_required_files"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.build.source_dir, "tutorials");
        assert!(parsed.setup.default_required_files.is_none());
    }

    #[test]
    fn empty_required_files_stays_distinct_from_unset() {
        let toml_str = r#"
[setup]
default_pypi_deps = ["openmm"]
default_required_files = []
required_files_base_uri = "https://example.com/notebooks"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.setup.default_required_files, Some(vec![]));

        let setup = SetupConfig::from(&config);
        assert_eq!(setup.default_pypi_deps, vec!["openmm"]);
        assert_eq!(setup.default_required_files, Some(vec![]));
        assert_eq!(setup.base_uri, "https://example.com/notebooks");
    }

    #[test]
    fn base_uri_validation() {
        let mut config = AppConfig::default();
        config.setup.required_files_base_uri = "not a url".into();
        let result = validate_base_uri(&config);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("required_files_base_uri")
        );

        config.setup.required_files_base_uri = String::new();
        assert!(validate_base_uri(&config).is_ok());
    }
}
