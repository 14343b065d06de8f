//! Application configuration for adpt.
//!
//! User config lives at `~/.adpt/adpt.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AdptError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "adpt.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".adpt";

/// JSON Schema every `document.json` is validated against.
pub const DEFAULT_SCHEMA_URL: &str =
    "https://espositoandrea.github.io/adpt-document-schema/schemas/document.schema.json";

/// Asciidoctor locale attribute bundles, indexed by language code.
pub const DEFAULT_LOCALE_URL_TEMPLATE: &str = "https://raw.githubusercontent.com/asciidoctor/asciidoctor/master/data/locale/attributes-{lang}.adoc";

/// Placeholder substituted with the document language in the locale template.
pub const LANG_PLACEHOLDER: &str = "{lang}";

// ---------------------------------------------------------------------------
// Config structs (matching adpt.toml)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote resources (schema, locale bundles).
    #[serde(default)]
    pub remote: RemoteConfig,

    /// On-disk layout of a document directory.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// URL of the document JSON Schema.
    #[serde(default = "default_schema_url")]
    pub schema_url: String,

    /// Locale bundle URL; `{lang}` is replaced with the document language.
    #[serde(default = "default_locale_url_template")]
    pub locale_url_template: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            schema_url: default_schema_url(),
            locale_url_template: default_locale_url_template(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_schema_url() -> String {
    DEFAULT_SCHEMA_URL.into()
}
fn default_locale_url_template() -> String {
    DEFAULT_LOCALE_URL_TEMPLATE.into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[layout]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Subdirectory holding the colophon and chapter fragments.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// File extension of the fragments and of the master document.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Base name of the colophon fragment.
    #[serde(default = "default_colophon")]
    pub colophon: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            extension: default_extension(),
            colophon: default_colophon(),
        }
    }
}

fn default_source_dir() -> String {
    "src".into()
}
fn default_extension() -> String {
    "adoc".into()
}
fn default_colophon() -> String {
    "colophon".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.adpt/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| AdptError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.adpt/adpt.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AdptError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| AdptError::config(format!("failed to parse {}: {e}", path.display())))?;

    if !config.remote.locale_url_template.contains(LANG_PLACEHOLDER) {
        return Err(AdptError::config(format!(
            "{}: locale_url_template must contain {LANG_PLACEHOLDER}",
            path.display()
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AdptError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AdptError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AdptError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
