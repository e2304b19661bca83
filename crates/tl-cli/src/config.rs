//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::HostId;

/// Fields a CSV report shows when none are requested.
pub const DEFAULT_CSV_FIELDS: [&str; 4] = ["TIMESTAMP", "DURATION", "TITLE", "TAGS"];

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the log documents of every machine.
    pub log_dir: PathBuf,

    /// File name of this machine's log inside `log_dir` (default `<host>.org`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_document: Option<String>,

    /// Identifier used as the entry id prefix (default: hostname).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,

    /// Glob, relative to `log_dir`, selecting source documents.
    pub source_pattern: String,

    /// Fields for `tl csv` when `--fields` is not given.
    pub csv_fields: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_dir", &self.log_dir)
            .field("active_document", &self.active_document)
            .field("host_id", &self.host_id)
            .field("source_pattern", &self.source_pattern)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_dir: data_dir,
            active_document: None,
            host_id: None,
            source_pattern: "*.org".to_string(),
            csv_fields: DEFAULT_CSV_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TL_*)
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    /// Path of the document this machine appends to.
    pub fn active_document_path(&self, host: &HostId) -> PathBuf {
        let name = self
            .active_document
            .clone()
            .unwrap_or_else(|| format!("{host}.org"));
        self.log_dir.join(name)
    }
}

/// Returns the platform-specific config directory for timelog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timelog"))
}

/// Returns the platform-specific data directory for timelog.
///
/// On Linux: `~/.local/share/timelog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("timelog"))
}
