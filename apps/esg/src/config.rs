//! # Configuration
//!
//! Optional TOML file plus global CLI flags.
//!
//! Precedence for every setting: CLI flag, then config file, then default.
//!
//! ```toml
//! database = "esg.redb"
//! backend = "redb"        # or "file"
//! log_format = "json"     # or "text"
//!
//! [report]
//! cumulative_recommendations = false  # default true
//! ```

use esg_core::EsgError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default database path.
pub const DEFAULT_DATABASE: &str = "esg.redb";

/// Maximum accepted config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// BACKEND
// =============================================================================

/// Storage backend selected for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// redb database (ACID, on disk).
    #[default]
    Redb,
    /// In-memory store loaded from and saved to a JSON file.
    File,
}

impl Backend {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Redb => "redb",
            Backend::File => "file",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = EsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Backend::Redb),
            "file" | "json" => Ok(Backend::File),
            other => Err(EsgError::Configuration(format!(
                "unknown backend {:?} (expected \"redb\" or \"file\")",
                other
            ))),
        }
    }
}

// =============================================================================
// CONFIG FILE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub cumulative_recommendations: Option<bool>,
}

/// Contents of the TOML config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EsgConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub log_format: Option<String>,
    #[serde(default)]
    pub report: ReportConfig,
}

impl EsgConfig {
    /// Parse config text.
    pub fn parse(text: &str) -> Result<Self, EsgError> {
        toml::from_str(text).map_err(|e| EsgError::Configuration(format!("invalid config: {}", e)))
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, EsgError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            EsgError::Configuration(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(EsgError::Configuration(format!(
                "config '{}' exceeds {} bytes",
                path.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            EsgError::Configuration(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&text)
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Settings after applying precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub backend: Backend,
    pub json_mode: bool,
    pub cumulative_recommendations: bool,
}

impl Settings {
    /// Merge CLI values over the config file over defaults.
    pub fn resolve(
        database: Option<PathBuf>,
        backend: Option<&str>,
        json_mode: bool,
        config: &EsgConfig,
    ) -> Result<Self, EsgError> {
        let backend = match backend.or(config.backend.as_deref()) {
            Some(name) => name.parse()?,
            None => Backend::default(),
        };

        Ok(Self {
            database: database
                .or_else(|| config.database.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            backend,
            json_mode,
            cumulative_recommendations: config.report.cumulative_recommendations.unwrap_or(true),
        })
    }
}

/// Log format: `ESG_LOG_FORMAT`, then the config file, then text.
#[must_use]
pub fn log_format(env_value: Option<String>, config: &EsgConfig) -> String {
    env_value
        .or_else(|| config.log_format.clone())
        .unwrap_or_else(|| "text".to_string())
}

// =============================================================================
// TESTS
// =============================================================================
