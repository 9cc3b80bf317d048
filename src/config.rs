//! Studio configuration loaded from TOML.
//!
//! ```toml
//! [admin]
//! password = "change-me"
//!
//! [catalog]
//! bucket = "diagram-assets"
//! public_base_url = "https://example.supabase.co"
//!
//! [export]
//! pixel_ratio = 2.0
//! background = "#ffffff"
//! ```
//!
//! Every section and key is optional. The admin password can also come from
//! the `DIAGRAM_STUDIO_ADMIN_PASSWORD` environment variable, which wins over
//! the file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DEFAULT_BUCKET;
use crate::color::HexColor;
use crate::render::{DEFAULT_PIXEL_RATIO, ResvgRasterizer};

/// Environment variable overriding `[admin] password`.
pub const ADMIN_PASSWORD_ENV: &str = "DIAGRAM_STUDIO_ADMIN_PASSWORD";

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for uploads. Empty disables uploads.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub bucket: String,
    pub public_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            public_base_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Oversampling factor for PNG, PDF and clipboard exports.
    pub pixel_ratio: f32,

    /// Canvas fill behind raster exports. Transparent when unset.
    pub background: Option<HexColor>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            background: None,
        }
    }
}

impl ExportConfig {
    /// A rasterizer configured with this section's background.
    pub fn rasterizer(&self) -> ResvgRasterizer {
        ResvgRasterizer::new().with_background(self.background.clone())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub admin: AdminConfig,
    pub catalog: CatalogConfig,
    pub export: ExportConfig,
}

impl StudioConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or the defaults when no path is given, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!(path = path.display().to_string(); "Loading configuration");
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&content)?
            }
            None => {
                debug!("No configuration file given, using defaults");
                Self::default()
            }
        };

        config.apply_env_override(std::env::var(ADMIN_PASSWORD_ENV).ok());
        Ok(config)
    }

    /// Replaces the admin password with `password` when it is set and non-empty.
    pub fn apply_env_override(&mut self, password: Option<String>) {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            debug!("Admin password taken from environment");
            self.admin.password = password;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.export.pixel_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "export.pixel_ratio must be positive, got {ratio}"
            )));
        }
        if self.catalog.bucket.trim().is_empty() {
            return Err(ConfigError::Validation("catalog.bucket must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = StudioConfig::from_toml("").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.export.pixel_ratio, 2.0);
        assert_eq!(config.catalog.bucket, "diagram-assets");
    }

    #[test]
    fn parses_all_sections() {
        let config = StudioConfig::from_toml(
            r##"
            [admin]
            password = "pw"

            [catalog]
            public_base_url = "https://cdn.test"

            [export]
            pixel_ratio = 3.0
            background = "#fff"
            "##,
        )
        .unwrap();

        assert_eq!(config.admin.password, "pw");
        assert_eq!(config.catalog.public_base_url, "https://cdn.test");
        assert_eq!(config.catalog.bucket, "diagram-assets");
        assert_eq!(config.export.pixel_ratio, 3.0);
        assert_eq!(config.export.background, Some("#fff".parse().unwrap()));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            StudioConfig::from_toml("[export]\npixel_ratio = 0.0"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml("[export]\nbackground = \"white\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml("[catalog]\nbucket = \"\""),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn env_override_replaces_password() {
        let mut config = StudioConfig::default();
        config.admin.password = "file".into();

        config.apply_env_override(Some(String::new()));
        assert_eq!(config.admin.password, "file");

        config.apply_env_override(Some("env".into()));
        assert_eq!(config.admin.password, "env");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[export]\npixel_ratio = 1.5").unwrap();

        let config = StudioConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.export.pixel_ratio, 1.5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StudioConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
