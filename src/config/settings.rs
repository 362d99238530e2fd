//! Application settings loaded once per process.
//!
//! Settings come from an optional TOML file (`config.toml`, or the path named by
//! `ANTIQUES_CONFIG`) and are then overlaid with `DATABASE_URL` and `UPLOAD_URL`
//! from the environment. The resulting [`AppConfig`] is shared read-only by every
//! handler invocation.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default upload endpoint for the image proxy.
pub const DEFAULT_UPLOAD_URL: &str = "https://cdn.poehali.dev/upload";

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Connection string for the backing store (`postgres://...` or `sqlite://...`)
    pub database_url: String,
    /// Upper bound for pooled store connections
    pub max_connections: u32,
    /// External upload endpoint settings
    pub upload: UploadConfig,
    /// Image recompression settings
    pub image: ImageConfig,
}

/// Settings for the upstream upload endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint that receives forwarded image bytes
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Settings for the image compressor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest allowed side, in pixels, after downscaling
    pub max_dimension: u32,
    /// JPEG quality (1-100) used when re-encoding
    pub jpeg_quality: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 5,
            upload: UploadConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPLOAD_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            jpeg_quality: 85,
        }
    }
}

impl UploadConfig {
    /// Timeout applied to the whole upstream request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Replaces file values with the ones supplied by the environment, when present.
    #[must_use]
    pub fn with_overrides(mut self, database_url: Option<String>, upload_url: Option<String>) -> Self {
        if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(url) = upload_url.filter(|u| !u.trim().is_empty()) {
            self.upload.url = url;
        }
        self
    }

    /// Checks that the settings are usable before any handler runs.
    ///
    /// The database URL is checked when a connection is opened, so the image
    /// handlers can run without one.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config {
                message: "max_connections must be at least 1".to_string(),
            });
        }
        if self.image.max_dimension == 0 {
            return Err(Error::Config {
                message: "image.max_dimension must be positive".to_string(),
            });
        }
        if !(1..=100).contains(&self.image.jpeg_quality) {
            return Err(Error::Config {
                message: format!(
                    "image.jpeg_quality must be within 1..=100, got {}",
                    self.image.jpeg_quality
                ),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Builds the process-wide configuration: optional settings file, then environment.
///
/// A missing settings file is not an error; every key has a default. The database
/// URL has to come from one of the two sources before a connection can be opened.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("ANTIQUES_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let file_config = if Path::new(&path).exists() {
        info!("Loading settings from {}", path);
        load_config(&path)?
    } else {
        debug!("No settings file at {}, using defaults", path);
        AppConfig::default()
    };

    let config = file_config.with_overrides(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("UPLOAD_URL").ok(),
    );
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "postgres://shop@localhost/antiques"
            max_connections = 2

            [upload]
            url = "http://127.0.0.1:9000/upload"
            timeout_secs = 10

            [image]
            max_dimension = 1200
            jpeg_quality = 70
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url, "postgres://shop@localhost/antiques");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.upload.url, "http://127.0.0.1:9000/upload");
        assert_eq!(config.upload.timeout(), Duration::from_secs(10));
        assert_eq!(config.image.max_dimension, 1200);
        assert_eq!(config.image.jpeg_quality, 70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("database_url = \"sqlite::memory:\"").unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.upload.url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.upload.timeout_secs, 30);
        assert_eq!(config.image.max_dimension, 800);
        assert_eq!(config.image.jpeg_quality, 85);
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let config = AppConfig {
            database_url: "sqlite://file.db".to_string(),
            ..AppConfig::default()
        }
        .with_overrides(
            Some("postgres://env/db".to_string()),
            Some("http://env/upload".to_string()),
        );
        assert_eq!(config.database_url, "postgres://env/db");
        assert_eq!(config.upload.url, "http://env/upload");

        let untouched = AppConfig {
            database_url: "sqlite://file.db".to_string(),
            ..AppConfig::default()
        }
        .with_overrides(Some("   ".to_string()), None);
        assert_eq!(untouched.database_url, "sqlite://file.db");
    }

    #[test]
    fn test_defaults_are_valid_without_database_url() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = AppConfig::default().with_overrides(Some("sqlite::memory:".to_string()), None);
        config.image.jpeg_quality = 0;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
