//! Configuration schema definitions
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub packaging: PackagingConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.naming.marker.is_empty() {
            return Err(Error::config_invalid("naming.marker must not be empty"));
        }
        if self.processing.concurrency == 0 {
            return Err(Error::config_invalid("processing.concurrency must be at least 1"));
        }
        if self.server.max_body_bytes == 0 {
            return Err(Error::config_invalid("server.max_body_bytes must be greater than 0"));
        }
        let archive_name = &self.packaging.archive_name;
        if archive_name.is_empty() || !archive_name.ends_with(".zip") {
            return Err(Error::config_invalid(format!(
                "packaging.archive_name must end in .zip, got {:?}",
                archive_name
            ))
            .with_suggestion("Use a name like \"processed-images.zip\""));
        }
        if archive_name.contains(['"', '/', '\\']) {
            return Err(Error::config_invalid(
                "packaging.archive_name must not contain quotes or path separators",
            ));
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

/// Output filename configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Token inserted before the extension of renamed outputs
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
        }
    }
}

fn default_marker() -> String {
    "-processed".to_string()
}

/// How responses with more than one image are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackagingMode {
    /// One zip archive with an entry per image
    #[default]
    Archive,
    /// JSON list of base64-encoded images
    Inline,
}

impl fmt::Display for PackagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingMode::Archive => write!(f, "archive"),
            PackagingMode::Inline => write!(f, "inline"),
        }
    }
}

impl FromStr for PackagingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "archive" | "zip" => Ok(Self::Archive),
            "inline" | "json" => Ok(Self::Inline),
            other => Err(Error::config_invalid(format!(
                "Unknown packaging mode: {}",
                other
            ))
            .with_suggestion("Use \"archive\" or \"inline\"")),
        }
    }
}

/// Multi-image packaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// Response shape for batches of more than one image
    #[serde(default)]
    pub mode: PackagingMode,

    /// Download name of the zip bundle
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            mode: PackagingMode::default(),
            archive_name: default_archive_name(),
        }
    }
}

fn default_archive_name() -> String {
    "processed-images.zip".to_string()
}

/// What to do with an image that has no visible pixels at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyImagePolicy {
    /// Re-encode the image unchanged at its original size
    #[default]
    Passthrough,
    /// Collapse to a single fully transparent pixel
    SinglePixel,
}

/// Trimming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Images trimmed at the same time within one request
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Handling of fully transparent images
    #[serde(default)]
    pub empty_image: EmptyImagePolicy,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            empty_image: EmptyImagePolicy::default(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.server.port, 3000);
        assert_eq!(schema.naming.marker, "-processed");
        assert_eq!(schema.packaging.mode, PackagingMode::Archive);
        assert_eq!(schema.packaging.archive_name, "processed-images.zip");
        assert_eq!(schema.processing.concurrency, 4);
        assert_eq!(schema.processing.empty_image, EmptyImagePolicy::Passthrough);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [packaging]
            mode = "inline"

            [processing]
            empty_image = "single_pixel"
            "#,
        )
        .unwrap();

        assert_eq!(schema.packaging.mode, PackagingMode::Inline);
        assert_eq!(schema.packaging.archive_name, "processed-images.zip");
        assert_eq!(schema.processing.empty_image, EmptyImagePolicy::SinglePixel);
        assert_eq!(schema.processing.concurrency, 4);
        assert_eq!(schema.server.host, "0.0.0.0");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut schema = ConfigSchema::default();
        schema.processing.concurrency = 0;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let mut schema = ConfigSchema::default();
        schema.naming.marker.clear();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_archive_name() {
        let mut schema = ConfigSchema::default();
        schema.packaging.archive_name = "bundle.tar".to_string();
        assert!(schema.validate().is_err());

        schema.packaging.archive_name = "a\"b.zip".to_string();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_packaging_mode_from_str() {
        assert_eq!("archive".parse::<PackagingMode>().unwrap(), PackagingMode::Archive);
        assert_eq!("JSON".parse::<PackagingMode>().unwrap(), PackagingMode::Inline);
        assert!("tarball".parse::<PackagingMode>().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 1,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:8080");
    }
}
