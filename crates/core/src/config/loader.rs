//! Configuration file loading

use super::schema::{ConfigSchema, PackagingMode};
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, a standard location, or defaults.
    ///
    /// An explicit path must exist; the standard locations are optional.
    /// Environment overrides are applied and the result validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        apply_env_overrides(&mut schema, |key| std::env::var(key).ok())?;
        schema.validate()?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file, no environment)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = ["pngtrim.toml", ".pngtrim.toml", ".config/pngtrim.toml"];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("While parsing {}", path.display()))
}

/// Apply `PNGTRIM_*` overrides on top of file values.
///
/// `lookup` abstracts the environment so overrides can be tested without
/// mutating process state.
pub fn apply_env_overrides(
    schema: &mut ConfigSchema,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(host) = lookup("PNGTRIM_HOST") {
        schema.server.host = host;
    }
    if let Some(port) = lookup("PNGTRIM_PORT") {
        schema.server.port = port
            .parse()
            .map_err(|_| Error::config_invalid(format!("PNGTRIM_PORT is not a port: {}", port)))?;
    }
    if let Some(mode) = lookup("PNGTRIM_PACKAGING") {
        schema.packaging.mode = mode.parse::<PackagingMode>()?;
    }
    if let Some(concurrency) = lookup("PNGTRIM_CONCURRENCY") {
        schema.processing.concurrency = concurrency.parse().map_err(|_| {
            Error::config_invalid(format!(
                "PNGTRIM_CONCURRENCY is not a number: {}",
                concurrency
            ))
        })?;
    }
    if let Some(level) = lookup("PNGTRIM_LOG_LEVEL") {
        schema.logging.level = level;
    }
    Ok(())
}
