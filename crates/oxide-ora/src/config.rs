//! Adapter configuration.

use std::path::Path;
use std::sync::LazyLock;

use oxide_ora_core::DialectConfig;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{OraError, Result};

/// Default driver name.
pub const DEFAULT_DRIVER_NAME: &str = "oracle";

/// First major release with identity columns and OFFSET/FETCH.
const IDENTITY_MAJOR_VERSION: u32 = 12;

/// `Release 19.0.0.0.0`, or a marketing version such as `11g`, `19c`, `23ai`.
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Release (\d+)|\b(\d+)(?:ai|c|g|i)\b").expect("version pattern should compile")
});

/// Extracts the major version from a `V$VERSION` banner.
#[must_use]
pub fn server_major_version(banner: &str) -> Option<u32> {
    let caps = VERSION.captures(banner)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// Connection and feature configuration of a [`crate::Dialector`].
///
/// The dialect flags are flattened, so a JSON file reads:
///
/// ```json
/// { "dsn": "oracle://scott:tiger@db:1521/ORCLPDB1", "support_returning": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data source name handed to the driver.
    pub dsn: String,
    /// Driver name, `"oracle"` when empty.
    pub driver_name: String,
    /// Server version banner; probed at initialization unless skipped.
    pub server_version: Option<String>,
    /// Do not query `V$VERSION` while initializing.
    pub skip_initialize_with_version: bool,
    /// `ALTER INDEX .. RENAME TO` is unavailable.
    pub dont_support_rename_index: bool,
    /// `ALTER TABLE .. RENAME COLUMN` is unavailable.
    pub dont_support_rename_column: bool,
    /// Read a `NULL` column default as no default at all.
    pub dont_support_null_as_default_value: bool,
    /// Dialect feature flags.
    #[serde(flatten)]
    pub dialect: DialectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
            server_version: None,
            skip_initialize_with_version: false,
            dont_support_rename_index: false,
            dont_support_rename_column: false,
            dont_support_null_as_default_value: false,
            dialect: DialectConfig::default(),
        }
    }
}

impl Config {
    /// Creates a configuration for `dsn` with default flags.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Json`] if the document does not parse.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Io`] if the file cannot be read and
    /// [`OraError::Json`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| OraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Returns the driver name, falling back to [`DEFAULT_DRIVER_NAME`].
    #[must_use]
    pub fn driver_name(&self) -> &str {
        if self.driver_name.is_empty() {
            DEFAULT_DRIVER_NAME
        } else {
            &self.driver_name
        }
    }

    /// Records the server banner and turns on what the version supports.
    pub fn apply_server_version(&mut self, banner: &str) {
        self.server_version = Some(banner.to_string());
        match server_major_version(banner) {
            Some(major) if major >= IDENTITY_MAJOR_VERSION => {
                self.dialect.support_identity = true;
                self.dialect.support_offset_fetch = true;
                info!(version = banner, major, "identity and OFFSET/FETCH enabled");
            }
            Some(major) => info!(version = banner, major, "legacy server version"),
            None => warn!(version = banner, "unrecognized server version"),
        }
    }

    /// Returns whether `DEFAULT expr` is written for a column.
    ///
    /// A `NULL` default is left out when
    /// `dont_support_null_as_default_value` is set.
    #[must_use]
    pub fn declares_default(&self, expr: &str) -> bool {
        !(self.dont_support_null_as_default_value && expr.trim().eq_ignore_ascii_case("NULL"))
    }
}
