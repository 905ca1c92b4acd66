//! Opening and initializing an Oracle connection.

use std::sync::Arc;

use oxide_ora_core::{OracleDialect, SqlValue};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::conn::{Connection, Driver};
use crate::error::{OraError, Result};
use crate::session::Session;

/// Dialect name.
pub const DIALECTOR_NAME: &str = "oracle";

/// Query returning the server banner.
pub const VERSION_SQL: &str = "SELECT BANNER FROM V$VERSION WHERE BANNER LIKE 'Oracle%'";

/// Builds a [`Session`] from a [`Config`] and a connection source.
pub struct Dialector {
    config: Config,
    conn: Option<Arc<dyn Connection>>,
    driver: Option<Arc<dyn Driver>>,
}

impl Dialector {
    /// Creates a dialector for `dsn` with default flags.
    pub fn open(dsn: impl Into<String>) -> Self {
        Self::new(Config::new(dsn))
    }

    /// Creates a dialector from a configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            conn: None,
            driver: None,
        }
    }

    /// Uses an already open connection.
    #[must_use]
    pub fn with_conn(mut self, conn: Arc<dyn Connection>) -> Self {
        self.conn = Some(conn);
        self
    }

    /// Opens the connection through `driver` at initialization.
    #[must_use]
    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        DIALECTOR_NAME
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Connects, probes the server version and returns a session.
    ///
    /// An injected connection wins over a driver. The version probe is
    /// skipped when `skip_initialize_with_version` is set; a configured
    /// `server_version` is then used instead.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::NoConnection`] without a connection source,
    /// [`OraError::Open`] if the driver fails and [`OraError::Query`] if
    /// the version probe fails.
    pub async fn initialize(self) -> Result<Session> {
        let mut config = self.config;
        if config.driver_name.is_empty() {
            config.driver_name = DIALECTOR_NAME.to_string();
        }

        let conn = match (self.conn, self.driver) {
            (Some(conn), _) => conn,
            (None, Some(driver)) => {
                debug!(driver = %config.driver_name, "opening connection");
                driver
                    .open(&config.dsn)
                    .await
                    .map_err(|source| OraError::Open {
                        driver: config.driver_name.clone(),
                        source,
                    })?
            }
            (None, None) => {
                return Err(OraError::NoConnection {
                    driver: config.driver_name.clone(),
                })
            }
        };

        if !config.skip_initialize_with_version {
            let banner = conn
                .query_scalar(VERSION_SQL, &[])
                .await
                .map_err(|source| OraError::Query {
                    sql: VERSION_SQL.to_string(),
                    source,
                })?;
            match banner {
                Some(SqlValue::Text(banner)) => config.server_version = Some(banner),
                other => warn!(?other, "version probe returned no banner"),
            }
        }
        if let Some(banner) = config.server_version.clone() {
            config.apply_server_version(&banner);
        }

        let dialect = OracleDialect::new(config.dialect.clone());
        info!(
            driver = %config.driver_name,
            returning = dialect.config().support_returning,
            identity = dialect.config().support_identity,
            "initialized oracle dialect"
        );
        Ok(Session::new(conn, dialect, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(Dialector::open("oracle://db").name(), "oracle");
    }
}
