use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DbConfig;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),
    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },
}

impl DbConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Open a single connection to the configured database.
///
/// The caller owns the connection and must close it; see [`with_connection`].
pub async fn connect(config: &DbConfig) -> Result<MySqlConnection, DbError> {
    let conn = MySqlConnection::connect_with(&config.connect_options()).await?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Connected to database"
    );
    Ok(conn)
}

/// Close `conn`, folding a close failure into `result`.
///
/// The work's own error wins; a close error only surfaces when the work succeeded.
pub async fn close_after<T>(
    conn: MySqlConnection,
    result: Result<T, DbError>,
) -> Result<T, DbError> {
    match conn.close().await {
        Ok(()) => {
            debug!("Closed database connection");
            result
        }
        Err(e) => {
            warn!(error = %e, "Failed to close database connection");
            match result {
                Ok(_) => Err(DbError::Connection(e)),
                Err(work_err) => Err(work_err),
            }
        }
    }
}
