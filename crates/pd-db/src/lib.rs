//! MySQL access for the personal-data tools: environment configuration, a
//! scoped connection, and streaming of table rows as [`pd_core::RowRecord`]s.

pub mod config;
pub mod connection;
pub mod queries;
pub mod rows;

pub use config::{ConfigError, DbConfig};
pub use connection::{connect, DbError};
pub use queries::{for_each_row, for_each_user, stream_users};
