use pd_core::RowRecord;
use sqlx::mysql::MySqlConnection;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::config::DbConfig;
use crate::connection::{close_after, connect, DbError};
use crate::rows::row_to_record;

/// Every column of every user, in table column order.
pub const USERS_QUERY: &str = "SELECT * FROM users";

/// Stream the result of `sql` row by row, handing each row to `on_row`.
///
/// Returns the number of rows processed.
pub async fn for_each_row<F>(
    conn: &mut MySqlConnection,
    sql: &str,
    mut on_row: F,
) -> Result<u64, DbError>
where
    F: FnMut(RowRecord),
{
    let mut rows = sqlx::query(sql).fetch(&mut *conn);
    let mut count = 0u64;

    while let Some(row) = rows.next().await {
        let record = row_to_record(&row?)?;
        on_row(record);
        count += 1;
    }

    debug!(rows = count, "Finished streaming rows");
    Ok(count)
}

/// Stream every row of the `users` table on an open connection.
pub async fn for_each_user<F>(conn: &mut MySqlConnection, on_row: F) -> Result<u64, DbError>
where
    F: FnMut(RowRecord),
{
    for_each_row(conn, USERS_QUERY, on_row).await
}

/// Connect, stream every user to `on_row`, and close the connection on every exit path.
pub async fn stream_users<F>(config: &DbConfig, on_row: F) -> Result<u64, DbError>
where
    F: FnMut(RowRecord),
{
    let mut conn = connect(config).await?;
    let result = for_each_user(&mut conn, on_row).await;
    close_after(conn, result).await
}
