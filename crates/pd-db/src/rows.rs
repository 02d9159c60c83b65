//! Text decoding of arbitrary MySQL rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use pd_core::RowRecord;
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

use crate::connection::DbError;

/// Convert every column of `row` to text, keeping the result set's column order.
pub fn row_to_record(row: &MySqlRow) -> Result<RowRecord, DbError> {
    let mut record = RowRecord::with_capacity(row.len());
    for column in row.columns() {
        let value = column_text(row, column.ordinal(), column.name())?;
        record.push(column.name(), value);
    }
    Ok(record)
}

fn column_text(row: &MySqlRow, index: usize, name: &str) -> Result<Option<String>, DbError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(None);
    }

    if let Some(v) = decode::<String>(row, index) {
        return Ok(Some(v));
    }
    if let Some(v) = decode::<i64>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<u64>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<f64>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<f32>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<NaiveDateTime>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<DateTime<Utc>>(row, index) {
        return Ok(Some(v.naive_utc().to_string()));
    }
    if let Some(v) = decode::<NaiveDate>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<NaiveTime>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<bool>(row, index) {
        return Ok(Some(v.to_string()));
    }
    if let Some(v) = decode::<Vec<u8>>(row, index) {
        return Ok(Some(String::from_utf8_lossy(&v).into_owned()));
    }

    Err(DbError::UnsupportedColumn {
        column: name.to_string(),
        type_name: raw.type_info().name().to_string(),
    })
}

/// Decode the value at `index` as `T`, or `None` if the column type is incompatible.
fn decode<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get::<T, _>(index).ok()
}
