//! MySQL connection via the `mysql` client

use chrono::{NaiveDate, NaiveDateTime};
use mysql::prelude::{FromValue, Queryable};
use mysql::{Conn, Params, Row, TxOpts, Value};

use super::connection::{parse_timestamp, Connection, LogRow, TIMESTAMP_FORMAT};
use crate::error::DriverError;

impl Connection for Conn {
    fn batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.query_drop(sql)?;
        Ok(())
    }

    // DDL commits implicitly on MySQL, so only DML is rolled back on failure.
    fn batch_in_transaction(&mut self, sql: &str) -> Result<(), DriverError> {
        let mut tx = self.start_transaction(TxOpts::default())?;
        tx.query_drop(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_row(&mut self, sql: &str, row: &LogRow) -> Result<(), DriverError> {
        let created_at = row.created_at.format(TIMESTAMP_FORMAT).to_string();
        self.exec_drop(
            sql,
            (row.id, row.hash.clone(), row.direction, created_at),
        )?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str, ids: &[i64]) -> Result<Vec<LogRow>, DriverError> {
        let params = if ids.is_empty() {
            Params::Empty
        } else {
            Params::Positional(ids.iter().map(|id| Value::from(*id)).collect())
        };

        let rows: Vec<Row> = self.exec(sql, params)?;
        rows.into_iter()
            .map(|mut row| -> Result<LogRow, DriverError> {
                Ok(LogRow {
                    id: column(&mut row, 0)?,
                    hash: column(&mut row, 1)?,
                    direction: column(&mut row, 2)?,
                    created_at: datetime(column(&mut row, 3)?)?,
                })
            })
            .collect()
    }
}

fn column<T: FromValue>(row: &mut Row, index: usize) -> Result<T, DriverError> {
    match row.take_opt::<T, usize>(index) {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(format!("column {}: {:?}", index, e).into()),
        None => Err(format!("column {}: missing", index).into()),
    }
}

fn datetime(value: Value) -> Result<NaiveDateTime, DriverError> {
    match value {
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                .and_then(|d| {
                    d.and_hms_micro_opt(
                        u32::from(hour),
                        u32::from(minute),
                        u32::from(second),
                        micros,
                    )
                })
                .ok_or_else(|| DriverError::from("created_at out of range"))
        }
        Value::Bytes(bytes) => parse_timestamp(&String::from_utf8_lossy(&bytes)),
        other => Err(format!("unexpected created_at value: {:?}", other).into()),
    }
}
