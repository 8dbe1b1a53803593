//! SQLite connection via rusqlite

use rusqlite::{params, params_from_iter};

use super::connection::{parse_timestamp, Connection, LogRow, TIMESTAMP_FORMAT};
use crate::error::DriverError;

impl Connection for rusqlite::Connection {
    fn batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.execute_batch(sql)?;
        Ok(())
    }

    fn batch_in_transaction(&mut self, sql: &str) -> Result<(), DriverError> {
        // Dropping the transaction without commit rolls it back
        let tx = self.transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_row(&mut self, sql: &str, row: &LogRow) -> Result<(), DriverError> {
        let created_at = row.created_at.format(TIMESTAMP_FORMAT).to_string();
        self.execute(sql, params![row.id, row.hash, row.direction, created_at])?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str, ids: &[i64]) -> Result<Vec<LogRow>, DriverError> {
        let mut stmt = self.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, hash, direction, created_at) = row?;
            out.push(LogRow {
                id,
                hash,
                direction,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(out)
    }
}
