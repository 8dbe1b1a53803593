//! Postgres connection via the blocking `postgres` client

use postgres::types::ToSql;
use postgres::Client;

use super::connection::{Connection, LogRow};
use crate::error::DriverError;

impl Connection for Client {
    fn batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.batch_execute(sql)?;
        Ok(())
    }

    fn batch_in_transaction(&mut self, sql: &str) -> Result<(), DriverError> {
        let mut tx = self.transaction()?;
        tx.batch_execute(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_row(&mut self, sql: &str, row: &LogRow) -> Result<(), DriverError> {
        // direction is an INT column
        let direction = i32::try_from(row.direction)?;
        self.execute(sql, &[&row.id, &row.hash, &direction, &row.created_at])?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str, ids: &[i64]) -> Result<Vec<LogRow>, DriverError> {
        let params: Vec<&(dyn ToSql + Sync)> =
            ids.iter().map(|id| id as &(dyn ToSql + Sync)).collect();

        let rows = self.query(sql, &params)?;
        rows.iter()
            .map(|row| -> Result<LogRow, DriverError> {
                Ok(LogRow {
                    id: row.try_get(0)?,
                    hash: row.try_get(1)?,
                    direction: i64::from(row.try_get::<_, i32>(2)?),
                    created_at: row.try_get(3)?,
                })
            })
            .collect()
    }
}
