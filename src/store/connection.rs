//! Driver seam
//!
//! The store builds every statement itself (through its `Dialect`) and
//! hands it to a `Connection` to run. Implementations only bind values and
//! decode rows.

use chrono::NaiveDateTime;

use crate::error::DriverError;

/// Timestamp text for engines that store `created_at` as a string
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One tracking table row as it crosses the driver boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub id: i64,
    pub hash: Vec<u8>,
    pub direction: i64,
    pub created_at: NaiveDateTime,
}

pub trait Connection {
    /// Run one or more statements outside an explicit transaction.
    fn batch(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Run one or more statements in a single transaction. Nothing is
    /// committed unless every statement succeeds.
    fn batch_in_transaction(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Insert a row. `sql` binds id, hash, direction and created_at in that
    /// order.
    fn insert_row(&mut self, sql: &str, row: &LogRow) -> Result<(), DriverError>;

    /// Select rows. `sql` selects id, hash, direction and created_at and
    /// binds each of `ids` in order.
    fn query_rows(&mut self, sql: &str, ids: &[i64]) -> Result<Vec<LogRow>, DriverError>;
}

pub(crate) fn parse_timestamp(text: &str) -> Result<NaiveDateTime, DriverError> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").map_err(|e| {
        let msg = format!("malformed created_at {:?}: {}", text, e);
        DriverError::from(msg)
    })
}
