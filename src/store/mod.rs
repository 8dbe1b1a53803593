//! Revision store
//!
//! Owns the `mgrt_revisions` tracking table: creating it, performing a
//! revision against the database, appending to the log and reading the log
//! back. Performing and logging are two separate steps with separate
//! transactions, so a failed `log` can be retried without performing the
//! revision a second time.

mod connection;
pub mod dialect;
mod schema;
mod sqlite;

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "postgres")]
mod postgres;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::{DatabaseConfig, Driver};
use crate::error::{DriverError, Error, Result};
use crate::revision::{parse_id, Direction, Hash, Revision};

pub use connection::{Connection, LogRow};
pub use dialect::Dialect;
pub use schema::TABLE;

type Clock = Box<dyn Fn() -> NaiveDateTime>;

pub struct RevisionStore {
    conn: Box<dyn Connection>,
    dialect: Box<dyn Dialect>,
    clock: Clock,
}

impl RevisionStore {
    pub fn new(conn: impl Connection + 'static, dialect: impl Dialect + 'static) -> Self {
        Self {
            conn: Box::new(conn),
            dialect: Box::new(dialect),
            clock: Box::new(|| Utc::now().naive_utc()),
        }
    }

    /// Store over an open SQLite connection
    pub fn sqlite(conn: rusqlite::Connection) -> Self {
        Self::new(conn, dialect::Sqlite)
    }

    /// Replace the clock used for `created_at`.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Create the tracking table.
    ///
    /// Returns `Error::Initialized` if it already exists.
    pub fn init(&mut self) -> Result<()> {
        match self.conn.batch(self.dialect.init_ddl()) {
            Ok(()) => {
                info!(dialect = self.dialect.name(), "created {}", TABLE);
                Ok(())
            }
            Err(err) if self.dialect.is_already_exists(&err) => Err(Error::Initialized),
            Err(err) => Err(Error::Driver(err)),
        }
    }

    /// Run the revision's SQL for its current direction.
    ///
    /// Refuses with `Error::CheckHashFailed` when the last logged hash for
    /// this id differs from the revision's hash, unless `force` is set, in
    /// which case the revision is marked forced. The marker reflects this
    /// call only. Nothing is logged here.
    pub fn perform(&mut self, revision: &mut Revision, force: bool) -> Result<()> {
        let direction = revision.direction.ok_or(Error::Direction { id: revision.id })?;
        revision.forced = false;

        if let Some(prior) = self.latest(revision.id)? {
            if prior.hash != revision.hash {
                if !force {
                    return Err(Error::CheckHashFailed { id: revision.id });
                }
                warn!(
                    id = revision.id,
                    logged = %hex::encode(prior.hash),
                    current = %hex::encode(revision.hash),
                    "forcing revision past hash check"
                );
                revision.forced = true;
            }
        }

        let query = revision.query()?;
        if query.trim().is_empty() {
            debug!(id = revision.id, direction = direction.as_str(), "empty body, nothing to run");
        } else {
            debug!(id = revision.id, direction = direction.as_str(), sql = query, "running revision");
            self.conn.batch_in_transaction(query)?;
        }

        info!(id = revision.id, direction = direction.as_str(), "performed revision");
        Ok(())
    }

    /// Append a log entry for the revision and stamp its `created_at`.
    ///
    /// The hash is not checked again. With `force` set the forced marker is
    /// refreshed from the log, for callers retrying `log` with a freshly
    /// loaded revision after a forced `perform`.
    pub fn log(&mut self, revision: &mut Revision, force: bool) -> Result<()> {
        let direction = revision.direction.ok_or(Error::Direction { id: revision.id })?;

        if force && !revision.forced {
            if let Some(prior) = self.latest(revision.id)? {
                revision.forced = prior.hash != revision.hash;
            }
        }

        let created_at = (self.clock)().trunc_subsecs(6);
        let sql = format!(
            "INSERT INTO {} (id, hash, direction, created_at) VALUES ({}, {}, {}, {})",
            TABLE,
            self.dialect.placeholder(1),
            self.dialect.placeholder(2),
            self.dialect.placeholder(3),
            self.dialect.placeholder(4),
        );
        let row = LogRow {
            id: revision.id,
            hash: revision.hash.to_vec(),
            direction: direction.as_i64(),
            created_at,
        };

        self.conn
            .insert_row(&sql, &row)
            .map_err(|e| self.classify(e))?;

        revision.created_at = Some(created_at);
        debug!(
            id = revision.id,
            direction = direction.as_str(),
            forced = revision.forced,
            "logged revision"
        );
        Ok(())
    }

    /// Log entries oldest first, optionally limited to `ids`.
    pub fn read_log<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<Vec<Revision>> {
        let ids = parse_ids(ids)?;
        self.entries(&ids)
    }

    /// Log entries newest first, optionally limited to `ids`.
    pub fn read_log_reverse<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<Vec<Revision>> {
        let mut entries = self.read_log(ids)?;
        entries.reverse();
        Ok(entries)
    }

    /// Most recent log entry for `id`
    pub fn latest(&mut self, id: i64) -> Result<Option<Revision>> {
        let sql = format!(
            "{} WHERE id = {} ORDER BY {} LIMIT 1",
            select_sql(),
            self.dialect.placeholder(1),
            self.dialect.log_order(true),
        );

        let rows = self
            .conn
            .query_rows(&sql, &[id])
            .map_err(|e| self.classify(e))?;

        rows.into_iter().next().map(decode).transpose()
    }

    fn entries(&mut self, ids: &[i64]) -> Result<Vec<Revision>> {
        let mut sql = select_sql();
        if !ids.is_empty() {
            let params: Vec<String> = (1..=ids.len()).map(|n| self.dialect.placeholder(n)).collect();
            sql.push_str(&format!(" WHERE id IN ({})", params.join(", ")));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(self.dialect.log_order(false));

        let rows = self
            .conn
            .query_rows(&sql, ids)
            .map_err(|e| self.classify(e))?;

        let mut entries = rows.into_iter().map(decode).collect::<Result<Vec<_>>>()?;
        mark_forced(&mut entries);
        Ok(entries)
    }

    fn classify(&self, err: DriverError) -> Error {
        if self.dialect.is_no_such_table(&err) {
            Error::NotInitialized(err)
        } else {
            Error::Driver(err)
        }
    }
}

/// Open the database named by the configuration.
pub fn open(config: &DatabaseConfig) -> Result<RevisionStore> {
    let address = config.address();

    match config.driver {
        Driver::Sqlite3 => {
            if let Some(parent) = std::path::Path::new(&address).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let conn = rusqlite::Connection::open(&address).map_err(|e| Error::Driver(Box::new(e)))?;
            Ok(RevisionStore::sqlite(conn))
        }
        #[cfg(feature = "postgres")]
        Driver::Postgres => {
            let client = ::postgres::Client::connect(&address, ::postgres::NoTls)
                .map_err(|e| Error::Driver(Box::new(e)))?;
            Ok(RevisionStore::new(client, dialect::Postgres))
        }
        #[cfg(feature = "mysql")]
        Driver::Mysql => {
            let opts = ::mysql::Opts::from_url(&address).map_err(|e| Error::Driver(Box::new(e)))?;
            let conn = ::mysql::Conn::new(opts).map_err(|e| Error::Driver(Box::new(e)))?;
            Ok(RevisionStore::new(conn, dialect::MySql))
        }
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedDriver(other.as_str().to_string())),
    }
}

fn select_sql() -> String {
    format!("SELECT id, hash, direction, created_at FROM {}", TABLE)
}

fn parse_ids<S: AsRef<str>>(ids: &[S]) -> Result<Vec<i64>> {
    ids.iter().map(|id| parse_id(id.as_ref())).collect()
}

fn decode(row: LogRow) -> Result<Revision> {
    let hash: Hash = row.hash.as_slice().try_into().map_err(|_| Error::Malformed {
        id: row.id,
        reason: format!("stored hash is {} bytes", row.hash.len()),
    })?;
    let direction = Direction::from_i64(row.direction).ok_or(Error::Direction { id: row.id })?;

    Ok(Revision {
        id: row.id,
        hash,
        direction: Some(direction),
        created_at: Some(row.created_at),
        ..Default::default()
    })
}

/// An entry is forced when the previous entry for the same id, in
/// chronological order, carries a different hash. `entries` must be oldest
/// first.
fn mark_forced(entries: &mut [Revision]) {
    let mut last: HashMap<i64, Hash> = HashMap::new();
    for entry in entries.iter_mut() {
        if let Some(prev) = last.insert(entry.id, entry.hash) {
            entry.forced = prev != entry.hash;
        }
    }
}
