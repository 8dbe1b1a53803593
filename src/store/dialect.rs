//! Per-engine SQL differences
//!
//! Each engine reports "table already exists" and "table missing" in its
//! own words. Matching on those words happens here and nowhere else.

use std::error::Error as StdError;

use super::schema::{MYSQL_SCHEMA, POSTGRES_SCHEMA, SQLITE_SCHEMA};
use crate::error::DriverError;

pub trait Dialect {
    fn name(&self) -> &'static str;

    /// DDL creating the tracking table
    fn init_ddl(&self) -> &'static str;

    /// Whether `err` says the tracking table already exists
    fn is_already_exists(&self, err: &DriverError) -> bool;

    /// Whether `err` says the tracking table does not exist
    fn is_no_such_table(&self, err: &DriverError) -> bool;

    /// Bound parameter `n`, counting from 1
    fn placeholder(&self, _n: usize) -> String {
        "?".to_string()
    }

    /// ORDER BY clause for log reads, oldest first unless `descending`
    fn log_order(&self, descending: bool) -> &'static str {
        if descending {
            "created_at DESC"
        } else {
            "created_at ASC"
        }
    }
}

pub struct Sqlite;

pub struct Postgres;

pub struct MySql;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn init_ddl(&self) -> &'static str {
        SQLITE_SCHEMA
    }

    fn is_already_exists(&self, err: &DriverError) -> bool {
        error_text(err).contains("already exists")
    }

    fn is_no_such_table(&self, err: &DriverError) -> bool {
        error_text(err).contains("no such table")
    }

    // rowid breaks ties between entries written within the same microsecond
    fn log_order(&self, descending: bool) -> &'static str {
        if descending {
            "created_at DESC, rowid DESC"
        } else {
            "created_at ASC, rowid ASC"
        }
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn init_ddl(&self) -> &'static str {
        POSTGRES_SCHEMA
    }

    fn is_already_exists(&self, err: &DriverError) -> bool {
        error_text(err).contains("already exists")
    }

    fn is_no_such_table(&self, err: &DriverError) -> bool {
        let text = error_text(err);
        text.contains("relation") && text.contains("does not exist")
    }

    fn placeholder(&self, n: usize) -> String {
        format!("${}", n)
    }
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn init_ddl(&self) -> &'static str {
        MYSQL_SCHEMA
    }

    fn is_already_exists(&self, err: &DriverError) -> bool {
        error_text(err).contains("already exists")
    }

    fn is_no_such_table(&self, err: &DriverError) -> bool {
        error_text(err).contains("doesn't exist")
    }
}

/// Display text of the error and every source below it
fn error_text(err: &DriverError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(msg: &str) -> DriverError {
        msg.into()
    }

    #[test]
    fn test_sqlite_classification() {
        let d = Sqlite;
        assert!(d.is_already_exists(&err("table mgrt_revisions already exists")));
        assert!(d.is_no_such_table(&err("no such table: mgrt_revisions")));
        assert!(!d.is_no_such_table(&err("database is locked")));
        assert_eq!(d.placeholder(3), "?");
    }

    #[test]
    fn test_postgres_classification() {
        let d = Postgres;
        assert!(d.is_already_exists(&err(
            "db error: ERROR: relation \"mgrt_revisions\" already exists"
        )));
        assert!(d.is_no_such_table(&err(
            "db error: ERROR: relation \"mgrt_revisions\" does not exist"
        )));
        assert!(!d.is_no_such_table(&err("db error: ERROR: column \"foo\" does not exist")));
        assert_eq!(d.placeholder(1), "$1");
        assert_eq!(d.placeholder(12), "$12");
    }

    #[test]
    fn test_mysql_classification() {
        let d = MySql;
        assert!(d.is_already_exists(&err(
            "MySqlError { ERROR 1050 (42S01): Table 'mgrt_revisions' already exists }"
        )));
        assert!(d.is_no_such_table(&err(
            "MySqlError { ERROR 1146 (42S02): Table 'test.mgrt_revisions' doesn't exist }"
        )));
        assert_eq!(d.placeholder(2), "?");
    }

    #[test]
    fn test_classification_follows_source_chain() {
        #[derive(Debug)]
        struct Wrapper(DriverError);

        impl std::fmt::Display for Wrapper {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("db error")
            }
        }

        impl StdError for Wrapper {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                let inner: &(dyn StdError + 'static) = &*self.0;
                Some(inner)
            }
        }

        let wrapped: DriverError = Box::new(Wrapper(err("relation \"x\" already exists")));
        assert!(Postgres.is_already_exists(&wrapped));
    }

    #[test]
    fn test_every_dialect_creates_the_same_columns() {
        let dialects: [&dyn Dialect; 3] = [&Sqlite, &Postgres, &MySql];
        for d in dialects {
            let ddl = d.init_ddl();
            assert!(ddl.contains("CREATE TABLE mgrt_revisions"), "{}", d.name());
            for column in ["id ", "hash ", "direction ", "created_at "] {
                assert!(ddl.contains(column), "{} missing {}", d.name(), column);
            }
        }
    }
}
