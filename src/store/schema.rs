//! Tracking table definition
//!
//! Column semantics are the same on every engine:
//! - id: revision id
//! - hash: raw 32 byte SHA-256 of the revision content
//! - direction: 0 = up, 1 = down
//! - created_at: UTC time the log entry was written

pub const TABLE: &str = "mgrt_revisions";

pub const SQLITE_SCHEMA: &str = r#"
CREATE TABLE mgrt_revisions (
    id         INTEGER NOT NULL,
    hash       BLOB NOT NULL,
    direction  INTEGER NOT NULL,
    created_at TIMESTAMP NOT NULL
);
"#;

pub const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE mgrt_revisions (
    id         BIGINT NOT NULL,
    hash       BYTEA NOT NULL,
    direction  INT NOT NULL,
    created_at TIMESTAMP NOT NULL
);
"#;

// DATETIME(6) keeps microseconds so entries written in the same second
// still sort correctly.
pub const MYSQL_SCHEMA: &str = r#"
CREATE TABLE mgrt_revisions (
    id         BIGINT NOT NULL,
    hash       BINARY(32) NOT NULL,
    direction  INT NOT NULL,
    created_at DATETIME(6) NOT NULL
);
"#;
