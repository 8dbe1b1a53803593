//! Error taxonomy shared by the revision model and the store

use thiserror::Error;

/// Error type returned by database drivers, passed through untouched.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The tracking table already exists. Expected on repeated `init`.
    #[error("database already initialized")]
    Initialized,

    /// The revision's current hash differs from the last logged one.
    #[error("revision {id}: hash check failed, revision changed since it was last performed")]
    CheckHashFailed { id: i64 },

    /// The tracking table is missing.
    #[error("database not initialized")]
    NotInitialized(#[source] DriverError),

    /// Revision content could not be read for hashing.
    #[error("revision {id}: failed to generate hash")]
    Hash {
        id: i64,
        #[source]
        source: std::io::Error,
    },

    /// Revision content or a stored log entry is not usable as is.
    #[error("revision {id}: malformed: {reason}")]
    Malformed { id: i64, reason: String },

    #[error("revision {id}: no direction set")]
    Direction { id: i64 },

    #[error("revision not found: {id}")]
    NotFound { id: String },

    #[error("invalid revision id: {0}")]
    InvalidId(String),

    #[error("unsupported database type: {0}")]
    UnsupportedDriver(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
