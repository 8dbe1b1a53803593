//! Revision model
//!
//! A revision is one reversible change: an up body that applies it and a
//! down body that rolls it back. Its hash covers both bodies so that any
//! edit made after the revision was performed is caught before it runs
//! again.

mod source;

pub use source::{DirSource, RevisionSource};

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const HASH_SIZE: usize = 32;

/// Raw SHA-256 digest of a revision's content.
pub type Hash = [u8; HASH_SIZE];

/// Which of the two SQL bodies is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Integer stored in the `direction` column
    pub fn as_i64(self) -> i64 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision {
    pub id: i64,
    pub hash: Hash,
    pub direction: Option<Direction>,
    pub message: String,
    /// Performed despite a hash mismatch with the previous log entry.
    pub forced: bool,
    /// Set by the store when the log entry is written.
    pub created_at: Option<NaiveDateTime>,
    pub up: String,
    pub down: String,
    /// Directory the revision was loaded from, if any.
    pub path: Option<PathBuf>,
}

impl Revision {
    pub fn new(id: i64, up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            id,
            up: up.into(),
            down: down.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Compute and store the content hash.
    ///
    /// Revisions loaded from disk re-read their bodies first, so the hash
    /// reflects what is on disk now rather than what was loaded earlier.
    pub fn gen_hash(&mut self) -> Result<()> {
        if let Some(dir) = &self.path {
            let (up, down) = source::read_bodies(dir).map_err(|source| Error::Hash {
                id: self.id,
                source,
            })?;
            self.up = up;
            self.down = down;
        }

        if self.up.trim().is_empty() {
            return Err(Error::Malformed {
                id: self.id,
                reason: "up body is empty".to_string(),
            });
        }

        self.hash = content_hash(&self.up, &self.down);
        Ok(())
    }

    /// SQL for the active direction
    pub fn query(&self) -> Result<&str> {
        match self.direction {
            Some(Direction::Up) => Ok(&self.up),
            Some(Direction::Down) => Ok(&self.down),
            None => Err(Error::Direction { id: self.id }),
        }
    }
}

/// SHA-256 over the up body followed by the down body.
pub fn content_hash(up: &str, down: &str) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(up.as_bytes());
    hasher.update(down.as_bytes());
    hasher.finalize().into()
}

/// Parse a revision id given on the command line or as a directory name.
pub fn parse_id(id: &str) -> Result<i64> {
    id.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| Error::InvalidId(id.to_string()))
}
