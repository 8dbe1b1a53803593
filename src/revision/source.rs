//! Revision sources
//!
//! On disk every revision is a directory named after its id:
//!
//! ```text
//! revisions/
//!   1136214245/
//!     up.sql
//!     down.sql
//!     _message
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::{parse_id, Revision};
use crate::error::{Error, Result};

const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";
const MESSAGE_FILE: &str = "_message";

/// Where revisions are loaded from
pub trait RevisionSource {
    /// Load one revision by id
    fn find(&self, id: &str) -> Result<Revision>;

    /// All revisions, ordered by ascending id
    fn list(&self) -> Result<Vec<Revision>>;
}

/// Revisions stored as directories under a root
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create an empty revision directory and return its path.
    pub fn create(&self, id: i64, message: &str) -> Result<PathBuf> {
        let dir = self.root.join(id.to_string());
        if dir.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("revision {} already exists", id),
            )));
        }

        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(UP_FILE), "")?;
        std::fs::write(dir.join(DOWN_FILE), "")?;
        if !message.is_empty() {
            std::fs::write(dir.join(MESSAGE_FILE), format!("{}\n", message))?;
        }

        Ok(dir)
    }

    fn load(&self, id: i64, dir: &Path) -> Result<Revision> {
        let (up, down) = read_bodies(dir)?;
        let message = match std::fs::read_to_string(dir.join(MESSAGE_FILE)) {
            Ok(m) => m.trim().to_string(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Revision {
            id,
            message,
            up,
            down,
            path: Some(dir.to_path_buf()),
            ..Default::default()
        })
    }
}

impl RevisionSource for DirSource {
    fn find(&self, id: &str) -> Result<Revision> {
        let parsed = parse_id(id)?;
        let dir = self.root.join(parsed.to_string());

        if !dir.is_dir() {
            return Err(Error::NotFound { id: id.to_string() });
        }

        self.load(parsed, &dir)
    }

    fn list(&self) -> Result<Vec<Revision>> {
        if !self.root.is_dir() {
            return Ok(vec![]);
        }

        let mut revisions = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }

            // Skip anything that is not named like a revision. Ids are
            // looked up by their canonical form, so "0010" would never be found.
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let Some(id) = parse_id(name).ok().filter(|id| id.to_string() == name) else {
                debug!(path = %entry.path().display(), "skipping non-revision directory");
                continue;
            };

            revisions.push(self.load(id, entry.path())?);
        }

        revisions.sort_by_key(|r| r.id);
        Ok(revisions)
    }
}

/// Read the up and down bodies. A missing down body reads as empty.
pub(crate) fn read_bodies(dir: &Path) -> io::Result<(String, String)> {
    let up = std::fs::read_to_string(dir.join(UP_FILE))?;
    let down = match std::fs::read_to_string(dir.join(DOWN_FILE)) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    Ok((up, down))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_revision(root: &Path, id: &str, up: &str, down: Option<&str>, message: Option<&str>) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(UP_FILE), up).unwrap();
        if let Some(down) = down {
            std::fs::write(dir.join(DOWN_FILE), down).unwrap();
        }
        if let Some(message) = message {
            std::fs::write(dir.join(MESSAGE_FILE), message).unwrap();
        }
    }

    #[test]
    fn test_find_loads_bodies_and_message() {
        let tmp = TempDir::new().unwrap();
        write_revision(
            tmp.path(),
            "1136214245",
            "CREATE TABLE example (id INT);",
            Some("DROP TABLE example;"),
            Some("Create example table\n"),
        );

        let source = DirSource::new(tmp.path());
        let rev = source.find("1136214245").unwrap();
        assert_eq!(rev.id, 1136214245);
        assert_eq!(rev.up, "CREATE TABLE example (id INT);");
        assert_eq!(rev.down, "DROP TABLE example;");
        assert_eq!(rev.message, "Create example table");
        assert!(rev.direction.is_none());
    }

    #[test]
    fn test_find_missing_revision() {
        let tmp = TempDir::new().unwrap();
        let source = DirSource::new(tmp.path());
        assert!(matches!(source.find("42"), Err(Error::NotFound { .. })));
        assert!(matches!(source.find("nope"), Err(Error::InvalidId(_))));
    }

    #[test]
    fn test_missing_down_reads_empty() {
        let tmp = TempDir::new().unwrap();
        write_revision(tmp.path(), "10", "SELECT 1;", None, None);

        let rev = DirSource::new(tmp.path()).find("10").unwrap();
        assert_eq!(rev.down, "");
        assert_eq!(rev.message, "");
    }

    #[test]
    fn test_list_is_sorted_and_skips_strays() {
        let tmp = TempDir::new().unwrap();
        write_revision(tmp.path(), "30", "SELECT 3;", None, None);
        write_revision(tmp.path(), "10", "SELECT 1;", None, None);
        write_revision(tmp.path(), "20", "SELECT 2;", None, None);
        std::fs::create_dir_all(tmp.path().join("drafts")).unwrap();
        std::fs::write(tmp.path().join("README"), "notes").unwrap();

        let ids: Vec<i64> = DirSource::new(tmp.path())
            .list()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_list_only_returns_findable_revisions() {
        let tmp = TempDir::new().unwrap();
        write_revision(tmp.path(), "10", "SELECT 1;", None, None);
        write_revision(tmp.path(), "0020", "SELECT 2;", None, None);
        write_revision(tmp.path(), "+30", "SELECT 3;", None, None);

        let source = DirSource::new(tmp.path());
        let listed = source.list().unwrap();
        let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10]);

        for rev in &listed {
            assert_eq!(source.find(&rev.id.to_string()).unwrap().up, rev.up);
        }
        assert!(matches!(source.find("0020"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_list_missing_root() {
        let tmp = TempDir::new().unwrap();
        let source = DirSource::new(tmp.path().join("revisions"));
        assert!(source.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_revision() {
        let tmp = TempDir::new().unwrap();
        let source = DirSource::new(tmp.path());

        let dir = source.create(1136214245, "add example").unwrap();
        assert!(dir.join(UP_FILE).exists());
        assert!(dir.join(DOWN_FILE).exists());

        let rev = source.find("1136214245").unwrap();
        assert_eq!(rev.message, "add example");
        assert!(source.create(1136214245, "again").is_err());
    }
}
