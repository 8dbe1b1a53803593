//! Subcommand implementations

pub mod add;
pub mod init;
pub mod list;
pub mod log;
pub mod reset;
pub mod run;

use crate::error::Result;
use crate::revision::{Revision, RevisionSource};

/// Revisions named by `ids`, or every revision in the source when empty.
/// Always ascending by id.
pub(crate) fn select(source: &dyn RevisionSource, ids: &[String]) -> Result<Vec<Revision>> {
    if ids.is_empty() {
        return source.list();
    }

    let mut revisions = ids
        .iter()
        .map(|id| source.find(id))
        .collect::<Result<Vec<_>>>()?;
    revisions.sort_by_key(|r| r.id);
    revisions.dedup_by_key(|r| r.id);
    Ok(revisions)
}
