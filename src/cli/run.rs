//! Run command implementation

use anyhow::Result;

use crate::revision::{Direction, RevisionSource};
use crate::store::RevisionStore;

/// Perform every selected revision that is not already applied.
pub fn run(
    store: &mut RevisionStore,
    source: &dyn RevisionSource,
    ids: &[String],
    force: bool,
) -> Result<()> {
    let revisions = super::select(source, ids)?;
    let mut performed = 0;

    for mut revision in revisions {
        revision.gen_hash()?;

        // Already up with identical content
        if let Some(latest) = store.latest(revision.id)? {
            if latest.direction == Some(Direction::Up) && latest.hash == revision.hash {
                continue;
            }
        }

        revision.direction = Some(Direction::Up);
        store.perform(&mut revision, force)?;
        store.log(&mut revision, force)?;
        performed += 1;

        if revision.forced {
            println!("up   - {} [FORCED]", revision.id);
        } else {
            println!("up   - {}", revision.id);
        }
    }

    if performed == 0 {
        println!("No revisions to run.");
    }

    Ok(())
}
