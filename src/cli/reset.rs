//! Reset command implementation

use anyhow::Result;

use crate::revision::{Direction, RevisionSource};
use crate::store::RevisionStore;

/// Roll back every selected revision whose latest log entry is up, newest
/// first.
pub fn run(
    store: &mut RevisionStore,
    source: &dyn RevisionSource,
    ids: &[String],
    force: bool,
) -> Result<()> {
    let mut revisions = super::select(source, ids)?;
    revisions.reverse();
    let mut performed = 0;

    for mut revision in revisions {
        let applied = store
            .latest(revision.id)?
            .map_or(false, |latest| latest.direction == Some(Direction::Up));
        if !applied {
            continue;
        }

        revision.gen_hash()?;
        revision.direction = Some(Direction::Down);
        store.perform(&mut revision, force)?;
        store.log(&mut revision, force)?;
        performed += 1;

        if revision.forced {
            println!("down - {} [FORCED]", revision.id);
        } else {
            println!("down - {}", revision.id);
        }
    }

    if performed == 0 {
        println!("No revisions to reset.");
    }

    Ok(())
}
