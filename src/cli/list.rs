//! List command implementation

use anyhow::Result;

use crate::error::Error;
use crate::revision::{Direction, Revision, RevisionSource};
use crate::store::RevisionStore;

pub fn run(store: &mut RevisionStore, source: &dyn RevisionSource) -> Result<()> {
    let revisions = source.list()?;

    if revisions.is_empty() {
        println!("No revisions found. Run 'mgrt add' first.");
        return Ok(());
    }

    println!("{:<12} {:<12} {}", "ID", "State", "Message");
    println!("{}", "-".repeat(60));

    for revision in revisions {
        let state = state(store, &revision)?;

        // First line of the message only
        let message = revision.message.lines().next().unwrap_or("-");
        println!("{:<12} {:<12} {}", revision.id, state, message);
    }

    Ok(())
}

fn state(store: &mut RevisionStore, revision: &Revision) -> Result<&'static str> {
    let latest = match store.latest(revision.id) {
        Ok(latest) => latest,
        // Nothing has been performed before init
        Err(Error::NotInitialized(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(match latest.and_then(|l| l.direction) {
        None => "pending",
        Some(Direction::Up) => "applied",
        Some(Direction::Down) => "rolled back",
    })
}
