//! Add command implementation

use anyhow::{Context, Result};
use chrono::Utc;

use crate::revision::DirSource;

pub fn run(source: &DirSource, message: &str) -> Result<()> {
    let id = Utc::now().timestamp();
    let dir = source
        .create(id, message)
        .with_context(|| format!("failed to create revision in {}", source.root().display()))?;

    println!("Added revision {} at {}", id, dir.display());
    Ok(())
}
