//! Init command implementation

use anyhow::Result;

use crate::error::Error;
use crate::store::RevisionStore;

pub fn run(store: &mut RevisionStore) -> Result<()> {
    match store.init() {
        Ok(()) => println!("Initialized {} database", store.dialect().name()),
        Err(Error::Initialized) => println!("Database already initialized."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
