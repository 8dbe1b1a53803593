pub mod cli;
pub mod config;
pub mod error;
pub mod revision;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use revision::{Direction, Revision, RevisionSource};
pub use store::RevisionStore;
