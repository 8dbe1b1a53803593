//! Log command implementation

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::revision::{Revision, RevisionSource};
use crate::store::RevisionStore;

const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// JSON shape of one log entry
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    id: i64,
    hash: String,
    direction: Option<&'static str>,
    forced: bool,
    created_at: Option<String>,
    message: &'a str,
}

pub fn run(
    store: &mut RevisionStore,
    source: Option<&dyn RevisionSource>,
    ids: &[String],
    reverse: bool,
    json: bool,
) -> Result<()> {
    let mut revisions = if reverse {
        store.read_log_reverse(ids)?
    } else {
        store.read_log(ids)?
    };

    if let Some(source) = source {
        for revision in revisions.iter_mut() {
            enrich(source, revision)?;
        }
    }

    if json {
        println!("{}", to_json(&revisions)?);
        return Ok(());
    }

    for revision in &revisions {
        print!("{}", render(revision));
    }

    Ok(())
}

/// Fill in message and bodies from the source, if the revision is still
/// there.
fn enrich(source: &dyn RevisionSource, revision: &mut Revision) -> Result<()> {
    match source.find(&revision.id.to_string()) {
        Ok(found) => {
            revision.message = found.message;
            revision.up = found.up;
            revision.down = found.down;
            Ok(())
        }
        Err(Error::NotFound { .. }) => {
            debug!(id = revision.id, "revision no longer on disk");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn to_json(revisions: &[Revision]) -> serde_json::Result<String> {
    let records: Vec<LogRecord> = revisions
        .iter()
        .map(|r| LogRecord {
            id: r.id,
            hash: hex::encode(r.hash),
            direction: r.direction.map(|d| d.as_str()),
            forced: r.forced,
            created_at: r.created_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
            message: &r.message,
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

/// Human readable form of one log entry
pub fn render(revision: &Revision) -> String {
    let mut out = format!("Revision: {} - {}", revision.id, hex::encode(revision.hash));
    if revision.forced {
        out.push_str(" [FORCED]");
    }
    out.push('\n');

    if let Some(created_at) = revision.created_at {
        out.push_str(&format!("Date:     {}\n", created_at.format(DATE_FORMAT)));
    }
    if !revision.message.is_empty() {
        out.push_str(&format!("Message:  {}\n", revision.message));
    }

    out.push('\n');
    for line in revision.query().unwrap_or_default().lines() {
        out.push_str(&format!("    {}\n", line));
    }
    out.push('\n');

    out
}
