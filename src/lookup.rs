use crate::error::Result;
use crate::{Handle, KvsEngine, OpenMode};
use log::debug;
use std::path::Path;

/// Result of a single key lookup.
///
/// The outcome of the lookup and the outcome of closing the database are
/// kept apart so a close failure never hides the lookup failure before it.
#[derive(Debug)]
pub struct Lookup {
    /// Value found for the key, `None` if the key does not exist, or the
    /// error that stopped the open or the fetch.
    pub outcome: Result<Option<Vec<u8>>>,
    /// Result of closing the database afterwards.
    pub close: Result<()>,
}

impl Lookup {
    /// Whether the key was found and the database closed cleanly.
    pub fn is_success(&self) -> bool {
        match (&self.outcome, &self.close) {
            (Ok(Some(_)), Ok(())) => true,
            _ => false,
        }
    }
}

/// Look up `key` in the existing database at `db`. Never creates a database.
pub fn lookup<E: KvsEngine>(db: &Path, key: &[u8]) -> Lookup {
    let mut handle = Handle::<E>::init();

    let outcome = handle
        .open(db, OpenMode::ReadWrite)
        .and_then(|()| handle.fetch(key));
    debug!("Lookup in '{}' finished: {:?}", db.display(), outcome.is_ok());

    // Close runs whether or not the open and the fetch went through.
    let close = handle.close();
    handle.finalize();

    Lookup { outcome, close }
}
