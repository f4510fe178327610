use crate::error::{KvStoreError, Result};
use crate::{KvsEngine, OpenMode};
use std::path::Path;

// Written by sled when it creates a database.
const CONF_FILE: &str = "conf";

/// Adapter for sled database.
pub struct SledKvsEngine {
    tree: ::sled::Db,
}

impl KvsEngine for SledKvsEngine {
    /// Open a sled database on the given path returning the SledKvsEngine
    /// adapter.
    fn open(path: &Path, mode: OpenMode) -> Result<SledKvsEngine> {
        if mode == OpenMode::ReadWrite && !path.join(CONF_FILE).is_file() {
            return Err(KvStoreError::DatabaseNotFound {
                name: path.display().to_string(),
            });
        }

        let tree = ::sled::open(path)?;

        Ok(SledKvsEngine { tree })
    }

    /// Set the value for the given key.
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    /// sled writes are durable once flushed.
    fn commit(&mut self) -> Result<()> {
        self.tree.flush()?;
        Ok(())
    }

    /// Get the value of the given key.
    fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    fn close(&mut self) -> Result<()> {
        self.tree.flush()?;
        Ok(())
    }
}
