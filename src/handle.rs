use crate::error::{KvStoreError, Result};
use crate::{KvsEngine, OpenMode};
use log::{debug, error};
use std::path::Path;

/// Lifecycle state of a [`Handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Initialised, no database opened yet.
    Initialized,
    /// Database open, write lock not held.
    Open,
    /// Database open and write lock held.
    Locked,
    /// Database closed.
    Closed,
}

/// Handle owns one database session and enforces the order
/// init -> open -> (lock -> unlock)* -> close -> finalize.
///
/// A handle dropped while the database is still open closes it, so early
/// returns never leak an open database.
///
/// # Example
///
/// ``` rust
/// use kvbench::{Handle, KvStore, OpenMode};
/// use tempfile::TempDir;
///
/// let temp_dir = TempDir::new().expect("unable to create temporary working directory");
/// let mut db = Handle::<KvStore>::init();
/// db.open(temp_dir.path(), OpenMode::Create).unwrap();
///
/// db.write_lock_acquire().unwrap();
/// db.add(b"key1", b"value1").unwrap();
/// db.write_lock_release().unwrap();
/// db.commit().unwrap();
///
/// assert_eq!(db.fetch(b"key1").unwrap(), Some(b"value1".to_vec()));
/// db.close().unwrap();
/// db.finalize();
/// ```
pub struct Handle<E: KvsEngine> {
    engine: Option<E>,
    state: State,
}

impl<E: KvsEngine> Handle<E> {
    /// Return a fresh handle with no database attached.
    pub fn init() -> Handle<E> {
        Handle {
            engine: None,
            state: State::Initialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Open the database at `path`.
    pub fn open(&mut self, path: &Path, mode: OpenMode) -> Result<()> {
        self.check_state(&[State::Initialized], "open")?;

        debug!("Opening '{}' in {:?} mode.", path.display(), mode);
        self.engine = Some(E::open(path, mode)?);
        self.state = State::Open;

        Ok(())
    }

    /// Take the exclusive write lock.
    pub fn write_lock_acquire(&mut self) -> Result<()> {
        self.check_state(&[State::Open], "lock")?;
        self.engine_mut("lock")?.write_lock_acquire()?;
        self.state = State::Locked;
        Ok(())
    }

    /// Give up the exclusive write lock.
    pub fn write_lock_release(&mut self) -> Result<()> {
        self.check_state(&[State::Locked], "unlock")?;
        self.engine_mut("unlock")?.write_lock_release()?;
        self.state = State::Open;
        Ok(())
    }

    /// Insert a record. Only valid while holding the write lock.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_state(&[State::Locked], "add to")?;
        self.engine_mut("add to")?.add(key, value)
    }

    /// Commit everything written so far.
    pub fn commit(&mut self) -> Result<()> {
        self.check_state(&[State::Open], "commit")?;
        self.engine_mut("commit")?.commit()
    }

    /// Look up the value stored for `key`.
    pub fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_state(&[State::Open, State::Locked], "fetch from")?;
        self.engine_mut("fetch from")?.fetch(key)
    }

    /// Close the database. Closing a handle that never opened a database,
    /// or closing twice, is a no-op.
    ///
    /// A held write lock is released first. The database is closed even if
    /// that fails; a close error is returned in preference to the unlock
    /// error.
    pub fn close(&mut self) -> Result<()> {
        let unlocked = if self.state == State::Locked {
            self.write_lock_release()
        } else {
            Ok(())
        };
        if let Err(e) = &unlocked {
            error!("Failed to release write lock before close: {}", e);
        }

        self.state = State::Closed;

        let closed = match self.engine.take() {
            Some(mut engine) => engine.close(),
            None => Ok(()),
        };

        closed.and(unlocked)
    }

    /// Release the handle itself.
    pub fn finalize(mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close database while finalizing: {}", e);
        }
    }

    fn check_state(&self, allowed: &[State], op: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(KvStoreError::InvalidState {
                op,
                state: self.state,
            })
        }
    }

    fn engine_mut(&mut self, op: &'static str) -> Result<&mut E> {
        let state = self.state;
        self.engine
            .as_mut()
            .ok_or_else(|| KvStoreError::InvalidState { op, state })
    }
}

impl<E: KvsEngine> Drop for Handle<E> {
    fn drop(&mut self) {
        if self.engine.is_some() {
            if let Err(e) = self.close() {
                error!("Failed to close database on drop: {}", e);
            }
        }
    }
}
