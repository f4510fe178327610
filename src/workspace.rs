use crate::error::{KvStoreError, Result};
use crate::payload::RandomStream;
use log::{debug, error, info};
use std::path::{Path, PathBuf};

const ALPHANUM: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Prefix of every provisioned directory name.
pub const PREFIX: &str = "kvbench-";

/// Length of the random part of a provisioned directory name.
pub const SUFFIX_LEN: usize = 6;

/// Upper bound of names tried before giving up, glibc's TMP_MAX.
pub const TMP_MAX: u32 = 238_328;

const STEP: u64 = 9999;

/// Directory holding one database. Provisioned workspaces are owned and
/// get removed again, caller supplied ones are left alone.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    owned: bool,
    released: bool,
}

impl Workspace {
    /// Wrap a database path supplied by the caller.
    pub fn existing(path: impl Into<PathBuf>) -> Workspace {
        Workspace {
            path: path.into(),
            owned: false,
            released: false,
        }
    }

    /// Reserve an unused name below [`base_dir`].
    ///
    /// Nothing is created on disk; the engine creates the directory when it
    /// opens the database.
    pub fn provision(rng: &mut RandomStream) -> Result<Workspace> {
        Workspace::provision_in(&base_dir(), rng.next_u64())
    }

    /// Reserve an unused name below `base`, starting the search at `seed`.
    pub fn provision_in(base: &Path, seed: u64) -> Result<Workspace> {
        let path = find_unused(base, seed, is_free)?;
        info!("Provisioned workspace '{}'.", path.display());

        Ok(Workspace {
            path,
            owned: true,
            released: false,
        })
    }

    /// Location of the database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this workspace was provisioned and will be removed.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Remove an owned workspace. Removing a workspace that never got
    /// created, or releasing twice, succeeds.
    pub fn release(&mut self) -> std::io::Result<()> {
        if !self.owned || self.released {
            return Ok(());
        }
        self.released = true;

        debug!("Removing workspace '{}'.", self.path.display());
        match std::fs::remove_dir_all(&self.path) {
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            r => r,
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            error!(
                "Failed to remove workspace '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

/// `$TMPDIR` when set, the platform temporary directory otherwise.
pub fn base_dir() -> PathBuf {
    match std::env::var_os("TMPDIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir(),
    }
}

/// Directory name derived from `value` alone.
pub fn candidate_name(value: u64) -> String {
    let mut v = value;
    let mut name = String::with_capacity(PREFIX.len() + SUFFIX_LEN);
    name.push_str(PREFIX);

    for _ in 0..SUFFIX_LEN {
        name.push(ALPHANUM[(v % ALPHANUM.len() as u64) as usize] as char);
        v /= ALPHANUM.len() as u64;
    }

    name
}

/// Walk candidates `seed`, `seed + 9999`, ... below `base` and return the
/// first one `is_free` accepts.
pub fn find_unused<F>(base: &Path, seed: u64, mut is_free: F) -> Result<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    let mut value = seed;

    for _ in 0..TMP_MAX {
        let path = base.join(candidate_name(value));
        if is_free(&path) {
            return Ok(path);
        }

        value = value.wrapping_add(STEP);
    }

    Err(KvStoreError::NoUnusedPath { attempts: TMP_MAX })
}

// Anything but a clean "not found" counts as taken.
fn is_free(path: &Path) -> bool {
    match std::fs::symlink_metadata(path) {
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
        Ok(_) => false,
    }
}
