use kvbench::lookup::{lookup, Lookup};
use kvbench::{Handle, KvStore, KvStoreError, KvsEngine, OpenMode, Result};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

thread_local! {
    static OPENS: Cell<usize> = Cell::new(0);
    static CLOSES: Cell<usize> = Cell::new(0);
}

fn counts() -> (usize, usize) {
    (OPENS.with(Cell::get), CLOSES.with(Cell::get))
}

/// Opens and closes `lookup` performed on this thread.
fn counted<F: FnOnce() -> Lookup>(f: F) -> (Lookup, (usize, usize)) {
    let (opens, closes) = counts();
    let result = f();
    let (opens_after, closes_after) = counts();

    (result, (opens_after - opens, closes_after - closes))
}

/// In-memory engine holding `k -> v` that counts opens and closes. Paths
/// named `broken` fail to close.
struct CountingEngine {
    records: HashMap<Vec<u8>, Vec<u8>>,
    broken: bool,
}

impl KvsEngine for CountingEngine {
    fn open(path: &Path, _mode: OpenMode) -> Result<Self> {
        if !path.exists() {
            return Err(KvStoreError::DatabaseNotFound {
                name: path.display().to_string(),
            });
        }
        OPENS.with(|c| c.set(c.get() + 1));

        let mut records = HashMap::new();
        records.insert(b"k".to_vec(), b"v".to_vec());

        Ok(CountingEngine {
            records,
            broken: path.ends_with("broken"),
        })
    }

    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.records.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn close(&mut self) -> Result<()> {
        CLOSES.with(|c| c.set(c.get() + 1));

        if self.broken {
            Err(KvStoreError::FileFlushFailure {
                c: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
            })
        } else {
            Ok(())
        }
    }
}

#[test]
fn found_key_closes_handle() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    let (result, calls) = counted(|| lookup::<CountingEngine>(temp_dir.path(), b"k"));

    assert_eq!(result.outcome.as_ref().ok(), Some(&Some(b"v".to_vec())));
    assert!(result.close.is_ok());
    assert!(result.is_success());
    assert_eq!(calls, (1, 1));
}

#[test]
fn missing_key_closes_handle() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    let (result, calls) = counted(|| lookup::<CountingEngine>(temp_dir.path(), b"missing"));

    assert_eq!(result.outcome.as_ref().ok(), Some(&None));
    assert!(result.close.is_ok());
    assert!(!result.is_success());
    assert_eq!(calls, (1, 1));
}

#[test]
fn failed_open_leaves_nothing_to_close() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    let (result, calls) = counted(|| lookup::<CountingEngine>(&temp_dir.path().join("absent"), b"k"));

    match result.outcome {
        Err(KvStoreError::DatabaseNotFound { .. }) => {}
        ref other => panic!("expected DatabaseNotFound, got {:?}", other),
    }
    assert!(result.close.is_ok());
    assert!(!result.is_success());
    assert_eq!(calls, (0, 0));
}

#[test]
fn close_failure_is_reported_next_to_the_value() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let path = temp_dir.path().join("broken");
    std::fs::create_dir(&path).expect("unable to create directory");

    let (result, calls) = counted(|| lookup::<CountingEngine>(&path, b"k"));

    assert_eq!(result.outcome.as_ref().ok(), Some(&Some(b"v".to_vec())));
    match result.close {
        Err(KvStoreError::FileFlushFailure { .. }) => {}
        ref other => panic!("expected FileFlushFailure, got {:?}", other),
    }
    assert!(!result.is_success());
    assert_eq!(calls, (1, 1));
}

#[test]
fn kv_store_lookup() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    let mut db = Handle::<KvStore>::init();
    db.open(temp_dir.path(), OpenMode::Create)?;
    db.write_lock_acquire()?;
    db.add(b"k", b"v")?;
    db.write_lock_release()?;
    db.commit()?;
    db.close()?;
    db.finalize();

    let found = lookup::<KvStore>(temp_dir.path(), b"k");
    assert_eq!(found.outcome?, Some(b"v".to_vec()));

    let missing = lookup::<KvStore>(temp_dir.path(), b"missing");
    assert_eq!(missing.outcome?, None);

    Ok(())
}

#[test]
fn kv_store_lookup_never_creates_a_database() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let path = temp_dir.path().join("absent");

    let result = lookup::<KvStore>(&path, b"k");

    assert!(result.outcome.is_err());
    assert!(!path.exists());
}
