#![deny(missing_docs)]

//! # kvbench
//! `kvbench` drives named workloads against an embedded key value store and
//! reports how long they took and how many bytes they moved. It also ships
//! the store engines it measures and a single-key lookup used by `kvs-tool`.

pub use error::{KvStoreError, Result};
pub use handle::Handle;
pub use store::KvStore;

#[macro_use]
extern crate failure_derive;

/// Errors thrown by the engines and the harness.
pub mod error;

/// Benchmark workloads, their registry and the runner driving them.
pub mod bench;

/// Configuration of the benchmark runner and the lookup tool.
pub mod config;

/// Host environment report printed ahead of a benchmark run.
pub mod env;

/// Lifecycle tracking for an open database.
pub mod handle;

/// Single key lookup against an existing database.
pub mod lookup;

/// Random keys and values for workloads.
pub mod payload;

/// Bindings for sled database.
pub mod sled;

mod store;

/// Disposable and caller supplied database directories.
pub mod workspace;

/// How a database should be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Create the database if it does not exist yet.
    Create,
    /// Open a database that must already exist.
    ReadWrite,
}

/// KvsEngine represents the storage interface the harness exercises.
pub trait KvsEngine {
    /// Open the database at the given path.
    fn open(path: &std::path::Path, mode: OpenMode) -> Result<Self>
    where
        Self: Sized;
    /// Take the exclusive write lock.
    fn write_lock_acquire(&mut self) -> Result<()> {
        Ok(())
    }
    /// Give up the exclusive write lock.
    fn write_lock_release(&mut self) -> Result<()> {
        Ok(())
    }
    /// Insert or overwrite the value for the given key.
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()>;
    /// Make every write so far durable.
    fn commit(&mut self) -> Result<()>;
    /// Get the value of the given key.
    fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    /// Close the database. No other call is valid afterwards.
    fn close(&mut self) -> Result<()>;
}
