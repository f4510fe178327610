use crate::handle::State;

/// Result type returned by the kvbench library.
pub type Result<T> = std::result::Result<T, KvStoreError>;

/// Error returned by the kvbench library.
#[derive(Debug, Fail)]
pub enum KvStoreError {
    /// Failure when opening database file.
    #[fail(display = "failed to open file {}", name)]
    OpenFileFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
        /// Name of the file.
        name: String,
    },

    /// Failure when creating the database directory.
    #[fail(display = "failed to create database directory {}", name)]
    CreateDirFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
        /// Name of the directory.
        name: String,
    },

    /// Opening an existing database that is not there.
    #[fail(display = "no database found at {}", name)]
    DatabaseNotFound {
        /// Path that was looked at.
        name: String,
    },

    /// Failure when flush file.
    #[fail(display = "failed to flush file")]
    FileFlushFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
    },

    /// Failure when syncing file contents to disk.
    #[fail(display = "failed to sync file")]
    FileSyncFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
    },

    /// Failure when serializing input.
    #[fail(display = "failed to serialize input")]
    SerializationFailure {
        /// Underlying serde json Error.
        #[cause]
        c: serde_json::error::Error,
    },

    /// Failure when deserializing input.
    #[fail(display = "failed to deserialize input")]
    DeserializationFailure {
        /// Underlying serde json Error.
        #[cause]
        c: serde_json::error::Error,
    },

    /// Failure writing to file.
    #[fail(display = "failed to write to file")]
    WriteToFileFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
    },

    /// Failure seeking file.
    #[fail(display = "failed to seek file")]
    SeekFileFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
    },

    /// Another writer holds the write lock of the database.
    #[fail(display = "database {} is write locked by someone else", name)]
    WriteLocked {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
        /// Name of the lock file.
        name: String,
    },

    /// Failure releasing the write lock.
    #[fail(display = "failed to release write lock")]
    UnlockFailure {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
    },

    /// Error reported by the sled engine.
    #[fail(display = "sled failure")]
    Sled {
        /// Underlying sled Error.
        #[cause]
        c: sled::Error,
    },

    /// A handle operation was called in a state that does not allow it.
    #[fail(display = "cannot {} a handle that is {:?}", op, state)]
    InvalidState {
        /// Operation that was attempted.
        op: &'static str,
        /// State the handle was in.
        state: State,
    },

    /// The workspace provisioner ran out of candidate names.
    #[fail(display = "no unused workspace path found after {} attempts", attempts)]
    NoUnusedPath {
        /// Number of candidates tried.
        attempts: u32,
    },
}

impl From<sled::Error> for KvStoreError {
    fn from(c: sled::Error) -> KvStoreError {
        KvStoreError::Sled { c }
    }
}
