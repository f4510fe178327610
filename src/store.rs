use crate::error::{KvStoreError, Result};
use crate::{KvsEngine, OpenMode};
use fs2::FileExt;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

const DB_FILE: &str = "db";
const LOCK_FILE: &str = "LOCK";

/// KvStore stores values by their key in an append-only log.
///
/// # Example
///
/// ``` rust
/// use kvbench::{KvStore, KvsEngine, OpenMode};
/// use tempfile::TempDir;
///
/// let temp_dir = TempDir::new().expect("unable to create temporary working directory");
/// let mut store = KvStore::open(temp_dir.path(), OpenMode::Create).unwrap();
///
/// store.add(b"key1", b"value1").unwrap();
/// store.add(b"key2", b"value2").unwrap();
/// store.commit().unwrap();
///
/// assert_eq!(store.fetch(b"key1").unwrap(), Some(b"value1".to_vec()));
/// assert_eq!(store.fetch(b"key2").unwrap(), Some(b"value2".to_vec()));
/// ```
///
pub struct KvStore {
    indexed_log_file: IndexedLogFile,
    path: PathBuf,
    // Held for as long as the write lock is taken.
    lock: Option<std::fs::File>,
}

impl KvsEngine for KvStore {
    fn open(path: &Path, mode: OpenMode) -> Result<KvStore> {
        match mode {
            OpenMode::Create => {
                std::fs::create_dir_all(path).map_err(|c| KvStoreError::CreateDirFailure {
                    c,
                    name: path.display().to_string(),
                })?;
            }
            OpenMode::ReadWrite => {
                if !path.join(DB_FILE).is_file() {
                    return Err(KvStoreError::DatabaseNotFound {
                        name: path.display().to_string(),
                    });
                }
            }
        }

        let indexed_log_file = IndexedLogFile::new(path)?;
        debug!(
            "Opened log store at '{}' with {} keys.",
            path.display(),
            indexed_log_file.index.len()
        );

        Ok(KvStore {
            indexed_log_file,
            path: path.to_path_buf(),
            lock: None,
        })
    }

    fn write_lock_acquire(&mut self) -> Result<()> {
        let name = self.path.join(LOCK_FILE);
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(&name)
            .map_err(|c| KvStoreError::OpenFileFailure {
                c,
                name: name.display().to_string(),
            })?;

        FileExt::try_lock_exclusive(&file)
            .map_err(|c| KvStoreError::WriteLocked {
                c,
                name: name.display().to_string(),
            })?;

        self.lock = Some(file);
        Ok(())
    }

    fn write_lock_release(&mut self) -> Result<()> {
        match self.lock.take() {
            Some(file) => FileExt::unlock(&file).map_err(|c| KvStoreError::UnlockFailure { c }),
            None => Ok(()),
        }
    }

    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.indexed_log_file.write(Command::Set {
            k: key.to_vec(),
            v: value.to_vec(),
        })
    }

    fn commit(&mut self) -> Result<()> {
        self.indexed_log_file.log_file.sync()
    }

    fn fetch(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.indexed_log_file.read(key)?.map(Command::value))
    }

    fn close(&mut self) -> Result<()> {
        self.indexed_log_file.log_file.flush()?;
        self.write_lock_release()
    }
}

type Offset = u64;

struct IndexedLogFile {
    log_file: LogFile,
    index: HashMap<Vec<u8>, Offset>,
}

impl IndexedLogFile {
    fn new(path: &Path) -> Result<Self> {
        let log_file = LogFile::new(path)?;

        let mut indexed_log_file = IndexedLogFile {
            log_file,
            index: HashMap::new(),
        };

        indexed_log_file.build_index()?;

        Ok(indexed_log_file)
    }

    fn read(&mut self, key: &[u8]) -> Result<Option<Command>> {
        let offset = match self.index.get(key) {
            Some(offset) => *offset,
            None => return Ok(None),
        };

        self.log_file.read_cmd(offset)
    }

    fn write(&mut self, cmd: Command) -> Result<()> {
        let key = cmd.key().to_vec();

        let offset = self.log_file.write_cmd(&cmd)?;
        self.index.insert(key, offset);

        Ok(())
    }

    fn build_index(&mut self) -> Result<()> {
        let mut offset: Offset = 0;

        let reader = self.log_file.get_reader(offset)?;

        let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Command>();

        while let Some(cmd) = stream.next() {
            let cmd = cmd.map_err(|c| KvStoreError::DeserializationFailure { c })?;

            self.index.insert(cmd.key().to_vec(), offset);

            offset = stream.byte_offset() as Offset;
        }

        Ok(())
    }
}

/// LogFile represents a database log file on disk.
struct LogFile {
    reader: std::io::BufReader<std::fs::File>,
    writer: std::io::BufWriter<std::fs::File>,
    // Position within the file, including buffered bytes.
    position: Offset,
    // Whether the writer holds bytes the reader cannot see yet.
    dirty: bool,
}

impl LogFile {
    fn new(path: &Path) -> Result<LogFile> {
        let path = path.join(DB_FILE);

        let mut write_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|c| KvStoreError::OpenFileFailure {
                c,
                name: path.display().to_string(),
            })?;

        // Get end of file.
        let position = write_file
            .seek(std::io::SeekFrom::End(0))
            .map_err(|c| KvStoreError::SeekFileFailure { c })?;

        let read_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|c| KvStoreError::OpenFileFailure {
                c,
                name: path.display().to_string(),
            })?;

        Ok(LogFile {
            reader: std::io::BufReader::new(read_file),
            writer: std::io::BufWriter::new(write_file),
            position,
            dirty: false,
        })
    }

    fn write_cmd(&mut self, cmd: &Command) -> Result<Offset> {
        let offset = self.position;

        let serialized =
            serde_json::to_vec(cmd).map_err(|c| KvStoreError::SerializationFailure { c })?;

        self.writer
            .write_all(&serialized)
            .map_err(|c| KvStoreError::WriteToFileFailure { c })?;

        self.position = offset + serialized.len() as Offset;
        self.dirty = true;

        Ok(offset)
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.writer
                .flush()
                .map_err(|c| KvStoreError::FileFlushFailure { c })?;
            self.dirty = false;
        }

        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.flush()?;

        self.writer
            .get_ref()
            .sync_all()
            .map_err(|c| KvStoreError::FileSyncFailure { c })
    }

    fn get_reader(&mut self, offset: Offset) -> Result<&mut std::io::BufReader<std::fs::File>> {
        self.reader
            .seek(std::io::SeekFrom::Start(offset))
            .map_err(|c| KvStoreError::SeekFileFailure { c })?;

        Ok(&mut self.reader)
    }

    fn read_cmd(&mut self, offset: Offset) -> Result<Option<Command>> {
        // Reads must observe writes still sitting in the buffer.
        self.flush()?;

        let reader = self.get_reader(offset)?;

        let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Command>();

        match stream.next() {
            Some(cmd) => {
                let cmd = cmd.map_err(|c| KvStoreError::DeserializationFailure { c })?;
                Ok(Some(cmd))
            }
            None => Ok(None),
        }
    }
}

#[derive(Serialize, Deserialize)]
enum Command {
    Set { k: Vec<u8>, v: Vec<u8> },
}

impl Command {
    fn key(&self) -> &[u8] {
        match self {
            Command::Set { k, .. } => k,
        }
    }

    fn value(self) -> Vec<u8> {
        match self {
            Command::Set { v, .. } => v,
        }
    }
}
