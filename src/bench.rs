use crate::config::{BenchConfig, Engine};
use crate::error::{KvStoreError, Result};
use crate::payload::RandomStream;
use crate::sled::SledKvsEngine;
use crate::workspace::Workspace;
use crate::{Handle, KvStore, KvsEngine, OpenMode};
use log::{debug, error, info};
use std::convert::TryFrom;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Width of the zero padded decimal keys.
pub const KEY_WIDTH: usize = 16;

/// Length of every value written.
pub const VALUE_LEN: usize = 2 * KEY_WIDTH;

/// Time and volume of one workload execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkloadResult {
    /// Key and value bytes moved.
    pub bytes_processed: u64,
    /// Wall clock duration in microseconds.
    pub elapsed_micros: u64,
}

/// Direction the bytes of a workload travel, used in its report line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traffic {
    /// Bytes written to the store.
    Written,
    /// Bytes read back from the store.
    Read,
}

impl fmt::Display for Traffic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Traffic::Written => write!(f, "written"),
            Traffic::Read => write!(f, "read"),
        }
    }
}

/// What a workload runs against.
pub struct Session<'a> {
    /// Database location.
    pub path: &'a Path,
    /// Mode the database is opened in.
    pub mode: OpenMode,
    /// Records to write or read.
    pub num_records: usize,
    /// Source of keys and values.
    pub rng: &'a mut RandomStream,
}

/// A named workload. `run` returns the number of bytes processed.
#[derive(Clone, Copy)]
pub struct Workload {
    /// Name used to request the workload.
    pub name: &'static str,
    /// One line description for `--help`.
    pub about: &'static str,
    /// Direction reported for the processed bytes.
    pub traffic: Traffic,
    /// Workload body.
    pub run: fn(&mut Session) -> Result<u64>,
}

/// Every workload available for engine `E`.
pub fn workloads<E: KvsEngine>() -> [Workload; 4] {
    [
        Workload {
            name: "writeseq",
            about: "write values in sequential key order",
            traffic: Traffic::Written,
            run: write_seq::<E>,
        },
        Workload {
            name: "writerandom",
            about: "write values in random key order",
            traffic: Traffic::Written,
            run: write_random::<E>,
        },
        Workload {
            name: "readseq",
            about: "read values in sequential key order",
            traffic: Traffic::Read,
            run: read_seq::<E>,
        },
        Workload {
            name: "readrandom",
            about: "read values in random key order",
            traffic: Traffic::Read,
            run: read_random::<E>,
        },
    ]
}

/// Workload registered under exactly `name`.
pub fn find<E: KvsEngine>(name: &str) -> Option<Workload> {
    workloads::<E>().iter().find(|w| w.name == name).copied()
}

/// Key of the `i`th record.
pub fn seq_key(i: usize) -> String {
    format!("{:0width$}", i, width = KEY_WIDTH)
}

fn write_seq<E: KvsEngine>(s: &mut Session) -> Result<u64> {
    write::<E, _>(s, |_, i| seq_key(i))
}

fn write_random<E: KvsEngine>(s: &mut Session) -> Result<u64> {
    let bound = s.num_records;
    write::<E, _>(s, |rng, _| rng.random_key(bound, KEY_WIDTH))
}

fn read_seq<E: KvsEngine>(s: &mut Session) -> Result<u64> {
    read::<E, _>(s, |_, i| seq_key(i))
}

fn read_random<E: KvsEngine>(s: &mut Session) -> Result<u64> {
    let bound = s.num_records;
    read::<E, _>(s, |rng, _| rng.random_key(bound, KEY_WIDTH))
}

fn write<E, F>(s: &mut Session, mut key_for: F) -> Result<u64>
where
    E: KvsEngine,
    F: FnMut(&mut RandomStream, usize) -> String,
{
    let mut db = Handle::<E>::init();
    db.open(s.path, s.mode)?;
    db.write_lock_acquire()?;

    let mut bytes = 0;
    for i in 0..s.num_records {
        let key = key_for(&mut *s.rng, i);
        // One extra byte for the terminator random_string reserves.
        let value = s.rng.random_string(VALUE_LEN + 1);

        db.add(key.as_bytes(), &value)?;
        bytes += (key.len() + value.len()) as u64;
    }

    db.write_lock_release()?;
    db.commit()?;
    db.close()?;
    db.finalize();

    Ok(bytes)
}

fn read<E, F>(s: &mut Session, mut key_for: F) -> Result<u64>
where
    E: KvsEngine,
    F: FnMut(&mut RandomStream, usize) -> String,
{
    let mut db = Handle::<E>::init();
    db.open(s.path, s.mode)?;

    let mut bytes = 0;
    let mut found = 0;
    for i in 0..s.num_records {
        let key = key_for(&mut *s.rng, i);

        if let Some(value) = db.fetch(key.as_bytes())? {
            bytes += (key.len() + value.len()) as u64;
            found += 1;
        }
    }
    debug!("{} of {} keys found.", found, s.num_records);

    db.close()?;
    db.finalize();

    Ok(bytes)
}

/// Run `body` between two reads of the monotonic clock.
pub fn measure<F>(body: F) -> Result<WorkloadResult>
where
    F: FnOnce() -> Result<u64>,
{
    let start = Instant::now();
    let bytes_processed = body()?;
    let elapsed = start.elapsed();

    Ok(WorkloadResult {
        bytes_processed,
        elapsed_micros: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
    })
}

/// How a requested workload ended.
#[derive(Debug)]
pub enum Outcome {
    /// Ran to completion.
    Completed(WorkloadResult),
    /// No workload of that name exists.
    Unknown,
    /// A store operation failed and the workload was abandoned.
    Failed(KvStoreError),
}

/// Outcome of one requested workload.
#[derive(Debug)]
pub struct Report {
    /// Requested name.
    pub name: String,
    /// How it ended.
    pub outcome: Outcome,
}

impl Report {
    /// Whether the workload failed.
    pub fn is_failure(&self) -> bool {
        match self.outcome {
            Outcome::Failed(_) => true,
            _ => false,
        }
    }
}

/// Runs the configured workloads one after another against one workspace.
///
/// A failing workload is reported and the next one still runs.
pub struct Runner {
    config: BenchConfig,
    rng: RandomStream,
    workspace: Workspace,
}

impl Runner {
    /// Seed the random stream and settle on a workspace, provisioning a
    /// disposable one when the config names no database.
    pub fn new(config: BenchConfig) -> std::result::Result<Runner, BenchError> {
        let mut rng = match config.seed {
            Some(seed) => RandomStream::seeded(seed),
            None => RandomStream::from_time(),
        };

        let workspace = match config.db {
            Some(ref path) => Workspace::existing(path.clone()),
            None => Workspace::provision(&mut rng)?,
        };

        Ok(Runner {
            config,
            rng,
            workspace,
        })
    }

    /// Workspace the workloads run against.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run every workload against the configured engine.
    pub fn run<W: Write>(&mut self, out: &mut W) -> std::result::Result<Vec<Report>, BenchError> {
        match self.config.engine {
            Engine::Kvs => self.run_with::<KvStore, W>(out),
            Engine::Sled => self.run_with::<SledKvsEngine, W>(out),
        }
    }

    /// Write the header to `out`, then run every workload against engine
    /// `E`, writing one line per workload.
    pub fn run_with<E: KvsEngine, W: Write>(
        &mut self,
        out: &mut W,
    ) -> std::result::Result<Vec<Report>, BenchError> {
        let Runner {
            config,
            rng,
            workspace,
        } = self;

        crate::env::write_header(out, config)?;

        let mode = if workspace.is_owned() {
            OpenMode::Create
        } else {
            OpenMode::ReadWrite
        };

        let mut reports = Vec::with_capacity(config.benchmarks.len());

        for name in &config.benchmarks {
            let workload = match find::<E>(name) {
                Some(workload) => workload,
                None => {
                    writeln!(out, "Unknown benchmark '{}'", name)?;
                    reports.push(Report {
                        name: name.clone(),
                        outcome: Outcome::Unknown,
                    });
                    continue;
                }
            };

            info!("Running '{}' with {} records.", name, config.num_records);

            let mut session = Session {
                path: workspace.path(),
                mode,
                num_records: config.num_records,
                rng: &mut *rng,
            };

            let outcome = match measure(|| (workload.run)(&mut session)) {
                Ok(result) => {
                    writeln!(
                        out,
                        "{}: {} bytes {} in {} μs.",
                        name, result.bytes_processed, workload.traffic, result.elapsed_micros
                    )?;
                    Outcome::Completed(result)
                }
                Err(e) => {
                    error!("Workload '{}' failed: {}", name, e);
                    writeln!(out, "{}: failed: {}", name, e)?;
                    Outcome::Failed(e)
                }
            };

            reports.push(Report {
                name: name.clone(),
                outcome,
            });
        }

        Ok(reports)
    }

    /// Remove the workspace if it was provisioned.
    pub fn finish(mut self) -> std::io::Result<()> {
        self.workspace.release()
    }
}

/// Error aborting a whole benchmark run.
#[derive(Debug, Fail)]
pub enum BenchError {
    /// Store error wrapper, setup failures such as provisioning.
    #[fail(display = "{}", _0)]
    KvStore(#[cause] KvStoreError),
    /// Io error wrapper, writing the report.
    #[fail(display = "{}", _0)]
    Io(#[cause] std::io::Error),
}

impl From<KvStoreError> for BenchError {
    fn from(err: KvStoreError) -> BenchError {
        BenchError::KvStore(err)
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> BenchError {
        BenchError::Io(err)
    }
}
