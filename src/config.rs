use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Number of records a workload touches unless told otherwise.
pub const DEFAULT_NUM_RECORDS: usize = 1000;

/// Storage engine a command runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// The crate's own log structured store.
    Kvs,
    /// The sled embedded database.
    Sled,
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::Kvs
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Engine, String> {
        match s {
            "kvs" => Ok(Engine::Kvs),
            "sled" => Ok(Engine::Sled),
            other => Err(format!("unknown engine '{}'", other)),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Engine::Kvs => write!(f, "kvs"),
            Engine::Sled => write!(f, "sled"),
        }
    }
}

/// Everything a benchmark run is parameterised by.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Workload names in the order they run.
    pub benchmarks: Vec<String>,
    /// Existing database to run against. A disposable one is provisioned
    /// when `None`.
    pub db: Option<PathBuf>,
    /// Records written or read per workload.
    pub num_records: usize,
    /// Engine under test.
    pub engine: Engine,
    /// Fixed seed for the random stream, time based when `None`.
    pub seed: Option<u64>,
}

impl BenchConfig {
    /// Config for a comma separated workload list with defaults for the
    /// rest.
    pub fn new(benchmarks: &str) -> BenchConfig {
        BenchConfig {
            benchmarks: parse_benchmarks(benchmarks),
            db: None,
            num_records: DEFAULT_NUM_RECORDS,
            engine: Engine::default(),
            seed: None,
        }
    }
}

/// Split a comma separated workload list. Order and duplicates are kept,
/// blank entries dropped.
pub fn parse_benchmarks(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Settings of `kvs-tool`, read from the file passed with `--config`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Engine the database was written with.
    pub engine: Engine,
}

impl ToolConfig {
    /// Load the config at `path`.
    pub fn load(path: &Path) -> Result<ToolConfig, ConfigError> {
        let raw = std::fs::read(path).map_err(|c| ConfigError::Read {
            c,
            name: path.display().to_string(),
        })?;

        serde_json::from_slice(&raw).map_err(|c| ConfigError::Parse {
            c,
            name: path.display().to_string(),
        })
    }
}

/// Error loading a [`ToolConfig`].
#[derive(Debug, Fail)]
pub enum ConfigError {
    /// Failure reading the config file.
    #[fail(display = "failed to read config file {}", name)]
    Read {
        /// Underlying io Error.
        #[cause]
        c: std::io::Error,
        /// Name of the file.
        name: String,
    },

    /// Failure parsing the config file.
    #[fail(display = "failed to parse config file {}", name)]
    Parse {
        /// Underlying serde json Error.
        #[cause]
        c: serde_json::error::Error,
        /// Name of the file.
        name: String,
    },
}
