use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kvbench::config::{ConfigError, Engine, ToolConfig};
use kvbench::lookup::{lookup, Lookup};
use kvbench::sled::SledKvsEngine;
use kvbench::KvStore;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::exit;

fn main() {
    env_logger::init();

    let matches = App::new("kvs-tool")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("inspect an existing database")
        .setting(AppSettings::DisableHelpSubcommand)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::VersionlessSubcommands)
        .subcommand(
            SubCommand::with_name("get")
                .about("get value for given key")
                .arg(
                    Arg::with_name("config")
                        .short("c")
                        .long("config")
                        .takes_value(true)
                        .help("json config file"),
                )
                .arg(Arg::with_name("DB").required(true))
                .arg(Arg::with_name("KEY").required(true)),
        )
        .get_matches();

    match matches.subcommand() {
        ("get", Some(matches)) => match get(matches) {
            Ok(true) => {}
            Ok(false) => exit(1),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                exit(1);
            }
        },
        _ => unreachable!(),
    }
}

/// Print the record for KEY, returning whether it was found and the
/// database closed cleanly.
fn get(matches: &ArgMatches) -> Result<bool> {
    let config = match matches.value_of("config") {
        Some(path) => ToolConfig::load(Path::new(path))?,
        None => ToolConfig::default(),
    };

    // clap enforces DB and KEY arguments.
    let db = matches.value_of("DB").unwrap();
    let key = matches.value_of("KEY").unwrap();

    let result = match config.engine {
        Engine::Kvs => lookup::<KvStore>(Path::new(db), key.as_bytes()),
        Engine::Sled => lookup::<SledKvsEngine>(Path::new(db), key.as_bytes()),
    };

    report(&result, db, key)?;

    Ok(result.is_success())
}

fn report(result: &Lookup, db: &str, key: &str) -> std::io::Result<()> {
    let stderr = std::io::stderr();
    let mut err = stderr.lock();

    match result.outcome {
        Ok(Some(ref value)) => {
            write!(
                err,
                "Found record with key {}, has value of length {}: ",
                key,
                value.len()
            )?;
            err.write_all(value)?;
            writeln!(err)?;
        }
        Ok(None) => writeln!(err, "ERROR: Cannot find record with key {} in {}", key, db)?,
        Err(ref e) => writeln!(err, "ERROR: Could not read DB {}: {}", db, e)?,
    }

    if let Err(ref e) = result.close {
        writeln!(err, "ERROR: Could not close DB: {}", e)?;
    }

    Ok(())
}

type Result<T> = std::result::Result<T, ToolError>;

/// Error type for kvs-tool.
#[derive(Debug)]
pub enum ToolError {
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ToolError::Config(e) => write!(f, "{}", e),
            ToolError::Io(e) => write!(f, "failed to write report: {}", e),
        }
    }
}

impl From<ConfigError> for ToolError {
    fn from(err: ConfigError) -> ToolError {
        ToolError::Config(err)
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> ToolError {
        ToolError::Io(err)
    }
}
