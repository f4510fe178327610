use clap::{value_t, App, Arg};
use kvbench::bench::{workloads, Report, Runner};
use kvbench::config::{parse_benchmarks, BenchConfig, Engine, DEFAULT_NUM_RECORDS};
use kvbench::KvStore;
use log::info;
use std::path::PathBuf;
use std::process::exit;

fn main() {
    env_logger::init();

    let mut available = String::from("Available benchmarks:\n");
    for w in workloads::<KvStore>().iter() {
        available.push_str(&format!("    * {:<12} - {}\n", w.name, w.about));
    }
    let default_num_records = DEFAULT_NUM_RECORDS.to_string();

    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .after_help(available.as_str())
        .arg(
            Arg::with_name("benchmarks")
                .short("b")
                .long("benchmarks")
                .takes_value(true)
                .required(true)
                .help("comma separated list of benchmarks to run"),
        )
        .arg(
            Arg::with_name("db")
                .short("d")
                .long("db")
                .takes_value(true)
                .help("the db to run the benchmarks on, a temporary one is used if absent"),
        )
        .arg(
            Arg::with_name("numrecs")
                .short("n")
                .long("numrecs")
                .takes_value(true)
                .default_value(&default_num_records)
                .help("number of records to write"),
        )
        .arg(
            Arg::with_name("engine")
                .short("e")
                .long("engine")
                .takes_value(true)
                .possible_values(&["kvs", "sled"])
                .default_value("kvs")
                .help("specify database engine"),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .takes_value(true)
                .help("seed for keys, values and workspace names"),
        )
        .get_matches();

    let num_records = value_t!(matches, "numrecs", usize).unwrap_or_else(|e| e.exit());
    let engine = value_t!(matches, "engine", Engine).unwrap_or_else(|e| e.exit());
    let seed = if matches.is_present("seed") {
        Some(value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit()))
    } else {
        None
    };

    let config = BenchConfig {
        // clap enforces the benchmarks argument.
        benchmarks: parse_benchmarks(matches.value_of("benchmarks").unwrap()),
        db: matches.value_of("db").map(PathBuf::from),
        num_records,
        engine,
        seed,
    };
    info!("Using engine '{}'.", engine);

    let mut runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            exit(1);
        }
    };

    let workspace = runner.workspace();
    if workspace.is_owned() {
        println!("Creating a new DB: {}", workspace.path().display());
    } else {
        println!("Using existing DB: {}", workspace.path().display());
    }

    let stderr = std::io::stderr();
    let result = runner.run(&mut stderr.lock());

    // Remove the workspace before reporting so a failed run cleans up too.
    let cleanup = runner.finish();

    let mut code = 0;
    match result {
        Ok(reports) => {
            if reports.iter().any(Report::is_failure) {
                code = 1;
            }
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            code = 1;
        }
    }

    if let Err(e) = cleanup {
        eprintln!("ERROR: Could not remove DB directory: {}", e);
        code = 1;
    }

    exit(code);
}
