use assert_cmd::prelude::*;
use kvbench::sled::SledKvsEngine;
use kvbench::{Handle, KvStore, KvsEngine, OpenMode, Result};
use predicates::prelude::*;
use predicates::str::contains;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn populate<E: KvsEngine>(path: &Path, records: &[(&str, &str)]) -> Result<()> {
    let mut db = Handle::<E>::init();
    db.open(path, OpenMode::Create)?;
    db.write_lock_acquire()?;
    for (k, v) in records {
        db.add(k.as_bytes(), v.as_bytes())?;
    }
    db.write_lock_release()?;
    db.commit()?;
    db.close()?;
    db.finalize();
    Ok(())
}

// `kvbench` with no args should exit with a non-zero code.
#[test]
fn kvbench_no_args() {
    Command::cargo_bin("kvbench").unwrap().assert().failure();
}

#[test]
fn kvbench_help_lists_benchmarks() {
    Command::cargo_bin("kvbench")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("writeseq"))
        .stdout(contains("writerandom"));
}

#[test]
fn kvbench_invalid_numrecs() {
    Command::cargo_bin("kvbench")
        .unwrap()
        .args(&["-b", "writeseq", "-n", "many"])
        .assert()
        .failure();
}

#[test]
fn kvbench_invalid_engine() {
    Command::cargo_bin("kvbench")
        .unwrap()
        .args(&["-b", "writeseq", "-e", "rocks"])
        .assert()
        .failure();
}

#[test]
fn kvbench_temporary_db_is_removed() {
    let tmp = TempDir::new().expect("unable to create temporary working directory");

    Command::cargo_bin("kvbench")
        .unwrap()
        .env("TMPDIR", tmp.path())
        .args(&["-b", "bogus,writeseq", "-n", "10"])
        .assert()
        .success()
        .stdout(contains("Creating a new DB: "))
        .stdout(contains(tmp.path().to_str().unwrap()))
        .stderr(contains("Unknown benchmark 'bogus'"))
        .stderr(contains("writeseq: 480 bytes written in "));

    let left: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert!(left.is_empty());
}

#[test]
fn kvbench_existing_db_is_kept() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    populate::<KvStore>(temp_dir.path(), &[("k", "v")])?;

    Command::cargo_bin("kvbench")
        .unwrap()
        .args(&["-b", "writeseq,readseq", "-n", "3", "-d"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(contains("Using existing DB: "))
        .stderr(contains("writeseq: 144 bytes written in "))
        .stderr(contains("readseq: 144 bytes read in "));

    assert!(temp_dir.path().join("db").is_file());
    Ok(())
}

#[test]
fn kvbench_failing_workload_exits_non_zero() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    Command::cargo_bin("kvbench")
        .unwrap()
        .args(&["-b", "writeseq", "-d"])
        .arg(temp_dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(contains("writeseq: failed: "));
}

#[test]
fn kvbench_sled_engine() {
    let tmp = TempDir::new().expect("unable to create temporary working directory");

    Command::cargo_bin("kvbench")
        .unwrap()
        .env("TMPDIR", tmp.path())
        .args(&["-b", "writeseq", "-n", "10", "-e", "sled", "-s", "7"])
        .assert()
        .success()
        .stderr(contains("Engine:         sled"))
        .stderr(contains("writeseq: 480 bytes written in "));
}

// `kvs-tool` with no args should exit with a non-zero code.
#[test]
fn tool_no_args() {
    Command::cargo_bin("kvs-tool").unwrap().assert().failure();
}

#[test]
fn tool_get_missing_args() {
    Command::cargo_bin("kvs-tool")
        .unwrap()
        .args(&["get", "only-a-db"])
        .assert()
        .failure();
}

#[test]
fn tool_get_found() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    populate::<KvStore>(temp_dir.path(), &[("k", "v"), ("key2", "value2")])?;

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .arg("get")
        .arg(temp_dir.path())
        .arg("key2")
        .assert()
        .success()
        .stderr(contains("Found record with key key2, has value of length 6: value2"));

    Ok(())
}

#[test]
fn tool_get_not_found() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    populate::<KvStore>(temp_dir.path(), &[("k", "v")])?;

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .arg("get")
        .arg(temp_dir.path())
        .arg("missing")
        .assert()
        .failure()
        .stderr(contains("ERROR: Cannot find record with key missing in "));

    Ok(())
}

#[test]
fn tool_get_no_database() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let path = temp_dir.path().join("absent");

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .arg("get")
        .arg(&path)
        .arg("k")
        .assert()
        .failure()
        .stderr(contains("ERROR: Could not read DB "));

    assert!(!path.exists());
}

#[test]
fn tool_get_with_sled_config() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let db = temp_dir.path().join("sled");
    populate::<SledKvsEngine>(&db, &[("k", "v")])?;

    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, r#"{ "engine": "sled" }"#).expect("unable to write config");

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .args(&["get", "--config"])
        .arg(&config)
        .arg(&db)
        .arg("k")
        .assert()
        .success()
        .stderr(contains("has value of length 1: v"));

    Ok(())
}

#[test]
fn tool_get_malformed_config() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, "engine = sled").expect("unable to write config");

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .args(&["get", "-c"])
        .arg(&config)
        .arg(temp_dir.path())
        .arg("k")
        .assert()
        .failure()
        .stderr(contains("ERROR: failed to parse config file"))
        .stderr(contains("Parse {").not());
}

#[test]
fn tool_get_missing_config() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .args(&["get", "-c"])
        .arg(temp_dir.path().join("absent.json"))
        .arg(temp_dir.path())
        .arg("k")
        .assert()
        .failure()
        .stderr(contains("ERROR: failed to read config file"));
}

#[test]
fn tool_get_sled_never_creates_a_database() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let db = temp_dir.path().join("plain");
    std::fs::create_dir(&db).expect("unable to create directory");
    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, r#"{ "engine": "sled" }"#).expect("unable to write config");

    Command::cargo_bin("kvs-tool")
        .unwrap()
        .args(&["get", "-c"])
        .arg(&config)
        .arg(&db)
        .arg("k")
        .assert()
        .failure()
        .stderr(contains("ERROR: Could not read DB"));

    let entries = std::fs::read_dir(&db).expect("unable to list directory").count();
    assert_eq!(entries, 0);
}
