//! Exit-code tests for the `biomesort` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn biomesort() -> Command {
    Command::new(env!("CARGO_BIN_EXE_biomesort"))
}

/// Config file that keeps the log out of the real home directory.
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.ini");
    fs::write(
        &path,
        format!(
            "[session]\ncache_capacity = 16\n\n[logging]\nfile = {}\n",
            dir.join("logs/biomesort.log").display()
        ),
    )
    .unwrap();
    path
}

fn run(temp: &TempDir, world: &Path, extra: &[&str]) -> Output {
    let config = write_config(temp.path());
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();

    biomesort()
        .arg("--world")
        .arg(world)
        .arg("--src")
        .arg(&src)
        .arg("--out")
        .arg(temp.path().join("out"))
        .arg("--config")
        .arg(&config)
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run biomesort")
}

fn empty_world(temp: &TempDir) -> PathBuf {
    let world = temp.path().join("world");
    fs::create_dir_all(world.join("region")).unwrap();
    fs::write(world.join("level.dat"), b"level").unwrap();
    world
}

#[test]
fn test_missing_world_exits_with_error() {
    let temp = TempDir::new().unwrap();

    let output = run(&temp, &temp.path().join("no-such-world"), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("World directory not found"), "{}", stderr);
}

#[test]
fn test_directory_without_level_dat_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let world = temp.path().join("world");
    fs::create_dir_all(&world).unwrap();

    let output = run(&temp, &world, &["--no-snapshot"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("level.dat"));
}

#[test]
fn test_skips_are_not_failures() {
    let temp = TempDir::new().unwrap();
    let world = empty_world(&temp);
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("notvalid.png"), b"x").unwrap();
    fs::write(src.join("5_5_1.png"), b"x").unwrap();

    let output = run(&temp, &world, &[]);

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Moved: 0"), "{}", stdout);
    assert!(stdout.contains("Skipped (name): 1"), "{}", stdout);
    assert!(stdout.contains("Skipped (nochunk): 1"), "{}", stdout);
    assert!(src.join("notvalid.png").is_file());
    assert!(temp.path().join("logs/biomesort.log").is_file());
}

#[test]
fn test_dry_run_does_not_create_output() {
    let temp = TempDir::new().unwrap();
    let world = empty_world(&temp);

    let output = run(&temp, &world, &["--dry-run", "--dimension", "nether"]);

    assert!(output.status.success(), "{:?}", output);
    assert!(!temp.path().join("out").exists());
}

/// World whose only chunk, (0, 0), uses an unknown compression type.
fn damaged_world(temp: &TempDir) -> PathBuf {
    let world = empty_world(temp);
    let mut region = vec![0u8; 8192];
    region[..4].copy_from_slice(&[0, 0, 2, 1]);
    region.extend_from_slice(&[0, 0, 0, 2, 9, 0]);
    region.resize(8192 + 4096, 0);
    fs::write(world.join("region/r.0.0.mca"), region).unwrap();
    world
}

#[test]
fn test_lookup_failure_abort_still_prints_summary() {
    let temp = TempDir::new().unwrap();
    let world = damaged_world(&temp);
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("1_1_1.png"), b"x").unwrap();

    let output = run(&temp, &world, &["--max-lookup-failures", "0"]);

    assert!(!output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Summary ---"), "{}", stdout);
    assert!(stdout.contains("Lookup failures: 1"), "{}", stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lookup failures"), "{}", stderr);
    assert!(src.join("1_1_1.png").is_file());
}

#[test]
fn test_invalid_config_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let world = empty_world(&temp);
    let config = temp.path().join("bad.ini");
    fs::write(&config, "[session]\ndimension = aether\n").unwrap();

    let output = biomesort()
        .arg("--world")
        .arg(&world)
        .arg("--src")
        .arg(temp.path())
        .arg("--out")
        .arg(temp.path().join("out"))
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("session.dimension"));
}

#[test]
fn test_missing_required_arguments_is_a_usage_error() {
    let output = biomesort().arg("--world").arg("/tmp").output().unwrap();
    assert!(!output.status.success());
}
