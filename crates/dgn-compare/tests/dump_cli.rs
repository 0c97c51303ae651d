//! End-to-end runs of the `dgn-dump` binary.

use std::fs;
use std::process::Command;

use dgn_compare::LevelSummary;
use dgn_core::{GenOptions, generate_level_with};
use dgn_rng::{format_text_log, parse_jsonl_log};

fn dump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dgn-dump"))
}

fn scratch(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("dgn-dump-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn test_prints_map_and_summary() {
    let out = dump()
        .args(["--seed", "5", "--depth", "2", "--no-themes", "--summary"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let level = generate_level_with(5, 2, &GenOptions::plain());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let map = level.to_ascii();
    assert!(stdout.starts_with(&map));
    let summary = LevelSummary::from_json(&stdout[map.len()..]).unwrap();
    assert_eq!(summary, LevelSummary::from_level(&level));
}

#[test]
fn test_rng_log_file_matches_library() {
    let path = scratch("seed9.jsonl");
    let out = dump()
        .args(["--seed", "9", "--rng-log"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success());

    let written = parse_jsonl_log(fs::read_to_string(&path).unwrap().as_bytes()).unwrap();
    let level = generate_level_with(9, 1, &GenOptions::default().with_rng_log());
    assert_eq!(written, level.rng_log);
}

#[test]
fn test_compare_against_own_trace_passes() {
    let level = generate_level_with(12, 3, &GenOptions::default().with_rng_log());
    let trace = scratch("seed12.txt");
    fs::write(&trace, format_text_log(&level.rng_log)).unwrap();

    let out = dump()
        .args(["--seed", "12", "--depth", "3", "--compare"])
        .arg(&trace)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stderr).contains("PASS"));
}

#[test]
fn test_compare_against_other_seed_fails() {
    let level = generate_level_with(13, 3, &GenOptions::default().with_rng_log());
    let trace = scratch("seed13.txt");
    fs::write(&trace, format_text_log(&level.rng_log)).unwrap();

    let out = dump()
        .args(["--seed", "14", "--depth", "3", "--compare"])
        .arg(&trace)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("FAIL"));
}

#[test]
fn test_rejects_depth_zero() {
    let out = dump().args(["--depth", "0"]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("depth"));
}
