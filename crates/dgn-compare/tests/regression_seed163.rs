//! Golden regression for seed 163 at depth 2.
//!
//! The committed fixture holds the level summary and the length of the RNG
//! log. A missing fixture is a failure. After an intended change to
//! generation, rewrite it with
//! `cargo test -p dgn-compare --test regression_seed163 -- --ignored`
//! and update the pinned counts below to match.

use std::fs;
use std::path::PathBuf;

use dgn_compare::{LevelSummary, diff_summaries};
use dgn_core::{GenOptions, generate_level_with};
use serde::{Deserialize, Serialize};
use serial_test::serial;

const SEED: u64 = 163;
const DEPTH: i32 = 2;

// Pinned from the committed fixture
const ROOMS: usize = 7;
const SUBROOMS: usize = 0;
const CORRIDOR_CELLS: usize = 76;
const DOORS: usize = 24;
const SECRET_DOORS: usize = 0;
const UP_STAIRS: (i32, i32) = (53, 13);
const DOWN_STAIRS: (i32, i32) = (63, 3);
const RNG_CALLS: usize = 27338;

#[derive(Debug, Serialize, Deserialize)]
struct Golden {
    summary: LevelSummary,
    rng_calls: usize,
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/fixtures/seed163_depth2.json")
}

fn current() -> Golden {
    let level = generate_level_with(SEED, DEPTH, &GenOptions::default().with_rng_log());
    Golden {
        summary: LevelSummary::from_level(&level),
        rng_calls: level.rng_log.len(),
    }
}

fn load_fixture() -> Golden {
    let path = fixture_path();
    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "fixture {} is missing or unreadable ({}); it is committed with the crate",
            path.display(),
            e
        )
    });
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("fixture {} is malformed: {}", path.display(), e))
}

// ============================================================================
// Regression
// ============================================================================

#[test]
#[serial]
fn test_seed163_matches_fixture() {
    let golden = load_fixture();
    let now = current();
    let diffs = diff_summaries(&now.summary, &golden.summary);
    let report: Vec<String> = diffs.iter().map(ToString::to_string).collect();
    assert!(diffs.is_empty(), "level drifted from fixture:\n{}", report.join("\n"));
    assert_eq!(now.summary.map, golden.summary.map);
    assert_eq!(now.rng_calls, golden.rng_calls);
}

#[test]
#[serial]
fn test_seed163_pinned_counts() {
    let now = current();
    assert_eq!(now.summary.rooms.len(), ROOMS);
    assert_eq!(now.summary.subrooms, SUBROOMS);
    assert_eq!(now.summary.corridor_cells, CORRIDOR_CELLS);
    assert_eq!(now.summary.doors, DOORS);
    assert_eq!(now.summary.secret_doors, SECRET_DOORS);
    assert_eq!(now.summary.up_stairs, Some(UP_STAIRS));
    assert_eq!(now.summary.down_stairs, Some(DOWN_STAIRS));
    assert_eq!(now.rng_calls, RNG_CALLS);
}

#[test]
fn test_fixture_agrees_with_pinned_counts() {
    let golden = load_fixture();
    assert_eq!(golden.summary.seed, SEED);
    assert_eq!(golden.summary.depth, DEPTH);
    assert_eq!(golden.summary.rooms.len(), ROOMS);
    assert_eq!(golden.summary.subrooms, SUBROOMS);
    assert_eq!(golden.summary.corridor_cells, CORRIDOR_CELLS);
    assert_eq!(golden.summary.doors, DOORS);
    assert_eq!(golden.summary.secret_doors, SECRET_DOORS);
    assert_eq!(golden.summary.up_stairs, Some(UP_STAIRS));
    assert_eq!(golden.summary.down_stairs, Some(DOWN_STAIRS));
    assert_eq!(golden.rng_calls, RNG_CALLS);
}

#[test]
#[serial]
fn test_seed163_is_stable_across_runs() {
    let now = current();
    let again = current();
    assert!(diff_summaries(&now.summary, &again.summary).is_empty());
    assert_eq!(now.rng_calls, again.rng_calls);
}

#[test]
#[serial]
#[ignore]
fn generate_seed163_fixture() {
    let path = fixture_path();
    let json = serde_json::to_string_pretty(&current()).unwrap();
    fs::write(&path, json + "\n").unwrap();
    eprintln!("wrote {}", path.display());
}
