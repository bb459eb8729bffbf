//! Integration tests driving the namedex binary end to end.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

static FIXTURE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get or create the test fixture directory (singleton)
fn get_fixture_dir() -> PathBuf {
    FIXTURE_DIR.get_or_init(create_fixture_dir).clone()
}

/// Create an isolated fixture with a small dataset and its index
fn create_fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir()
        .join("namedex_test_fixtures")
        .join(format!("test_{}", std::process::id()));

    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create fixture dir");

    fs::write(
        dir.join("names.txt"),
        "# directory export\n\
         Ahmed Naciri\n\
         Amine Tazi\n\
         Aya Bennani\n\
         \n\
         Brahim Idrissi\n\
         Chaimae,Alaoui\n\
         Chaimae Tazi\n\
         Zakaria\n",
    )
    .unwrap();

    let (stdout, stderr, ok) = run_namedex_in(&dir, &["index", "--force", "names.txt"]);
    if !ok {
        panic!("namedex index failed: {}\nstdout: {}", stderr, stdout);
    }

    dir
}

fn run_namedex_in(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_namedex"))
        .args(args)
        .args(["--index-dir", "index", "--no-color"])
        .current_dir(dir)
        .env("XDG_DATA_HOME", dir.join("data"))
        .env_remove("NAMEDEX_LOG")
        .output()
        .expect("Failed to run namedex");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// Run namedex against the shared fixture
fn run_namedex(args: &[&str]) -> (String, String, bool) {
    run_namedex_in(&get_fixture_dir(), args)
}

fn run_json(args: &[&str]) -> Value {
    let (stdout, stderr, ok) = run_namedex(args);
    assert!(ok, "namedex should succeed: {}", stderr);
    serde_json::from_str(&stdout).expect("output should be JSON")
}

fn ids(result: &Value) -> Vec<u64> {
    result["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect()
}

#[test]
fn test_index_is_kept_when_fresh() {
    let (stdout, _, ok) = run_namedex(&["index", "names.txt"]);
    assert!(ok);
    assert!(stdout.contains("up to date"), "got: {}", stdout);
}

#[test]
fn test_stats_json() {
    let stats = run_json(&["stats", "names.txt", "--json"]);
    assert_eq!(stats["A"]["count"], 3);
    assert_eq!(stats["A"]["start"], 0);
    assert_eq!(stats["B"]["count"], 1);
    assert_eq!(stats["C"]["start"], 4);
    assert_eq!(stats["Q"]["count"], 0);
    assert_eq!(stats.as_object().unwrap().len(), 26);
}

#[test]
fn test_stats_report() {
    let (stdout, _, ok) = run_namedex(&["stats", "names.txt"]);
    assert!(ok);
    assert!(stdout.contains("Entry count:      7"), "got: {}", stdout);
}

#[test]
fn test_letter_page() {
    let result = run_json(&["page", "names.txt", "--letter", "a", "--limit", "2", "--json"]);
    assert_eq!(ids(&result), vec![1, 2]);
    assert_eq!(result["hasMore"], true);
    assert_eq!(result["total"], 3);
    assert_eq!(result["entries"][0]["displayName"], "Ahmed Naciri");
    assert_eq!(result["entries"][0]["derivedContact"], "ahmed.naciri@example.com");

    let next = run_json(&["page", "names.txt", "-L", "A", "-l", "2", "-p", "2", "--json"]);
    assert_eq!(ids(&next), vec![3]);
    assert_eq!(next["hasMore"], false);
}

#[test]
fn test_comma_entry() {
    let result = run_json(&["page", "names.txt", "--letter", "C", "--json"]);
    assert_eq!(ids(&result), vec![5, 6]);
    assert_eq!(result["entries"][0]["displayName"], "Chaimae Alaoui");
    assert_eq!(result["entries"][0]["firstPart"], "Chaimae");
    assert_eq!(result["entries"][0]["lastPart"], "Alaoui");
}

#[test]
fn test_search() {
    let result = run_json(&["search", "names.txt", "TAZI", "--json"]);
    assert_eq!(ids(&result), vec![2, 6]);
    assert_eq!(result["total"], 2);
    assert_eq!(result["hasMore"], false);

    let first = run_json(&["search", "names.txt", "tazi", "--limit", "1", "--json"]);
    assert_eq!(ids(&first), vec![2]);
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["approximate"], true);
}

#[test]
fn test_get_by_id() {
    let entry = run_json(&["get", "names.txt", "7", "--json"]);
    assert_eq!(entry["displayName"], "Zakaria");
    assert_eq!(entry["derivedContact"], "zakaria@example.com");

    let missing = run_json(&["get", "names.txt", "99", "--json"]);
    assert!(missing.is_null());
}

#[test]
fn test_human_output() {
    let (stdout, _, ok) = run_namedex(&["page", "names.txt", "--letter", "b"]);
    assert!(ok);
    assert!(stdout.contains("Brahim Idrissi"));
    assert!(stdout.contains("<brahim.idrissi@example.com>"));
    assert!(stdout.contains("total 1"));
}

#[test]
fn test_rejects_invalid_paging() {
    let (_, stderr, ok) = run_namedex(&["page", "names.txt", "--page", "0"]);
    assert!(!ok);
    assert!(stderr.contains("--page"));

    let (_, _, ok) = run_namedex(&["page", "names.txt", "--limit", "0"]);
    assert!(!ok);

    let (_, _, ok) = run_namedex(&["page", "names.txt", "--limit", "100000"]);
    assert!(!ok);
}

#[test]
fn test_rejects_bad_letter_and_blank_query() {
    let (_, _, ok) = run_namedex(&["page", "names.txt", "--letter", "7"]);
    assert!(!ok);

    let (_, stderr, ok) = run_namedex(&["search", "names.txt", "   "]);
    assert!(!ok);
    assert!(stderr.contains("empty"));
}

#[test]
fn test_page_requires_index() {
    let dir = get_fixture_dir().join("unindexed");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("other.txt"), "Ahmed\n").unwrap();

    let (_, stderr, ok) = run_namedex_in(&dir, &["page", "other.txt"]);
    assert!(!ok);
    assert!(stderr.contains("not indexed"));
}

#[test]
fn test_missing_dataset_fails() {
    let (_, _, ok) = run_namedex(&["search", "nope.txt", "tazi"]);
    assert!(!ok);
}
