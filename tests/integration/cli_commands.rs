#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const Q1: &str = "SELECT COUNT(*) FROM movie_companies AS mc, title AS t \
WHERE mc.note LIKE '%(presents)%' \
AND t.production_year > 1990 \
AND t.id = mc.movie_id;\n";

const Q2: &str = "SELECT COUNT(*) FROM keyword AS k, movie_keyword AS mk \
WHERE k.keyword = 'character-name-in-title' \
AND mk.keyword_id = k.id;\n";

const CARDS: &str = "\
1a.sql
Alias: (mc, t)
Cards: (2609129, 2528312)
2b.sql
Alias: (k, mk)
Cards: (1, 4523930)
";

fn setup_workload() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let queries = dir.path().join("queries");
    fs::create_dir(&queries).expect("queries dir");
    fs::write(queries.join("1a.sql"), Q1).expect("write 1a.sql");
    fs::write(queries.join("2b.sql"), Q2).expect("write 2b.sql");
    let cards = dir.path().join("cards.log");
    fs::write(&cards, CARDS).expect("write cards.log");
    (dir, queries, cards)
}

#[test]
fn rewrite_emits_json_summary() {
    let (dir, queries, cards) = setup_workload();
    let out = dir.path().join("robust");
    let output = cargo_bin_cmd!("baraja")
        .args(["--format", "json", "rewrite", "--seed", "7"])
        .arg("--queries")
        .arg(&queries)
        .arg("--cards")
        .arg(&cards)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["queries_seen"].as_u64(), Some(2));
    assert_eq!(json["rewritten"].as_u64(), Some(2));
    assert_eq!(json["skipped_missing_cards"].as_u64(), Some(0));
    assert_eq!(json["failed"].as_u64(), Some(0));
    for kind in ["original", "increasing", "decreasing", "random"] {
        assert!(
            out.join(kind).join("1a.sql").exists(),
            "missing {kind}/1a.sql"
        );
        assert!(
            out.join(kind).join("2b.sql").exists(),
            "missing {kind}/2b.sql"
        );
    }
}

#[test]
fn rewrite_text_summary_reports_counts() {
    let (dir, queries, cards) = setup_workload();
    let out = dir.path().join("robust");
    let output = cargo_bin_cmd!("baraja")
        .args(["rewrite", "--seed", "7"])
        .arg("--queries")
        .arg(&queries)
        .arg("--cards")
        .arg(&cards)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);
    assert!(
        stdout.contains("Rewrote 2 of 2 queries"),
        "stdout was: {stdout}"
    );
}

#[test]
fn rewrite_same_seed_reproduces_the_random_variant() {
    let (dir, queries, cards) = setup_workload();
    let out_a = dir.path().join("robust_a");
    let out_b = dir.path().join("robust_b");
    for out in [&out_a, &out_b] {
        cargo_bin_cmd!("baraja")
            .args(["rewrite", "--seed", "7"])
            .arg("--queries")
            .arg(&queries)
            .arg("--cards")
            .arg(&cards)
            .arg("--out")
            .arg(out)
            .assert()
            .success();
    }
    let random_a = fs::read_to_string(out_a.join("random").join("1a.sql")).unwrap();
    let random_b = fs::read_to_string(out_b.join("random").join("1a.sql")).unwrap();
    assert_eq!(random_a, random_b);
    let original = fs::read_to_string(out_a.join("original").join("1a.sql")).unwrap();
    assert_eq!(original, Q1);
}

#[test]
fn rewrite_reads_directories_from_the_environment() {
    let (dir, queries, cards) = setup_workload();
    let out = dir.path().join("robust");
    cargo_bin_cmd!("baraja")
        .env("BARAJA_QUERIES", &queries)
        .env("BARAJA_CARDS", &cards)
        .args(["rewrite", "--seed", "1"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("original").join("2b.sql").exists());
}

#[test]
fn rewrite_fails_when_the_cards_file_is_missing() {
    let (dir, queries, _cards) = setup_workload();
    let out = dir.path().join("robust");
    let output = cargo_bin_cmd!("baraja")
        .arg("rewrite")
        .arg("--queries")
        .arg(&queries)
        .arg("--cards")
        .arg(dir.path().join("absent.log"))
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("error:"), "stderr was: {stderr}");
}

#[test]
fn cards_reports_entries_as_json() {
    let (_dir, _queries, cards) = setup_workload();
    let output = cargo_bin_cmd!("baraja")
        .args(["--format", "json", "cards"])
        .arg(&cards)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["entries"].as_u64(), Some(2));
    assert_eq!(json["queries"][0]["file"].as_str(), Some("1a.sql"));
    assert_eq!(json["queries"][0]["aliases"].as_u64(), Some(2));
    assert_eq!(json["queries"][1]["file"].as_str(), Some("2b.sql"));
}

#[test]
fn cards_text_lists_every_file() {
    let (_dir, _queries, cards) = setup_workload();
    let output = cargo_bin_cmd!("baraja")
        .arg("cards")
        .arg(&cards)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);
    assert!(stdout.contains("Cardinality log: 2 entries"));
    assert!(stdout.contains("1a.sql (2 aliases)"));
    assert!(stdout.contains("2b.sql (2 aliases)"));
}

#[cfg(unix)]
#[test]
fn bench_rows_stream_to_stdout() {
    let (_dir, queries, _cards) = setup_workload();
    let output = cargo_bin_cmd!("baraja")
        .args(["bench", "--label", "kush", "--benchmark", "job"])
        .args(["--time-source", "stdout"])
        .arg("--queries")
        .arg(&queries)
        .args(["echo", "0.125", "3.5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);
    assert_eq!(
        stdout,
        "kush,job,1a,0.125\nkush,job,1a,3.5\nkush,job,2b,0.125\nkush,job,2b,3.5\n"
    );
}

#[cfg(unix)]
#[test]
fn bench_writes_csv_file_and_prints_summary() {
    let (dir, queries, _cards) = setup_workload();
    let csv_path = dir.path().join("rows.csv");
    let output = cargo_bin_cmd!("baraja")
        .args(["--format", "json", "bench", "--label", "kush", "--benchmark", "job"])
        .args(["--time-source", "stdout", "--runs", "2"])
        .arg("--queries")
        .arg(&queries)
        .arg("--output")
        .arg(&csv_path)
        .args(["echo", "1.5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["queries_run"].as_u64(), Some(2));
    assert_eq!(json["rows_emitted"].as_u64(), Some(4));
    assert_eq!(json["failures"].as_u64(), Some(0));
    let rows = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        rows,
        "kush,job,1a,1.5\nkush,job,1a,1.5\nkush,job,2b,1.5\nkush,job,2b,1.5\n"
    );
}

#[cfg(unix)]
#[test]
fn log_level_flag_enables_stderr_diagnostics() {
    let (_dir, queries, _cards) = setup_workload();
    let output = cargo_bin_cmd!("baraja")
        .env_remove("RUST_LOG")
        .args(["--log-level", "info", "bench", "--label", "kush", "--benchmark", "job"])
        .args(["--time-source", "stdout"])
        .arg("--queries")
        .arg(&queries)
        .args(["echo", "0.5"])
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("bench.completed"), "stderr was: {stderr}");
}
